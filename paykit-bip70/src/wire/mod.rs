//! Length-prefixed binary wire format.
//!
//! Only the subset needed by the payment protocol messages is supported:
//! varint, 64-bit fixed, length-delimited and 32-bit fixed fields. Every field
//! starts with a varint header `tag << 3 | wire_type`.
//!
//! ```text
//! [header varint][payload]
//!   Varint     -> base-128 little-endian groups, MSB continuation bit
//!   Fixed64    -> 8 bytes little-endian
//!   Delimited  -> varint length, then that many bytes
//!   Fixed32    -> 4 bytes little-endian
//! ```

mod reader;
mod writer;

pub use reader::{Checkpoint, Field, FieldValue, WireReader};
pub use writer::WireWriter;

use crate::{PaymentProtocolError, Result};

/// Maximum number of 7-bit groups in a varint.
pub const MAX_VARINT_GROUPS: usize = 9;

/// Largest value representable in [`MAX_VARINT_GROUPS`] groups (2^63 - 1).
pub const MAX_VARINT_VALUE: u64 = (1 << (7 * MAX_VARINT_GROUPS)) - 1;

/// Largest field tag that fits in a header.
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Payload encoding of a field, stored in the low three bits of its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Base-128 varint.
    Varint,
    /// 8 bytes, little-endian.
    Fixed64,
    /// Varint length followed by raw bytes.
    Delimited,
    /// 4 bytes, little-endian.
    Fixed32,
}

impl WireType {
    /// Raw header bits for this wire type.
    pub fn bits(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::Delimited => 2,
            Self::Fixed32 => 5,
        }
    }

    /// Decode header bits. Groups (3, 4) and reserved values (6, 7) are rejected.
    pub fn from_bits(tag: u32, bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::Delimited),
            5 => Ok(Self::Fixed32),
            other => Err(PaymentProtocolError::UnsupportedWireType {
                tag,
                wire_type: other,
            }),
        }
    }
}

/// Build a field header, validating the tag range.
pub(crate) fn field_header(tag: u32, wire_type: WireType) -> Result<u64> {
    if tag == 0 || tag > MAX_TAG {
        return Err(PaymentProtocolError::InvalidTag(tag as u64));
    }
    Ok(((tag as u64) << 3) | wire_type.bits() as u64)
}

/// Number of bytes `value` occupies as a varint.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
