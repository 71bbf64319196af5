//! Payment protocol messages.
//!
//! Each message is a fixed, ordered tag table over the [`wire`](crate::wire)
//! codec. Encoding writes present fields in ascending tag order; decoding
//! requests tags in the same order and treats a non-matching header as
//! "absent here".
//!
//! | message          | tags                                                                 |
//! |------------------|----------------------------------------------------------------------|
//! | `PaymentOutput`  | 1 value (u64), 2 script (bytes)                                      |
//! | `PaymentDetails` | 1 network, 2 outputs*, 3 time, 4 expires, 5 memo, 6 payment_url, 7 merchant_data |
//! | `PaymentRequest` | 1 version, 2 pki_type, 3 pki_data, 4 payment_details, 5 signature    |
//! | `Payment`        | 1 merchant_data, 2 transactions*, 3 refund_to*, 4 memo               |
//! | `PaymentAck`     | 1 payment, 2 memo                                                    |
//!
//! `*` marks repeated fields.

mod ack;
mod details;
pub mod merchant_data;
mod output;
mod payment;
mod request;

pub use ack::PaymentAck;
pub use details::{PaymentDetails, DEFAULT_NETWORK};
pub use output::PaymentOutput;
pub use payment::Payment;
pub use request::{PaymentRequest, CURRENT_VERSION, PKI_TYPE_NONE};

use crate::wire::{WireReader, WireWriter};
use crate::Result;

/// A message with a canonical encoding over the wire codec.
pub trait WireMessage: Sized {
    /// Message name used in decode errors.
    const NAME: &'static str;

    /// Write this message's fields in canonical order.
    fn encode(&self, writer: &mut WireWriter) -> Result<()>;

    /// Read this message's fields from `reader`.
    ///
    /// Does not check for trailing bytes; [`from_bytes`](Self::from_bytes) does.
    fn decode(reader: &mut WireReader<'_>) -> Result<Self>;

    /// Canonical byte encoding.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = WireWriter::new();
        self.encode(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode a complete message, rejecting trailing fields.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(bytes).with_context(Self::NAME);
        let message = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }
}

/// Write `message` as an embedded length-delimited field.
pub(crate) fn write_embedded<M: WireMessage>(
    writer: &mut WireWriter,
    tag: u32,
    message: &M,
) -> Result<()> {
    writer.write_field_bytes(tag, &message.to_bytes()?)
}

/// Read a required embedded message.
pub(crate) fn read_embedded<M: WireMessage>(reader: &mut WireReader<'_>, tag: u32) -> Result<M> {
    match reader.read_field_bytes(tag, false)? {
        Some(bytes) => M::from_bytes(bytes),
        None => Err(crate::PaymentProtocolError::RequiredFieldMissing {
            message: M::NAME,
            tag,
        }),
    }
}

/// Read every consecutive embedded message carrying `tag`.
pub(crate) fn read_repeated_embedded<M: WireMessage>(
    reader: &mut WireReader<'_>,
    tag: u32,
) -> Result<Vec<M>> {
    reader
        .read_repeated_bytes(tag)?
        .into_iter()
        .map(M::from_bytes)
        .collect()
}
