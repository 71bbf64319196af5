//! Forward-only, tag-directed field reader.

use super::{WireType, MAX_TAG, MAX_VARINT_GROUPS};
use crate::{PaymentProtocolError, Result};

/// A decoded field. Delimited payloads borrow from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    /// Field tag.
    pub tag: u32,
    /// Decoded payload.
    pub value: FieldValue<'a>,
}

/// Payload of a [`Field`]; the variant always matches the header's wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Varint payload.
    Varint(u64),
    /// 8-byte little-endian payload.
    Fixed64(u64),
    /// Length-delimited payload.
    Delimited(&'a [u8]),
    /// 4-byte little-endian payload.
    Fixed32(u32),
}

impl Field<'_> {
    /// Wire type carried in the field header.
    pub fn wire_type(&self) -> WireType {
        match self.value {
            FieldValue::Varint(_) => WireType::Varint,
            FieldValue::Fixed64(_) => WireType::Fixed64,
            FieldValue::Delimited(_) => WireType::Delimited,
            FieldValue::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// Saved cursor position, restored with [`WireReader::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Reader over an immutable buffer with a forward-moving cursor.
///
/// Fields are requested by tag in the order the message schema lists them.
/// A field whose header carries a different tag is treated as absent at this
/// position and the cursor is restored.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    message: &'static str,
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            message: "message",
        }
    }

    /// Name the message being decoded; used in error reports.
    pub fn with_context(mut self, message: &'static str) -> Self {
        self.message = message;
        self
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor reached the end of the buffer.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Save the cursor position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    /// Restore a position saved with [`checkpoint`](Self::checkpoint).
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    /// Consume a base-128 varint.
    ///
    /// Fails with `MalformedVarint` past [`MAX_VARINT_GROUPS`] groups and with
    /// `Truncated` if the buffer ends before the terminating group.
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for group in 0..MAX_VARINT_GROUPS {
            let Some(&byte) = self.buf.get(self.pos) else {
                self.pos = start;
                return Err(PaymentProtocolError::Truncated {
                    offset: start,
                    needed: 1,
                });
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        self.pos = start;
        Err(PaymentProtocolError::MalformedVarint { offset: start })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(PaymentProtocolError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Consume whatever field is next. Returns `None` at the end of the buffer.
    pub fn next_field(&mut self) -> Result<Option<Field<'a>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let start = self.checkpoint();
        let result = self.read_header_and_payload();
        if result.is_err() {
            self.rewind(start);
        }
        result.map(Some)
    }

    fn read_header_and_payload(&mut self) -> Result<Field<'a>> {
        let header = self.read_varint()?;
        let raw_tag = header >> 3;
        if raw_tag == 0 || raw_tag > MAX_TAG as u64 {
            return Err(PaymentProtocolError::InvalidTag(raw_tag));
        }
        let tag = raw_tag as u32;
        let value = match WireType::from_bits(tag, (header & 0x7) as u8)? {
            WireType::Varint => FieldValue::Varint(self.read_varint()?),
            WireType::Fixed64 => FieldValue::Fixed64(u64::from_le_bytes(self.take_array()?)),
            WireType::Delimited => {
                let len = self.read_varint()?;
                let len = usize::try_from(len).map_err(|_| PaymentProtocolError::Truncated {
                    offset: self.pos,
                    needed: usize::MAX,
                })?;
                FieldValue::Delimited(self.take(len)?)
            }
            WireType::Fixed32 => FieldValue::Fixed32(u32::from_le_bytes(self.take_array()?)),
        };
        Ok(Field { tag, value })
    }

    /// Read the field with `tag` at the cursor.
    ///
    /// If the next field has another tag (or the buffer is exhausted) the
    /// cursor is left untouched and the field is absent: `Ok(None)` when
    /// `optional`, `RequiredFieldMissing` otherwise.
    pub fn read_field(&mut self, tag: u32, optional: bool) -> Result<Option<Field<'a>>> {
        let start = self.checkpoint();
        match self.next_field()? {
            Some(field) if field.tag == tag => Ok(Some(field)),
            _ => {
                self.rewind(start);
                if optional {
                    Ok(None)
                } else {
                    Err(PaymentProtocolError::RequiredFieldMissing {
                        message: self.message,
                        tag,
                    })
                }
            }
        }
    }

    /// Tag of the next field without consuming it; `None` at the end of the buffer.
    pub fn peek_tag(&mut self) -> Result<Option<u32>> {
        let start = self.checkpoint();
        let field = self.next_field()?;
        self.rewind(start);
        Ok(field.map(|f| f.tag))
    }

    /// Read a varint field as `u64`.
    pub fn read_field_u64(&mut self, tag: u32, optional: bool) -> Result<Option<u64>> {
        match self.read_field(tag, optional)? {
            Some(Field {
                value: FieldValue::Varint(v),
                ..
            }) => Ok(Some(v)),
            Some(other) => Err(mismatch(&other, WireType::Varint)),
            None => Ok(None),
        }
    }

    /// Read a varint field as `u32`, rejecting values that do not fit.
    pub fn read_field_u32(&mut self, tag: u32, optional: bool) -> Result<Option<u32>> {
        self.read_field_u64(tag, optional)?
            .map(|v| {
                u32::try_from(v).map_err(|_| PaymentProtocolError::NumericOverflow {
                    tag,
                    value: v,
                    target: "u32",
                })
            })
            .transpose()
    }

    /// Read an 8-byte fixed field.
    pub fn read_field_fixed64(&mut self, tag: u32, optional: bool) -> Result<Option<u64>> {
        match self.read_field(tag, optional)? {
            Some(Field {
                value: FieldValue::Fixed64(v),
                ..
            }) => Ok(Some(v)),
            Some(other) => Err(mismatch(&other, WireType::Fixed64)),
            None => Ok(None),
        }
    }

    /// Read a 4-byte fixed field.
    pub fn read_field_fixed32(&mut self, tag: u32, optional: bool) -> Result<Option<u32>> {
        match self.read_field(tag, optional)? {
            Some(Field {
                value: FieldValue::Fixed32(v),
                ..
            }) => Ok(Some(v)),
            Some(other) => Err(mismatch(&other, WireType::Fixed32)),
            None => Ok(None),
        }
    }

    /// Read a length-delimited field as raw bytes.
    pub fn read_field_bytes(&mut self, tag: u32, optional: bool) -> Result<Option<&'a [u8]>> {
        match self.read_field(tag, optional)? {
            Some(Field {
                value: FieldValue::Delimited(bytes),
                ..
            }) => Ok(Some(bytes)),
            Some(other) => Err(mismatch(&other, WireType::Delimited)),
            None => Ok(None),
        }
    }

    /// Read a length-delimited field as UTF-8 text.
    pub fn read_field_string(&mut self, tag: u32, optional: bool) -> Result<Option<&'a str>> {
        self.read_field_bytes(tag, optional)?
            .map(|bytes| {
                std::str::from_utf8(bytes).map_err(|_| PaymentProtocolError::InvalidUtf8 { tag })
            })
            .transpose()
    }

    /// Read every consecutive length-delimited field carrying `tag`.
    pub fn read_repeated_bytes(&mut self, tag: u32) -> Result<Vec<&'a [u8]>> {
        let mut items = Vec::new();
        while self.peek_tag()? == Some(tag) {
            if let Some(bytes) = self.read_field_bytes(tag, true)? {
                items.push(bytes);
            }
        }
        Ok(items)
    }

    /// Assert that every byte of the message was consumed.
    pub fn finish(mut self) -> Result<()> {
        match self.peek_tag()? {
            None => Ok(()),
            Some(tag) => Err(PaymentProtocolError::UnexpectedField {
                message: self.message,
                tag,
            }),
        }
    }
}

fn mismatch(field: &Field<'_>, expected: WireType) -> PaymentProtocolError {
    PaymentProtocolError::WireTypeMismatch {
        tag: field.tag,
        expected,
        found: field.wire_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_read_varint() {
        let mut reader = WireReader::new(&[0xac, 0x02, 0x01]);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_varint().unwrap(), 1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_varint_truncated_is_error() {
        let mut reader = WireReader::new(&[0x80, 0x80]);
        let err = reader.read_varint().unwrap_err();
        assert!(matches!(err, PaymentProtocolError::Truncated { offset: 0, .. }));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_varint_too_many_groups() {
        let bytes = [0xffu8; 10];
        let err = WireReader::new(&bytes).read_varint().unwrap_err();
        assert!(matches!(err, PaymentProtocolError::MalformedVarint { .. }));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_read_field_rewinds_on_tag_mismatch() {
        // tag 2, varint 7
        let bytes = [0x10, 0x07];
        let mut reader = WireReader::new(&bytes).with_context("Test");

        assert_eq!(reader.read_field(1, true).unwrap(), None);
        assert_eq!(reader.position(), 0);

        let err = reader.read_field(1, false).unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::RequiredFieldMissing {
                message: "Test",
                tag: 1
            }
        ));
        assert_eq!(reader.position(), 0);

        assert_eq!(reader.read_field_u64(2, false).unwrap(), Some(7));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_fixed_width_fields() {
        let mut bytes = vec![0x09];
        bytes.extend_from_slice(&0x0102030405060708u64.to_le_bytes());
        bytes.push(0x15);
        bytes.extend_from_slice(&0xdeadbeefu32.to_le_bytes());

        let mut reader = WireReader::new(&bytes);
        assert_eq!(
            reader.read_field_fixed64(1, false).unwrap(),
            Some(0x0102030405060708)
        );
        assert_eq!(reader.read_field_fixed32(2, false).unwrap(), Some(0xdeadbeef));
        reader.finish().unwrap();
    }

    #[test]
    fn test_wire_type_mismatch() {
        let bytes = [0x08, 0x01];
        let err = WireReader::new(&bytes)
            .read_field_bytes(1, false)
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::WireTypeMismatch {
                tag: 1,
                expected: WireType::Delimited,
                found: WireType::Varint
            }
        ));
    }

    #[test]
    fn test_delimited_truncated() {
        // tag 1, delimited, length 5 but only 2 bytes present
        let bytes = [0x0a, 0x05, 0x61, 0x62];
        let err = WireReader::new(&bytes).next_field().unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::Truncated { needed: 3, .. }
        ));
    }

    #[test]
    fn test_peek_tag_does_not_consume() {
        let bytes = [0x0a, 0x01, 0x61, 0x0a, 0x00];
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.peek_tag().unwrap(), Some(1));
        assert_eq!(reader.position(), 0);

        let items = reader.read_repeated_bytes(1).unwrap();
        assert_eq!(items, vec![&b"a"[..], &b""[..]]);
        assert_eq!(reader.peek_tag().unwrap(), None);
    }

    #[test]
    fn test_group_wire_type_rejected() {
        // tag 1, start-group
        let err = WireReader::new(&[0x0b]).next_field().unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::UnsupportedWireType {
                tag: 1,
                wire_type: 3
            }
        ));
    }

    #[test]
    fn test_u32_overflow() {
        // tag 1, varint 2^32
        let bytes = [0x08, 0x80, 0x80, 0x80, 0x80, 0x10];
        let err = WireReader::new(&bytes)
            .read_field_u32(1, false)
            .unwrap_err();
        assert!(matches!(err, PaymentProtocolError::NumericOverflow { .. }));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0x0a, 0x02, 0xff, 0xfe];
        let err = WireReader::new(&bytes)
            .read_field_string(1, false)
            .unwrap_err();
        assert!(matches!(err, PaymentProtocolError::InvalidUtf8 { tag: 1 }));
    }

    #[test]
    fn test_finish_rejects_leftover_fields() {
        let bytes = [0x18, 0x01];
        let err = WireReader::new(&bytes)
            .with_context("Test")
            .finish()
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::UnexpectedField {
                message: "Test",
                tag: 3
            }
        ));
    }
}
