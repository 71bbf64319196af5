//! Field writer accumulating into an in-memory buffer.

use super::{field_header, WireType, MAX_VARINT_VALUE};
use crate::{PaymentProtocolError, Result};

/// Accumulates encoded fields. Field order is whatever order the caller
/// writes in; message codecs write in their canonical tag order because
/// signatures cover the literal byte sequence.
#[derive(Debug, Clone, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a base-128 varint. Values above [`MAX_VARINT_VALUE`] are rejected.
    pub fn write_varint(&mut self, mut value: u64) -> Result<()> {
        if value > MAX_VARINT_VALUE {
            return Err(PaymentProtocolError::VarintOverflow(value));
        }
        while value >= 0x80 {
            self.buf.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
        Ok(())
    }

    fn write_header(&mut self, tag: u32, wire_type: WireType) -> Result<()> {
        let header = field_header(tag, wire_type)?;
        self.write_varint(header)
    }

    /// Write a length-delimited field.
    pub fn write_field_bytes(&mut self, tag: u32, bytes: &[u8]) -> Result<()> {
        self.write_header(tag, WireType::Delimited)?;
        self.write_varint(bytes.len() as u64)?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a UTF-8 string as a length-delimited field.
    pub fn write_field_string(&mut self, tag: u32, value: &str) -> Result<()> {
        self.write_field_bytes(tag, value.as_bytes())
    }

    /// Write a varint field.
    pub fn write_field_u64(&mut self, tag: u32, value: u64) -> Result<()> {
        self.write_header(tag, WireType::Varint)?;
        self.write_varint(value)
    }

    /// Write a varint field holding a `u32`.
    pub fn write_field_u32(&mut self, tag: u32, value: u32) -> Result<()> {
        self.write_field_u64(tag, u64::from(value))
    }

    /// Write an 8-byte little-endian field.
    pub fn write_field_fixed64(&mut self, tag: u32, value: u64) -> Result<()> {
        self.write_header(tag, WireType::Fixed64)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Write a 4-byte little-endian field.
    pub fn write_field_fixed32(&mut self, tag: u32, value: u32) -> Result<()> {
        self.write_header(tag, WireType::Fixed32)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing was written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Copy of the accumulated bytes. Does not reset the writer.
    pub fn render(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Consume the writer, returning its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{WireReader, MAX_VARINT_GROUPS};

    #[test]
    fn test_write_varint() {
        let mut writer = WireWriter::new();
        writer.write_varint(300).unwrap();
        writer.write_varint(0).unwrap();
        assert_eq!(writer.render(), vec![0xac, 0x02, 0x00]);
    }

    #[test]
    fn test_max_varint_value() {
        let mut writer = WireWriter::new();
        writer.write_varint(MAX_VARINT_VALUE).unwrap();
        assert_eq!(writer.len(), MAX_VARINT_GROUPS);

        let bytes = writer.render();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_varint().unwrap(), MAX_VARINT_VALUE);
    }

    #[test]
    fn test_varint_overflow() {
        let mut writer = WireWriter::new();
        let err = writer.write_varint(MAX_VARINT_VALUE + 1).unwrap_err();
        assert!(matches!(err, PaymentProtocolError::VarintOverflow(_)));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_write_fields() {
        let mut writer = WireWriter::new();
        writer.write_field_string(1, "test").unwrap();
        writer.write_field_u32(2, 1).unwrap();
        writer.write_field_bytes(5, &[]).unwrap();
        assert_eq!(
            writer.render(),
            vec![0x0a, 0x04, b't', b'e', b's', b't', 0x10, 0x01, 0x2a, 0x00]
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut writer = WireWriter::new();
        writer.write_field_u64(3, 1000).unwrap();
        assert_eq!(writer.render(), writer.render());
        assert_eq!(writer.render(), writer.into_bytes());
    }

    #[test]
    fn test_invalid_tag() {
        let mut writer = WireWriter::new();
        assert!(writer.write_field_u64(0, 1).is_err());
    }
}
