use serde::{Deserialize, Serialize};

use super::WireMessage;
use crate::wire::{WireReader, WireWriter, MAX_VARINT_VALUE};
use crate::{PaymentProtocolError, Result};

const VALUE: u32 = 1;
const SCRIPT: u32 = 2;

/// An amount paid to an output script, embedded in `PaymentDetails.outputs`
/// and `Payment.refund_to`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentOutput {
    /// Amount in satoshis.
    pub value: u64,
    /// Output script.
    pub script: Vec<u8>,
}

impl PaymentOutput {
    /// Create an output, rejecting amounts the wire format cannot carry.
    pub fn new(value: u64, script: impl Into<Vec<u8>>) -> Result<Self> {
        if value > MAX_VARINT_VALUE {
            return Err(PaymentProtocolError::invalid_input(
                "output value",
                format!("{} exceeds {}", value, MAX_VARINT_VALUE),
            ));
        }
        Ok(Self {
            value,
            script: script.into(),
        })
    }
}

impl WireMessage for PaymentOutput {
    const NAME: &'static str = "Output";

    fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_field_u64(VALUE, self.value)?;
        writer.write_field_bytes(SCRIPT, &self.script)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let value = reader.read_field_u64(VALUE, false)?.unwrap_or_default();
        let script = reader
            .read_field_bytes(SCRIPT, false)?
            .unwrap_or_default()
            .to_vec();
        Ok(Self { value, script })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_encoding() {
        let output = PaymentOutput::new(10_000, vec![0x76, 0xa9]).unwrap();
        let bytes = output.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x08, 0x90, 0x4e, 0x12, 0x02, 0x76, 0xa9]);
        assert_eq!(PaymentOutput::from_bytes(&bytes).unwrap(), output);
    }

    #[test]
    fn test_empty_script_is_still_written() {
        let output = PaymentOutput::new(1, Vec::new()).unwrap();
        assert_eq!(output.to_bytes().unwrap(), vec![0x08, 0x01, 0x12, 0x00]);
    }

    #[test]
    fn test_missing_script_is_rejected() {
        let err = PaymentOutput::from_bytes(&[0x08, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::RequiredFieldMissing {
                message: "Output",
                tag: 2
            }
        ));
    }

    #[test]
    fn test_value_out_of_range() {
        assert!(PaymentOutput::new(u64::MAX, Vec::new()).is_err());
    }
}
