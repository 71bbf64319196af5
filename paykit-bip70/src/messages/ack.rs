use serde::{Deserialize, Serialize};

use super::{read_embedded, write_embedded, Payment, WireMessage};
use crate::wire::{WireReader, WireWriter};
use crate::Result;

const PAYMENT: u32 = 1;
const MEMO: u32 = 2;

/// Merchant's acknowledgment of a received `Payment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAck {
    /// The payment being acknowledged.
    pub payment: Payment,
    /// Note for the payer.
    pub memo: Option<String>,
}

impl PaymentAck {
    /// Acknowledge `payment`.
    pub fn new(payment: Payment) -> Self {
        Self {
            payment,
            memo: None,
        }
    }

    /// Set the memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

impl WireMessage for PaymentAck {
    const NAME: &'static str = "PaymentACK";

    fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        write_embedded(writer, PAYMENT, &self.payment)?;
        if let Some(memo) = &self.memo {
            writer.write_field_string(MEMO, memo)?;
        }
        Ok(())
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let payment = read_embedded(reader, PAYMENT)?;
        let memo = reader.read_field_string(MEMO, true)?.map(str::to_owned);
        Ok(Self { payment, memo })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaymentProtocolError;

    #[test]
    fn test_ack_round_trip() {
        let ack = PaymentAck::new(Payment::new().with_transaction(vec![0xab; 4]))
            .with_memo("Payment received");
        let bytes = ack.to_bytes().unwrap();
        assert_eq!(PaymentAck::from_bytes(&bytes).unwrap(), ack);
    }

    #[test]
    fn test_empty_payment_is_still_present() {
        let ack = PaymentAck::new(Payment::new());
        let bytes = ack.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x0a, 0x00]);
        assert_eq!(PaymentAck::from_bytes(&bytes).unwrap(), ack);
    }

    #[test]
    fn test_payment_is_required() {
        // memo only
        let err = PaymentAck::from_bytes(&[0x12, 0x02, b'h', b'i']).unwrap_err();
        assert!(matches!(
            err,
            PaymentProtocolError::RequiredFieldMissing {
                message: "PaymentACK",
                tag: 1
            }
        ));
    }
}
