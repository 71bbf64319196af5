use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{merchant_data, read_repeated_embedded, write_embedded, PaymentOutput, WireMessage};
use crate::wire::{WireReader, WireWriter};
use crate::Result;

const MERCHANT_DATA: u32 = 1;
const TRANSACTIONS: u32 = 2;
const REFUND_TO: u32 = 3;
const MEMO: u32 = 4;

/// Sent by the payer to `PaymentDetails.payment_url`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Payment {
    /// Copied from `PaymentDetails.merchant_data`.
    pub merchant_data: Option<Vec<u8>>,
    /// Signed transactions that pay the requested outputs.
    pub transactions: Vec<Vec<u8>>,
    /// Where to send refunds, if any.
    pub refund_to: Vec<PaymentOutput>,
    /// Note for the merchant.
    pub memo: Option<String>,
}

impl Payment {
    /// Create an empty payment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set opaque merchant data.
    pub fn with_merchant_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.merchant_data = Some(data.into());
        self
    }

    /// Append a raw transaction.
    pub fn with_transaction(mut self, tx: impl Into<Vec<u8>>) -> Self {
        self.transactions.push(tx.into());
        self
    }

    /// Append a refund output.
    pub fn with_refund_to(mut self, output: PaymentOutput) -> Self {
        self.refund_to.push(output);
        self
    }

    /// Set the memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Store a structured value as JSON merchant data.
    pub fn set_merchant_data_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.merchant_data = Some(merchant_data::encode_json(value)?);
        Ok(())
    }

    /// Decode JSON merchant data, if any.
    pub fn merchant_data_json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.merchant_data
            .as_deref()
            .map(merchant_data::decode_json::<T>)
            .transpose()
    }
}

impl WireMessage for Payment {
    const NAME: &'static str = "Payment";

    fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        if let Some(data) = &self.merchant_data {
            writer.write_field_bytes(MERCHANT_DATA, data)?;
        }
        for tx in &self.transactions {
            writer.write_field_bytes(TRANSACTIONS, tx)?;
        }
        for output in &self.refund_to {
            write_embedded(writer, REFUND_TO, output)?;
        }
        if let Some(memo) = &self.memo {
            writer.write_field_string(MEMO, memo)?;
        }
        Ok(())
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let merchant_data = reader
            .read_field_bytes(MERCHANT_DATA, true)?
            .map(<[u8]>::to_vec);
        let transactions = reader
            .read_repeated_bytes(TRANSACTIONS)?
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();
        let refund_to = read_repeated_embedded(reader, REFUND_TO)?;
        let memo = reader.read_field_string(MEMO, true)?.map(str::to_owned);

        Ok(Self {
            merchant_data,
            transactions,
            refund_to,
            memo,
        })
    }
}
