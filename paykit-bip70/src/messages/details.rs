use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{merchant_data, read_repeated_embedded, write_embedded, PaymentOutput, WireMessage};
use crate::clock::{Clock, SystemClock};
use crate::wire::{WireReader, WireWriter, MAX_VARINT_VALUE};
use crate::{PaymentProtocolError, Result};

const NETWORK: u32 = 1;
const OUTPUTS: u32 = 2;
const TIME: u32 = 3;
const EXPIRES: u32 = 4;
const MEMO: u32 = 5;
const PAYMENT_URL: u32 = 6;
const MERCHANT_DATA: u32 = 7;

/// Network assumed when a request does not name one.
pub const DEFAULT_NETWORK: &str = "main";

/// What the merchant is asking to be paid, and where to send the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Network name (`"main"`, `"test"`, ...). Absent means [`DEFAULT_NETWORK`].
    pub network: Option<String>,
    /// Requested outputs, in order.
    pub outputs: Vec<PaymentOutput>,
    /// Creation time (unix seconds). Always written.
    pub time: u64,
    /// Expiry time (unix seconds).
    pub expires: Option<u64>,
    /// Note shown to the payer.
    pub memo: Option<String>,
    /// Where the `Payment` message should be sent.
    pub payment_url: Option<String>,
    /// Opaque data echoed back in the `Payment`.
    pub merchant_data: Option<Vec<u8>>,
}

impl Default for PaymentDetails {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentDetails {
    /// Create empty details stamped with the current time.
    pub fn new() -> Self {
        Self::with_clock(&SystemClock)
    }

    /// Create empty details stamped with `clock`'s time.
    pub fn with_clock(clock: &dyn Clock) -> Self {
        Self {
            network: None,
            outputs: Vec::new(),
            time: clock.now(),
            expires: None,
            memo: None,
            payment_url: None,
            merchant_data: None,
        }
    }

    /// Set the network name.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Append an output.
    pub fn with_output(mut self, output: PaymentOutput) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the creation time, rejecting values the wire format cannot carry.
    pub fn with_time(mut self, time: u64) -> Result<Self> {
        self.time = checked_timestamp("time", time)?;
        Ok(self)
    }

    /// Set the expiry time, rejecting values the wire format cannot carry.
    pub fn with_expires(mut self, expires: u64) -> Result<Self> {
        self.expires = Some(checked_timestamp("expires", expires)?);
        Ok(self)
    }

    /// Set the memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Set the payment URL.
    pub fn with_payment_url(mut self, url: impl Into<String>) -> Self {
        self.payment_url = Some(url.into());
        self
    }

    /// Set opaque merchant data.
    pub fn with_merchant_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.merchant_data = Some(data.into());
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

    /// Network name, defaulting to [`DEFAULT_NETWORK`].
    pub fn network_or_default(&self) -> &str {
        self.network.as_deref().unwrap_or(DEFAULT_NETWORK)
    }

    /// Sum of all output values.
    pub fn total_amount(&self) -> Result<u64> {
        self.outputs.iter().try_fold(0u64, |acc, output| {
            acc.checked_add(output.value)
                .ok_or_else(|| PaymentProtocolError::invalid_input("outputs", "total overflows u64"))
        })
    }

    /// Whether the request has expired according to the system clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(&SystemClock)
    }

    /// Whether `clock` is past `expires`. Always false without an expiry.
    pub fn is_expired_at(&self, clock: &dyn Clock) -> bool {
        match self.expires {
            Some(expires) => clock.now() > expires,
            None => false,
        }
    }
}

fn checked_timestamp(field: &str, value: u64) -> Result<u64> {
    if value > MAX_VARINT_VALUE {
        return Err(PaymentProtocolError::invalid_input(
            field,
            format!("{} exceeds {}", value, MAX_VARINT_VALUE),
        ));
    }
    Ok(value)
}

impl WireMessage for PaymentDetails {
    const NAME: &'static str = "PaymentDetails";

    fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        if let Some(network) = &self.network {
            writer.write_field_string(NETWORK, network)?;
        }
        for output in &self.outputs {
            write_embedded(writer, OUTPUTS, output)?;
        }
        writer.write_field_u64(TIME, self.time)?;
        if let Some(expires) = self.expires {
            writer.write_field_u64(EXPIRES, expires)?;
        }
        if let Some(memo) = &self.memo {
            writer.write_field_string(MEMO, memo)?;
        }
        if let Some(url) = &self.payment_url {
            writer.write_field_string(PAYMENT_URL, url)?;
        }
        if let Some(data) = &self.merchant_data {
            writer.write_field_bytes(MERCHANT_DATA, data)?;
        }
        Ok(())
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let network = reader.read_field_string(NETWORK, true)?.map(str::to_owned);
        let outputs = read_repeated_embedded(reader, OUTPUTS)?;
        let time = reader.read_field_u64(TIME, false)?.unwrap_or_default();
        let expires = reader.read_field_u64(EXPIRES, true)?;
        let memo = reader.read_field_string(MEMO, true)?.map(str::to_owned);
        let payment_url = reader
            .read_field_string(PAYMENT_URL, true)?
            .map(str::to_owned);
        let merchant_data = reader
            .read_field_bytes(MERCHANT_DATA, true)?
            .map(<[u8]>::to_vec);

        Ok(Self {
            network,
            outputs,
            time,
            expires,
            memo,
            payment_url,
            merchant_data,
        })
    }
}
