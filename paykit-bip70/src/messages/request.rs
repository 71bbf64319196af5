use serde::{Deserialize, Serialize};

use super::{read_embedded, write_embedded, PaymentDetails, WireMessage};
use crate::wire::{WireReader, WireWriter};
use crate::{PaymentProtocolError, Result};

const VERSION: u32 = 1;
const PKI_TYPE: u32 = 2;
const PKI_DATA: u32 = 3;
const PAYMENT_DETAILS: u32 = 4;
const SIGNATURE: u32 = 5;

/// Protocol version written by [`PaymentRequest::new`].
pub const CURRENT_VERSION: u32 = 1;

/// pkiType value meaning "not signed".
pub const PKI_TYPE_NONE: &str = "none";

/// A merchant's request for payment, optionally signed over an X.509 chain.
///
/// The canonical encoding is both the transmitted form and, with the
/// signature emptied, the exact byte string that gets signed. Signing and
/// chain helpers live in [`crate::pki`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Protocol version.
    pub version: Option<u32>,
    /// `"none"` or `"<scheme>+<digest>"`, e.g. `"x509+sha256"`.
    pub pki_type: Option<String>,
    /// Encoded certificate chain when `pki_type` names the x509 scheme.
    pub pki_data: Option<Vec<u8>>,
    /// The request body.
    pub payment_details: PaymentDetails,
    /// Signature over the signable bytes.
    pub signature: Option<Vec<u8>>,
}

impl PaymentRequest {
    /// Wrap `details` in an unsigned request at the current version.
    pub fn new(payment_details: PaymentDetails) -> Self {
        Self {
            version: Some(CURRENT_VERSION),
            pki_type: None,
            pki_data: None,
            payment_details,
            signature: None,
        }
    }

    /// Set the pkiType.
    pub fn with_pki_type(mut self, pki_type: impl Into<String>) -> Self {
        self.pki_type = Some(pki_type.into());
        self
    }

    /// Set or clear the version.
    pub fn with_version(mut self, version: Option<u32>) -> Self {
        self.version = version;
        self
    }

    /// Whether a pkiType other than `"none"` is set.
    pub fn is_pki_enabled(&self) -> bool {
        matches!(self.pki_type.as_deref(), Some(t) if t != PKI_TYPE_NONE)
    }

    /// Whether a signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Encoding of the embedded `PaymentDetails`.
    pub fn payment_details_bytes(&self) -> Result<Vec<u8>> {
        self.payment_details.to_bytes()
    }

    /// Decode a request, refusing buffers larger than `limit` bytes.
    pub fn from_bytes_with_limit(bytes: &[u8], limit: usize) -> Result<Self> {
        if bytes.len() > limit {
            return Err(PaymentProtocolError::MessageTooLarge {
                size: bytes.len(),
                limit,
            });
        }
        Self::from_bytes(bytes)
    }

    /// Encode with `signature` in place of the stored one.
    pub(crate) fn encode_with(
        &self,
        writer: &mut WireWriter,
        signature: Option<&[u8]>,
    ) -> Result<()> {
        if let Some(version) = self.version {
            writer.write_field_u32(VERSION, version)?;
        }
        if let Some(pki_type) = &self.pki_type {
            writer.write_field_string(PKI_TYPE, pki_type)?;
        }
        if let Some(pki_data) = &self.pki_data {
            writer.write_field_bytes(PKI_DATA, pki_data)?;
        }
        write_embedded(writer, PAYMENT_DETAILS, &self.payment_details)?;
        if let Some(signature) = signature {
            writer.write_field_bytes(SIGNATURE, signature)?;
        }
        Ok(())
    }
}

impl WireMessage for PaymentRequest {
    const NAME: &'static str = "PaymentRequest";

    fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        self.encode_with(writer, self.signature.as_deref())
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let version = reader.read_field_u32(VERSION, true)?;
        let pki_type = reader.read_field_string(PKI_TYPE, true)?.map(str::to_owned);
        let pki_data = reader.read_field_bytes(PKI_DATA, true)?.map(<[u8]>::to_vec);
        let payment_details = read_embedded(reader, PAYMENT_DETAILS)?;
        let signature = reader
            .read_field_bytes(SIGNATURE, true)?
            .map(<[u8]>::to_vec);

        Ok(Self {
            version,
            pki_type,
            pki_data,
            payment_details,
            signature,
        })
    }
}
