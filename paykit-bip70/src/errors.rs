//! Error types for payment protocol operations.
//!
//! Every error maps to an [`ErrorKind`] so callers can branch on the class of
//! failure (bad bytes, unsupported algorithm, bad caller input, missing trust
//! material, primitive failure) without matching individual variants.

use crate::wire::WireType;

/// Broad classification of a [`PaymentProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    /// Truncated buffer, bad varint, wire-type mismatch, missing required field.
    MalformedInput = 1000,
    /// Unknown pkiType shape, unsupported scheme or digest.
    UnsupportedAlgorithm = 2000,
    /// Invalid value supplied by the caller.
    InvalidInput = 3000,
    /// No certificate authority could be determined.
    TrustLookupFailure = 4000,
    /// Key, signature or certificate primitive failure.
    Crypto = 5000,
}

/// Error type for payment protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentProtocolError {
    /// The buffer ended in the middle of a field.
    #[error("truncated buffer at offset {offset}: needed {needed} more bytes")]
    Truncated {
        /// Cursor position where the read started.
        offset: usize,
        /// Bytes missing from the buffer.
        needed: usize,
    },

    /// A varint used more groups than the wire format allows.
    #[error("malformed varint at offset {offset}")]
    MalformedVarint {
        /// Cursor position where the varint started.
        offset: usize,
    },

    /// A value is outside the encodable varint range.
    #[error("value {0} exceeds the maximum varint value")]
    VarintOverflow(u64),

    /// A field carried a different wire type than its tag requires.
    #[error("field {tag}: expected wire type {expected:?}, found {found:?}")]
    WireTypeMismatch {
        /// Field tag.
        tag: u32,
        /// Wire type required by the message schema.
        expected: WireType,
        /// Wire type present on the wire.
        found: WireType,
    },

    /// Group or reserved wire types are not supported.
    #[error("unsupported wire type {wire_type} for field {tag}")]
    UnsupportedWireType {
        /// Field tag.
        tag: u32,
        /// Raw wire type bits.
        wire_type: u8,
    },

    /// Field tags must be in `1..=MAX_TAG`.
    #[error("invalid field tag {0}")]
    InvalidTag(u64),

    /// A required field was not at its expected position.
    #[error("{message}: required field {tag} is missing")]
    RequiredFieldMissing {
        /// Message being decoded.
        message: &'static str,
        /// Expected tag.
        tag: u32,
    },

    /// Bytes remained after the last known field of a message.
    #[error("{message}: unexpected field {tag}")]
    UnexpectedField {
        /// Message being decoded.
        message: &'static str,
        /// Tag found where the message should have ended.
        tag: u32,
    },

    /// A string field did not contain valid UTF-8.
    #[error("field {tag} is not valid UTF-8")]
    InvalidUtf8 {
        /// Field tag.
        tag: u32,
    },

    /// A numeric field does not fit its target type.
    #[error("field {tag}: value {value} does not fit in {target}")]
    NumericOverflow {
        /// Field tag.
        tag: u32,
        /// Decoded value.
        value: u64,
        /// Name of the target type.
        target: &'static str,
    },

    /// The encoded message exceeds the configured size limit.
    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Buffer size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// pkiType is not of the form `<scheme>+<digest>`.
    #[error("unknown pki type: {0}")]
    UnknownPkiType(String),

    /// Certificate scheme other than `x509`.
    #[error("unsupported certificate scheme: {0}")]
    UnsupportedScheme(String),

    /// Digest outside the allow-list.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),

    /// A certificate in a chain could not be used.
    #[error("invalid certificate at index {index}: {reason}")]
    InvalidCertificateEncoding {
        /// Position in the chain.
        index: usize,
        /// Reason the certificate was rejected.
        reason: String,
    },

    /// Caller supplied an invalid value.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field or parameter name.
        field: String,
        /// Reason for invalidity.
        reason: String,
    },

    /// Key material could not be loaded or is of an unsupported type.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The signature primitive failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Certificate parsing or validation failed.
    #[error("certificate error: {0}")]
    Certificate(String),

    /// No pkiType or no chain to look up an authority from.
    #[error("no certificate authority available")]
    NoCertificateAuthority,

    /// The request carries no signature.
    #[error("payment request is not signed")]
    MissingSignature,

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PaymentProtocolError {
    /// Get the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Truncated { .. }
            | Self::MalformedVarint { .. }
            | Self::VarintOverflow(_)
            | Self::WireTypeMismatch { .. }
            | Self::UnsupportedWireType { .. }
            | Self::InvalidTag(_)
            | Self::RequiredFieldMissing { .. }
            | Self::UnexpectedField { .. }
            | Self::InvalidUtf8 { .. }
            | Self::NumericOverflow { .. }
            | Self::MessageTooLarge { .. }
            | Self::Serialization(_) => ErrorKind::MalformedInput,
            Self::UnknownPkiType(_) | Self::UnsupportedScheme(_) | Self::UnsupportedDigest(_) => {
                ErrorKind::UnsupportedAlgorithm
            }
            Self::InvalidCertificateEncoding { .. } | Self::InvalidInput { .. } | Self::Config(_) => {
                ErrorKind::InvalidInput
            }
            Self::NoCertificateAuthority => ErrorKind::TrustLookupFailure,
            Self::InvalidKey(_) | Self::Signing(_) | Self::Certificate(_) | Self::MissingSignature => {
                ErrorKind::Crypto
            }
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PaymentProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<x509_cert::der::Error> for PaymentProtocolError {
    fn from(err: x509_cert::der::Error) -> Self {
        Self::Certificate(err.to_string())
    }
}
