//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use paykit_bip70::prelude::*;
//! ```

// Messages
pub use crate::messages::{
    Payment, PaymentAck, PaymentDetails, PaymentOutput, PaymentRequest, WireMessage,
};

// Error handling
pub use crate::errors::{ErrorKind, PaymentProtocolError};
pub use crate::Result;

// Signing and verification
pub use crate::pki::{
    CertificateAuthorityInfo, CertificateVerifier, DigestAlgorithm, RustCryptoProvider,
    SignatureProvider, SigningKey, TrustBinding, TrustStore, VerificationReport, X509Verifier,
};

// Configuration and time
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::ProtocolConfig;
pub use crate::content_type::ContentType;
