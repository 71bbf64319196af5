//! Payment protocol messages for Paykit.
//!
//! Implements the `PaymentRequest` / `Payment` / `PaymentACK` exchange: a
//! merchant publishes a request describing what to pay, optionally signed
//! over an X.509 certificate chain; the payer answers with a `Payment` and
//! receives an acknowledgment.
//!
//! # Features
//!
//! - **Wire codec**: minimal tag-directed reader and writer over the four
//!   field types the messages use
//! - **Canonical messages**: encoding is deterministic, so the transmitted
//!   bytes are the signed bytes
//! - **Trust binding**: sign and verify requests with RSA or ECDSA P-256
//!   keys, validate chains and look up the root authority
//!
//! # Example
//!
//! ```ignore
//! use paykit_bip70::prelude::*;
//!
//! let details = PaymentDetails::new()
//!     .with_network("test")
//!     .with_output(PaymentOutput::new(10_000, script)?)
//!     .with_memo("Order #42");
//!
//! let mut request = PaymentRequest::new(details);
//! request.sign(&SigningKey::from_pkcs8_pem(key_pem)?, Some(&[cert_der]))?;
//! let bytes = request.to_bytes()?;
//!
//! let received = PaymentRequest::from_bytes(&bytes)?;
//! assert!(received.verify());
//! ```

pub mod clock;
pub mod config;
pub mod content_type;
pub mod errors;
pub mod messages;
pub mod pki;
pub mod prelude;
pub mod wire;

/// Test utilities: fixture keys, certificates and sample requests.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ProtocolConfig;
pub use errors::{ErrorKind, PaymentProtocolError};
pub use messages::{Payment, PaymentAck, PaymentDetails, PaymentOutput, PaymentRequest, WireMessage};
pub use pki::{CertificateAuthorityInfo, SigningKey, TrustBinding, VerificationReport};

/// Common result alias for payment protocol operations.
pub type Result<T> = std::result::Result<T, PaymentProtocolError>;
