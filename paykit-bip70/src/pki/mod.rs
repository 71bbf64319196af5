//! Certificate-chain binding and signatures for `PaymentRequest`.
//!
//! - [`algorithm`]: pkiType resolution (`"x509+sha256"` etc.)
//! - [`chain`]: the certificate list stored in `pkiData`
//! - [`TrustBinding`]: sign, verify, chain validation and root lookup
//! - [`SignatureProvider`] / [`CertificateVerifier`]: the crypto seams, with
//!   [`RustCryptoProvider`] and [`X509Verifier`] as defaults

pub mod algorithm;
mod binding;
pub mod chain;
mod keys;
mod provider;
mod x509;

pub use algorithm::{AlgorithmIdentifier, CertificateScheme, DigestAlgorithm, X509_SCHEME};
pub use binding::{CertificateAuthorityInfo, TrustBinding, VerificationReport};
pub use keys::{PublicKey, SigningKey};
pub use provider::{CertificateVerifier, RustCryptoProvider, SignatureProvider};
pub use x509::{ParsedCertificate, TrustStore, X509Verifier};
