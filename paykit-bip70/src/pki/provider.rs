//! Seams to the cryptographic collaborators.
//!
//! [`TrustBinding`](super::TrustBinding) only talks to these traits. The
//! defaults are [`RustCryptoProvider`] for signature primitives and
//! [`X509Verifier`](super::X509Verifier) for certificates.

use sha1::Sha1;
use sha2::Sha256;

use super::algorithm::DigestAlgorithm;
use super::keys::{PublicKey, SigningKey};
use super::x509::ParsedCertificate;
use crate::{PaymentProtocolError, Result};

/// Signature primitives keyed by digest algorithm.
pub trait SignatureProvider: Send + Sync {
    /// Sign `message` hashed with `digest`.
    fn sign(&self, digest: DigestAlgorithm, message: &[u8], key: &SigningKey) -> Result<Vec<u8>>;

    /// Check `signature` over `message` hashed with `digest`.
    ///
    /// `Ok(false)` means the signature does not match; `Err` means the check
    /// could not be performed.
    fn verify(
        &self,
        digest: DigestAlgorithm,
        message: &[u8],
        signature: &[u8],
        key: &PublicKey,
    ) -> Result<bool>;
}

/// Certificate parsing, chain validation and trust lookup.
pub trait CertificateVerifier: Send + Sync {
    /// Parse one DER certificate.
    fn parse(&self, der: &[u8]) -> Result<ParsedCertificate>;

    /// Validate a leaf-first chain.
    fn verify_chain(&self, chain: &[Vec<u8>]) -> Result<bool>;

    /// Whether `cert` is, or is issued by, a trust anchor.
    fn is_trusted(&self, cert: &ParsedCertificate) -> bool;

    /// Display name of the certificate subject.
    fn subject_name(&self, cert: &ParsedCertificate) -> String {
        cert.subject_name()
    }

    /// Check `signature` with the public key of the chain's leaf.
    fn verify_subject(
        &self,
        provider: &dyn SignatureProvider,
        digest: DigestAlgorithm,
        message: &[u8],
        signature: &[u8],
        chain: &[Vec<u8>],
    ) -> Result<bool> {
        let leaf = chain
            .first()
            .ok_or(PaymentProtocolError::NoCertificateAuthority)?;
        let leaf = self
            .parse(leaf)
            .map_err(|e| PaymentProtocolError::InvalidCertificateEncoding {
                index: 0,
                reason: e.to_string(),
            })?;
        provider.verify(digest, message, signature, leaf.public_key())
    }
}

/// RSA PKCS#1 v1.5 and ECDSA P-256 from the RustCrypto crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl SignatureProvider for RustCryptoProvider {
    fn sign(&self, digest: DigestAlgorithm, message: &[u8], key: &SigningKey) -> Result<Vec<u8>> {
        tracing::debug!(digest = %digest, key = key.family(), "signing");
        match digest {
            DigestAlgorithm::Sha1 => key.sign_digest::<Sha1>(message),
            DigestAlgorithm::Sha256 => key.sign_digest::<Sha256>(message),
        }
    }

    fn verify(
        &self,
        digest: DigestAlgorithm,
        message: &[u8],
        signature: &[u8],
        key: &PublicKey,
    ) -> Result<bool> {
        if signature.is_empty() {
            return Ok(false);
        }
        Ok(match digest {
            DigestAlgorithm::Sha1 => key.verify_digest::<Sha1>(message, signature),
            DigestAlgorithm::Sha256 => key.verify_digest::<Sha256>(message, signature),
        })
    }
}
