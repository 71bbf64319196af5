//! pkiType resolution: `"<scheme>+<digest>"` against a fixed allow-list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::{PaymentProtocolError, Result};

/// The only certificate scheme accepted in a pkiType.
pub const X509_SCHEME: &str = "x509";

/// Digest named by the second half of a pkiType.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Name as written in a pkiType.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    /// Hash `message`.
    pub fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(message).to_vec(),
            Self::Sha256 => Sha256::digest(message).to_vec(),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = PaymentProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(PaymentProtocolError::UnsupportedDigest(other.to_string())),
        }
    }
}

/// Certificate scheme named by the first half of a pkiType.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateScheme {
    X509,
}

impl CertificateScheme {
    /// Name as written in a pkiType.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X509 => X509_SCHEME,
        }
    }
}

impl FromStr for CertificateScheme {
    type Err = PaymentProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            X509_SCHEME => Ok(Self::X509),
            other => Err(PaymentProtocolError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// A resolved pkiType.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgorithmIdentifier {
    /// Certificate scheme, the part before `+`.
    pub scheme: CertificateScheme,
    /// Digest, the part after `+`.
    pub digest: DigestAlgorithm,
}

impl AlgorithmIdentifier {
    /// `x509` with `digest`.
    pub fn x509(digest: DigestAlgorithm) -> Self {
        Self {
            scheme: CertificateScheme::X509,
            digest,
        }
    }
}

impl fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.scheme.as_str(), self.digest)
    }
}

impl FromStr for AlgorithmIdentifier {
    type Err = PaymentProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        resolve(s)
    }
}

/// Split `pki_type` on `+` and validate both halves.
///
/// Anything but exactly two parts is `UnknownPkiType`, including `"none"`.
pub fn resolve(pki_type: &str) -> Result<AlgorithmIdentifier> {
    let mut parts = pki_type.split('+');
    let (Some(scheme), Some(digest), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PaymentProtocolError::UnknownPkiType(pki_type.to_string()));
    };
    Ok(AlgorithmIdentifier {
        scheme: scheme.parse()?,
        digest: digest.parse()?,
    })
}
