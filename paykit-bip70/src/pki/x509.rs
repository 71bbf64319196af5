//! X.509 certificates, trust anchors and chain validation on `x509-cert`.

use std::path::Path;
use std::sync::Arc;

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::der::{Decode, DecodePem, Encode, Header, Reader, SliceReader, Tag};
use x509_cert::ext::pkix::{BasicConstraints, KeyUsage};
use x509_cert::Certificate;

use super::keys::PublicKey;
use super::provider::CertificateVerifier;
use crate::clock::{Clock, SystemClock};
use crate::config::ProtocolConfig;
use crate::{PaymentProtocolError, Result};

const SHA1_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const SHA384_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const SHA512_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
const ECDSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// A decoded certificate together with its original DER bytes.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    der: Vec<u8>,
    tbs: Vec<u8>,
    certificate: Certificate,
    public_key: PublicKey,
}

impl PartialEq for ParsedCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl ParsedCertificate {
    /// Decode a DER certificate with an RSA or P-256 subject key.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        if der.is_empty() {
            return Err(PaymentProtocolError::Certificate("empty certificate".into()));
        }
        let certificate = Certificate::from_der(der)?;
        let public_key = PublicKey::from_spki(&certificate.tbs_certificate.subject_public_key_info)?;
        Ok(Self {
            der: der.to_vec(),
            tbs: raw_tbs(der)?.to_vec(),
            certificate,
            public_key,
        })
    }

    /// Decode a single PEM certificate.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let certificate = Certificate::from_pem(pem.as_bytes())?;
        Self::from_der(&certificate.to_der()?)
    }

    /// Original DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Decoded certificate.
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Subject public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Subject as an RFC 4514 string.
    pub fn subject_name(&self) -> String {
        self.certificate.tbs_certificate.subject.to_string()
    }

    /// Issuer as an RFC 4514 string.
    pub fn issuer_name(&self) -> String {
        self.certificate.tbs_certificate.issuer.to_string()
    }

    /// Whether subject and issuer names are equal.
    pub fn is_self_issued(&self) -> bool {
        self.certificate.tbs_certificate.subject == self.certificate.tbs_certificate.issuer
    }

    /// Self-issued and signed by its own key.
    pub fn is_self_signed(&self) -> bool {
        self.is_self_issued() && self.is_signed_by(self).unwrap_or(false)
    }

    /// Whether `self` names `issuer` as its issuer.
    pub fn is_issued_by(&self, issuer: &ParsedCertificate) -> bool {
        self.certificate.tbs_certificate.issuer == issuer.certificate.tbs_certificate.subject
    }

    /// Start of the validity period, unix seconds.
    pub fn not_before(&self) -> u64 {
        self.certificate
            .tbs_certificate
            .validity
            .not_before
            .to_unix_duration()
            .as_secs()
    }

    /// End of the validity period, unix seconds.
    pub fn not_after(&self) -> u64 {
        self.certificate
            .tbs_certificate
            .validity
            .not_after
            .to_unix_duration()
            .as_secs()
    }

    /// Whether `now` falls within notBefore..=notAfter.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.not_before() <= now && now <= self.not_after()
    }

    /// Hex SHA-256 of the DER encoding.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }

    /// Same subject and subject public key.
    pub fn same_identity(&self, other: &ParsedCertificate) -> bool {
        self.certificate.tbs_certificate.subject == other.certificate.tbs_certificate.subject
            && self.public_key == other.public_key
    }

    /// Whether this certificate may issue a certificate that has
    /// `intermediates` non-self-issued CA certificates below it in the chain.
    ///
    /// Requires basicConstraints with cA set, keyCertSign when keyUsage is
    /// present, and a pathLenConstraint of at least `intermediates`.
    pub fn can_issue(&self, intermediates: usize) -> Result<bool> {
        let tbs = &self.certificate.tbs_certificate;
        let Some((_, constraints)) = tbs.get::<BasicConstraints>()? else {
            return Ok(false);
        };
        if !constraints.ca {
            return Ok(false);
        }
        if let Some((_, usage)) = tbs.get::<KeyUsage>()? {
            if !usage.key_cert_sign() {
                return Ok(false);
            }
        }
        Ok(constraints
            .path_len_constraint
            .map_or(true, |max| intermediates <= usize::from(max)))
    }

    /// Check the certificate signature with `issuer`'s public key.
    ///
    /// `Err` when the signature algorithm is not supported or does not fit
    /// the issuer's key type.
    pub fn is_signed_by(&self, issuer: &ParsedCertificate) -> Result<bool> {
        let oid = self.certificate.signature_algorithm.oid;
        let Some(signature) = self.certificate.signature.as_bytes() else {
            return Ok(false);
        };
        let key = &issuer.public_key;
        let rsa = matches!(key, PublicKey::Rsa(_));
        let verified = if rsa && oid == SHA1_WITH_RSA {
            key.verify_digest::<Sha1>(&self.tbs, signature)
        } else if rsa && oid == SHA256_WITH_RSA {
            key.verify_digest::<Sha256>(&self.tbs, signature)
        } else if rsa && oid == SHA384_WITH_RSA {
            key.verify_digest::<Sha384>(&self.tbs, signature)
        } else if rsa && oid == SHA512_WITH_RSA {
            key.verify_digest::<Sha512>(&self.tbs, signature)
        } else if !rsa && oid == ECDSA_WITH_SHA256 {
            key.verify_digest::<Sha256>(&self.tbs, signature)
        } else if !rsa && oid == ECDSA_WITH_SHA384 {
            key.verify_digest::<Sha384>(&self.tbs, signature)
        } else {
            return Err(PaymentProtocolError::Certificate(format!(
                "unsupported signature algorithm {oid} for {} issuer key",
                key.family()
            )));
        };
        Ok(verified)
    }
}

/// The exact DER bytes of the TBSCertificate, as signed by the issuer.
fn raw_tbs(der: &[u8]) -> Result<&[u8]> {
    let mut reader = SliceReader::new(der)?;
    let header = Header::decode(&mut reader)?;
    header.tag.assert_eq(Tag::Sequence)?;
    Ok(reader.tlv_bytes()?)
}

/// Trust anchors.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    anchors: Vec<ParsedCertificate>,
}

impl TrustStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every certificate in a PEM bundle.
    pub fn from_pem_bundle(pem: &str) -> Result<Self> {
        let mut store = Self::new();
        for certificate in Certificate::load_pem_chain(pem.as_bytes())? {
            store.add(ParsedCertificate::from_der(&certificate.to_der()?)?);
        }
        Ok(store)
    }

    /// Load a PEM bundle from disk.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|e| {
            PaymentProtocolError::Config(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_pem_bundle(&pem)
    }

    /// Add an anchor from DER bytes.
    pub fn add_der(&mut self, der: &[u8]) -> Result<()> {
        self.add(ParsedCertificate::from_der(der)?);
        Ok(())
    }

    /// Add an anchor unless an identical one is present.
    pub fn add(&mut self, anchor: ParsedCertificate) {
        if !self.anchors.contains(&anchor) {
            self.anchors.push(anchor);
        }
    }

    /// Number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether there are no anchors.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Whether `cert` is an anchor, by DER or by subject and key.
    pub fn contains(&self, cert: &ParsedCertificate) -> bool {
        self.anchors
            .iter()
            .any(|anchor| anchor == cert || anchor.same_identity(cert))
    }

    /// The anchor that issued and signed `cert`, if any.
    pub fn find_issuer(&self, cert: &ParsedCertificate) -> Option<&ParsedCertificate> {
        self.anchors
            .iter()
            .find(|anchor| cert.is_issued_by(anchor) && cert.is_signed_by(anchor).unwrap_or(false))
    }
}

/// Default [`CertificateVerifier`].
///
/// Chain validation walks leaf to root: each certificate must name the next
/// one as issuer and carry a valid signature from its key, and every issuer
/// must be a CA allowed to sign certificates at that depth. A self-signed
/// last element must verify under its own key; otherwise its issuer must be
/// found in the trust store. Validity periods and a trusted root are checked
/// as configured.
#[derive(Clone)]
pub struct X509Verifier {
    trust_store: TrustStore,
    check_validity_period: bool,
    require_trusted_root: bool,
    clock: Arc<dyn Clock>,
}

impl Default for X509Verifier {
    fn default() -> Self {
        Self::new(TrustStore::new())
    }
}

impl std::fmt::Debug for X509Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X509Verifier")
            .field("anchors", &self.trust_store.len())
            .field("check_validity_period", &self.check_validity_period)
            .field("require_trusted_root", &self.require_trusted_root)
            .finish()
    }
}

impl X509Verifier {
    /// Verifier over `trust_store` with validity checks on the system clock.
    pub fn new(trust_store: TrustStore) -> Self {
        Self {
            trust_store,
            check_validity_period: true,
            require_trusted_root: false,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build from configuration, loading trust anchors when a bundle is named.
    pub fn from_config(config: &ProtocolConfig) -> Result<Self> {
        let trust_store = match &config.trusted_roots_pem {
            Some(path) => TrustStore::from_pem_file(path)?,
            None => TrustStore::new(),
        };
        Ok(Self::new(trust_store)
            .with_validity_check(config.check_validity_period)
            .with_require_trusted_root(config.require_trusted_root))
    }

    /// Clock used for validity periods.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enable or disable notBefore/notAfter checks.
    pub fn with_validity_check(mut self, enabled: bool) -> Self {
        self.check_validity_period = enabled;
        self
    }

    /// Require chains to end at a trust anchor.
    pub fn with_require_trusted_root(mut self, required: bool) -> Self {
        self.require_trusted_root = required;
        self
    }

    /// Trust anchors.
    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    /// Trust anchors, for adding more after construction.
    pub fn trust_store_mut(&mut self) -> &mut TrustStore {
        &mut self.trust_store
    }

    fn is_valid_anchor(&self, anchor: &ParsedCertificate) -> bool {
        !self.check_validity_period || anchor.is_valid_at(self.clock.now())
    }

    fn parse_chain(&self, chain: &[Vec<u8>]) -> Result<Vec<ParsedCertificate>> {
        chain
            .iter()
            .enumerate()
            .map(|(index, der)| {
                ParsedCertificate::from_der(der).map_err(|e| {
                    tracing::warn!(index, error = %e, "unparsable certificate in chain");
                    PaymentProtocolError::InvalidCertificateEncoding {
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }
}

/// Non-self-issued CA certificates in `below`, excluding the leaf.
fn intermediates_below(below: &[ParsedCertificate]) -> usize {
    below.iter().skip(1).filter(|c| !c.is_self_issued()).count()
}

impl CertificateVerifier for X509Verifier {
    fn parse(&self, der: &[u8]) -> Result<ParsedCertificate> {
        ParsedCertificate::from_der(der)
    }

    fn verify_chain(&self, chain: &[Vec<u8>]) -> Result<bool> {
        let certs = self.parse_chain(chain)?;
        let Some(root) = certs.last() else {
            tracing::debug!("empty certificate chain");
            return Ok(false);
        };

        if self.check_validity_period {
            let now = self.clock.now();
            if let Some((index, cert)) = certs.iter().enumerate().find(|(_, c)| !c.is_valid_at(now)) {
                tracing::warn!(
                    index,
                    subject = %cert.subject_name(),
                    not_after = cert.not_after(),
                    "certificate outside its validity period"
                );
                return Ok(false);
            }
        }

        for (index, pair) in certs.windows(2).enumerate() {
            let (cert, issuer) = (&pair[0], &pair[1]);
            if !cert.is_issued_by(issuer) {
                tracing::debug!(index, issuer = %cert.issuer_name(), "issuer name mismatch");
                return Ok(false);
            }
            if !cert.is_signed_by(issuer)? {
                tracing::debug!(index, "certificate signature does not verify");
                return Ok(false);
            }
            if !issuer.can_issue(intermediates_below(&certs[..=index]))? {
                tracing::warn!(
                    index = index + 1,
                    subject = %issuer.subject_name(),
                    "issuer is not permitted to sign certificates"
                );
                return Ok(false);
            }
        }

        let anchored = if root.is_self_issued() {
            if !root.is_signed_by(root)? {
                tracing::debug!("self-signed root signature does not verify");
                return Ok(false);
            }
            self.trust_store.contains(root)
        } else {
            match self.trust_store.find_issuer(root) {
                Some(anchor) => {
                    if !anchor.can_issue(intermediates_below(&certs))? {
                        tracing::warn!(
                            subject = %anchor.subject_name(),
                            "trust anchor is not permitted to sign this chain"
                        );
                        return Ok(false);
                    }
                    self.is_valid_anchor(anchor)
                }
                None if self.require_trusted_root => {
                    tracing::debug!(issuer = %root.issuer_name(), "no trust anchor for chain");
                    return Ok(false);
                }
                // nothing to check the last signature against
                None => true,
            }
        };

        if self.require_trusted_root && !anchored {
            tracing::debug!(root = %root.subject_name(), "root is not a trust anchor");
            return Ok(false);
        }
        Ok(true)
    }

    fn is_trusted(&self, cert: &ParsedCertificate) -> bool {
        self.trust_store.contains(cert) || self.trust_store.find_issuer(cert).is_some()
    }
}
