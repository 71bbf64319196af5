//! Signing and verification of `PaymentRequest`s over a certificate chain.
//!
//! The signed bytes are the canonical encoding of the request with the
//! signature field present but empty (`0x2a 0x00`). Verifiers rebuild the same
//! bytes from the decoded request, so the signature never covers itself.

use serde::{Deserialize, Serialize};

use super::algorithm::{self, AlgorithmIdentifier};
use super::chain::{decode_chain, encode_chain};
use super::keys::SigningKey;
use super::provider::{CertificateVerifier, RustCryptoProvider, SignatureProvider};
use super::x509::X509Verifier;
use crate::config::ProtocolConfig;
use crate::messages::PaymentRequest;
use crate::wire::WireWriter;
use crate::{PaymentProtocolError, Result};

/// Root of a request's certificate chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateAuthorityInfo {
    /// Subject name of the last certificate in the chain.
    pub name: String,
    /// Whether it is, or is issued by, a trust anchor.
    pub trusted: bool,
    /// Hex SHA-256 of its DER encoding.
    pub fingerprint: String,
    /// Whether it verifies under its own key.
    pub self_signed: bool,
}

/// Outcome of every check [`TrustBinding::verify_detailed`] runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Signature verifies under the leaf certificate.
    pub signature_verified: bool,
    /// Certificate chain is well formed and correctly issued.
    pub chain_verified: bool,
    /// Root is, or is issued by, a trust anchor.
    pub ca_trusted: bool,
    /// Subject of the chain's root, when it parses.
    pub ca_name: Option<String>,
    /// Root verifies under its own key.
    pub self_signed: bool,
}

impl VerificationReport {
    /// Signature and chain both verified.
    pub fn is_valid(&self) -> bool {
        self.signature_verified && self.chain_verified
    }
}

impl PaymentRequest {
    /// Replace `pki_data` with `certs`, leaf first.
    pub fn set_chain<C: AsRef<[u8]>>(&mut self, certs: &[C]) -> Result<()> {
        self.pki_data = Some(encode_chain(certs)?);
        Ok(())
    }

    /// Certificates in `pki_data`; empty when there is none.
    pub fn chain(&self) -> Result<Vec<Vec<u8>>> {
        match &self.pki_data {
            Some(data) => decode_chain(data),
            None => Ok(Vec::new()),
        }
    }

    /// The bytes covered by the signature.
    pub fn signable_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = WireWriter::new();
        self.encode_with(&mut writer, Some(&[]))?;
        Ok(writer.into_bytes())
    }

    /// Resolve `pki_type`. An unset pkiType is `UnknownPkiType`.
    pub fn resolve_algorithm(&self) -> Result<AlgorithmIdentifier> {
        algorithm::resolve(self.pki_type.as_deref().unwrap_or_default())
    }

    /// Sign with the default [`TrustBinding`].
    pub fn sign(&mut self, key: &SigningKey, certs: Option<&[Vec<u8>]>) -> Result<()> {
        TrustBinding::default().sign(self, key, certs)
    }

    /// Verify with the default [`TrustBinding`].
    pub fn verify(&self) -> bool {
        TrustBinding::default().verify(self)
    }

    /// Verify the chain with the default [`TrustBinding`].
    pub fn verify_chain(&self) -> bool {
        TrustBinding::default().verify_chain(self)
    }

    /// Look up the chain root with the default [`TrustBinding`].
    pub fn root_authority(&self) -> Result<CertificateAuthorityInfo> {
        TrustBinding::default().root_authority(self)
    }
}

/// Binds requests to certificate chains through the crypto collaborators.
///
/// `verify` and `verify_chain` are total: any failure, including malformed
/// input, is reported as `false`. The `try_*` variants keep the error.
#[derive(Debug, Clone)]
pub struct TrustBinding<S = RustCryptoProvider, C = X509Verifier> {
    signer: S,
    verifier: C,
    default_pki_type: String,
}

impl Default for TrustBinding {
    fn default() -> Self {
        Self::new(RustCryptoProvider, X509Verifier::default())
    }
}

impl TrustBinding {
    /// Default collaborators configured from `config`.
    pub fn from_config(config: &ProtocolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(RustCryptoProvider, X509Verifier::from_config(config)?)
            .with_default_pki_type(config.default_pki_type.clone()))
    }
}

impl<S: SignatureProvider, C: CertificateVerifier> TrustBinding<S, C> {
    /// Binding over explicit collaborators, signing with `x509+sha256` by default.
    pub fn new(signer: S, verifier: C) -> Self {
        Self {
            signer,
            verifier,
            default_pki_type: ProtocolConfig::default().default_pki_type,
        }
    }

    /// pkiType assigned by [`sign`](Self::sign) to requests without one.
    pub fn with_default_pki_type(mut self, pki_type: impl Into<String>) -> Self {
        self.default_pki_type = pki_type.into();
        self
    }

    /// Signature provider.
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Certificate verifier.
    pub fn verifier(&self) -> &C {
        &self.verifier
    }

    /// Sign `request` in place.
    ///
    /// `certs` replaces the stored chain. An unset pkiType becomes the default
    /// one. When a chain is present its leaf must hold the key's public half.
    pub fn sign(
        &self,
        request: &mut PaymentRequest,
        key: &SigningKey,
        certs: Option<&[Vec<u8>]>,
    ) -> Result<()> {
        if let Some(certs) = certs {
            request.set_chain(certs)?;
        }
        if request.pki_type.is_none() {
            request.pki_type = Some(self.default_pki_type.clone());
        }
        let algorithm = request.resolve_algorithm()?;

        let chain = request.chain()?;
        match chain.first() {
            Some(leaf) => {
                let leaf = self.verifier.parse(leaf).map_err(|e| {
                    PaymentProtocolError::InvalidCertificateEncoding {
                        index: 0,
                        reason: e.to_string(),
                    }
                })?;
                if *leaf.public_key() != key.public_key() {
                    return Err(PaymentProtocolError::InvalidKey(
                        "signing key does not match the leaf certificate".into(),
                    ));
                }
            }
            None => tracing::warn!("signing a payment request without a certificate chain"),
        }

        let signable = request.signable_bytes()?;
        let signature = self.signer.sign(algorithm.digest, &signable, key)?;
        tracing::debug!(
            pki_type = %algorithm,
            certs = chain.len(),
            signature_len = signature.len(),
            "signed payment request"
        );
        request.signature = Some(signature);
        Ok(())
    }

    /// Whether the request's signature verifies under its leaf certificate.
    pub fn verify(&self, request: &PaymentRequest) -> bool {
        self.try_verify(request).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "payment request signature rejected");
            false
        })
    }

    /// Fallible form of [`verify`](Self::verify).
    ///
    /// `Ok(false)` for an unsigned pkiType ("none" or unset).
    pub fn try_verify(&self, request: &PaymentRequest) -> Result<bool> {
        if !request.is_pki_enabled() {
            return Ok(false);
        }
        let signature = request
            .signature
            .as_deref()
            .ok_or(PaymentProtocolError::MissingSignature)?;
        let algorithm = request.resolve_algorithm()?;
        let chain = request.chain()?;
        if chain.is_empty() {
            return Err(PaymentProtocolError::NoCertificateAuthority);
        }
        let signable = request.signable_bytes()?;
        self.verifier
            .verify_subject(&self.signer, algorithm.digest, &signable, signature, &chain)
    }

    /// Whether the request's chain is valid.
    pub fn verify_chain(&self, request: &PaymentRequest) -> bool {
        self.try_verify_chain(request).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "payment request chain rejected");
            false
        })
    }

    /// Fallible form of [`verify_chain`](Self::verify_chain).
    pub fn try_verify_chain(&self, request: &PaymentRequest) -> Result<bool> {
        if !request.is_pki_enabled() {
            return Ok(false);
        }
        request.resolve_algorithm()?;
        let chain = request.chain()?;
        if chain.is_empty() {
            return Ok(false);
        }
        self.verifier.verify_chain(&chain)
    }

    /// Name and trust status of the last certificate in the chain.
    pub fn root_authority(&self, request: &PaymentRequest) -> Result<CertificateAuthorityInfo> {
        if !request.is_pki_enabled() {
            return Err(PaymentProtocolError::NoCertificateAuthority);
        }
        let chain = request.chain()?;
        let index = chain
            .len()
            .checked_sub(1)
            .ok_or(PaymentProtocolError::NoCertificateAuthority)?;
        let root = self.verifier.parse(&chain[index]).map_err(|e| {
            PaymentProtocolError::InvalidCertificateEncoding {
                index,
                reason: e.to_string(),
            }
        })?;
        Ok(CertificateAuthorityInfo {
            name: self.verifier.subject_name(&root),
            trusted: self.verifier.is_trusted(&root),
            fingerprint: root.fingerprint(),
            self_signed: root.is_self_signed(),
        })
    }

    /// Run every check and report each outcome. Never fails.
    pub fn verify_detailed(&self, request: &PaymentRequest) -> VerificationReport {
        let authority = self.root_authority(request).ok();
        VerificationReport {
            signature_verified: self.verify(request),
            chain_verified: self.verify_chain(request),
            ca_trusted: authority.as_ref().is_some_and(|ca| ca.trusted),
            self_signed: authority.as_ref().is_some_and(|ca| ca.self_signed),
            ca_name: authority.map(|ca| ca.name),
        }
    }
}
