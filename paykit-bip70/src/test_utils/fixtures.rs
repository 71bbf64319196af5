//! Keys and certificates under `tests/fixtures`.
//!
//! - merchant: self-signed RSA 2048, `CN=Test Merchant`
//! - root: RSA CA, `CN=Paykit Test Root CA` (private key not kept)
//! - leaf: P-256, `CN=shop.example.com`, issued by root
//! - expired: self-signed P-256, valid during 2000 only
//! - policy: P-256 root (pathLen 1) -> intermediate (pathLen 0) -> leaf
//! - non-CA issuer: end-entity under the policy root that signed another leaf
//! - sub CA and deep leaf: one CA level too many below the intermediate
//! - signing-only CA: cA set but keyUsage lacks keyCertSign

use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

pub const MERCHANT_RSA_KEY_PEM: &str = include_str!("../../tests/fixtures/merchant_rsa_key.pem");
pub const MERCHANT_RSA_CERT_PEM: &str = include_str!("../../tests/fixtures/merchant_rsa_cert.pem");
pub const ROOT_CA_CERT_PEM: &str = include_str!("../../tests/fixtures/root_ca_cert.pem");
pub const LEAF_EC_KEY_PEM: &str = include_str!("../../tests/fixtures/leaf_ec_key.pem");
pub const LEAF_EC_CERT_PEM: &str = include_str!("../../tests/fixtures/leaf_ec_cert.pem");
pub const EXPIRED_EC_CERT_PEM: &str = include_str!("../../tests/fixtures/expired_ec_cert.pem");
pub const POLICY_ROOT_CERT_PEM: &str = include_str!("../../tests/fixtures/policy_root_cert.pem");
pub const POLICY_INTERMEDIATE_CERT_PEM: &str =
    include_str!("../../tests/fixtures/policy_intermediate_cert.pem");
pub const POLICY_LEAF_CERT_PEM: &str = include_str!("../../tests/fixtures/policy_leaf_cert.pem");
pub const NON_CA_ISSUER_CERT_PEM: &str = include_str!("../../tests/fixtures/non_ca_issuer_cert.pem");
pub const NON_CA_ISSUED_CERT_PEM: &str = include_str!("../../tests/fixtures/non_ca_issued_cert.pem");
pub const SUB_CA_CERT_PEM: &str = include_str!("../../tests/fixtures/sub_ca_cert.pem");
pub const DEEP_LEAF_CERT_PEM: &str = include_str!("../../tests/fixtures/deep_leaf_cert.pem");
pub const SIGNING_ONLY_CA_CERT_PEM: &str =
    include_str!("../../tests/fixtures/signing_only_ca_cert.pem");
pub const SIGNING_ONLY_ISSUED_CERT_PEM: &str =
    include_str!("../../tests/fixtures/signing_only_issued_cert.pem");

/// DER encoding of a PEM certificate.
pub fn pem_to_der(pem: &str) -> Vec<u8> {
    Certificate::from_pem(pem.as_bytes())
        .and_then(|cert| cert.to_der())
        .expect("fixture certificate")
}

pub fn merchant_rsa_cert_der() -> Vec<u8> {
    pem_to_der(MERCHANT_RSA_CERT_PEM)
}

pub fn root_ca_cert_der() -> Vec<u8> {
    pem_to_der(ROOT_CA_CERT_PEM)
}

pub fn leaf_ec_cert_der() -> Vec<u8> {
    pem_to_der(LEAF_EC_CERT_PEM)
}

pub fn expired_ec_cert_der() -> Vec<u8> {
    pem_to_der(EXPIRED_EC_CERT_PEM)
}
