//! Shared fixtures for integration tests.

#![allow(dead_code)]

use paykit_bip70::clock::FixedClock;
use paykit_bip70::{PaymentDetails, PaymentOutput, PaymentRequest, SigningKey};
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

pub const MERCHANT_RSA_KEY_PEM: &str = include_str!("../fixtures/merchant_rsa_key.pem");
pub const MERCHANT_RSA_CERT_PEM: &str = include_str!("../fixtures/merchant_rsa_cert.pem");
pub const ROOT_CA_CERT_PEM: &str = include_str!("../fixtures/root_ca_cert.pem");
pub const LEAF_EC_KEY_PEM: &str = include_str!("../fixtures/leaf_ec_key.pem");
pub const LEAF_EC_CERT_PEM: &str = include_str!("../fixtures/leaf_ec_cert.pem");
pub const EXPIRED_EC_CERT_PEM: &str = include_str!("../fixtures/expired_ec_cert.pem");
pub const POLICY_ROOT_CERT_PEM: &str = include_str!("../fixtures/policy_root_cert.pem");
pub const POLICY_INTERMEDIATE_CERT_PEM: &str = include_str!("../fixtures/policy_intermediate_cert.pem");
pub const POLICY_LEAF_CERT_PEM: &str = include_str!("../fixtures/policy_leaf_cert.pem");
pub const POLICY_LEAF_KEY_PEM: &str = include_str!("../fixtures/policy_leaf_key.pem");
pub const NON_CA_ISSUER_CERT_PEM: &str = include_str!("../fixtures/non_ca_issuer_cert.pem");
pub const NON_CA_ISSUED_CERT_PEM: &str = include_str!("../fixtures/non_ca_issued_cert.pem");
pub const NON_CA_ISSUED_KEY_PEM: &str = include_str!("../fixtures/non_ca_issued_key.pem");

pub fn der(pem: &str) -> Vec<u8> {
    Certificate::from_pem(pem.as_bytes())
        .unwrap()
        .to_der()
        .unwrap()
}

pub fn merchant_key() -> SigningKey {
    SigningKey::from_pkcs8_pem(MERCHANT_RSA_KEY_PEM).unwrap()
}

pub fn leaf_key() -> SigningKey {
    SigningKey::from_pkcs8_pem(LEAF_EC_KEY_PEM).unwrap()
}

pub fn key(pem: &str) -> SigningKey {
    SigningKey::from_pkcs8_pem(pem).unwrap()
}

pub fn details() -> PaymentDetails {
    PaymentDetails::with_clock(&FixedClock(1000))
        .with_network("testnet")
        .with_output(PaymentOutput::new(10_000, Vec::new()).unwrap())
        .with_expires(2000)
        .unwrap()
}

pub fn signed_request() -> PaymentRequest {
    let mut request = PaymentRequest::new(details());
    request
        .sign(&merchant_key(), Some(&[der(MERCHANT_RSA_CERT_PEM)]))
        .unwrap();
    request
}

/// Install a test subscriber so `RUST_LOG=debug` shows why checks fail.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
