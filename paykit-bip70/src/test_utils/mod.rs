//! Test utilities for payment protocol messages.
//!
//! Provides fixed keys and certificates plus ready-made requests so tests
//! do not have to rebuild the same scenario.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paykit_bip70::test_utils::{fixtures, signed_request};
//!
//! let request = signed_request();
//! assert!(request.verify());
//! ```

pub mod fixtures;

use crate::clock::FixedClock;
use crate::messages::{PaymentDetails, PaymentOutput, PaymentRequest};
use crate::pki::SigningKey;

/// Details for the canonical scenario: testnet, one 10 000 unit output,
/// created at 1000 and expiring at 2000.
pub fn sample_details() -> PaymentDetails {
    PaymentDetails::with_clock(&FixedClock(1000))
        .with_network("testnet")
        .with_output(PaymentOutput {
            value: 10_000,
            script: Vec::new(),
        })
        .with_expires(2000)
        .expect("fixture expiry")
}

/// [`sample_details`] wrapped in an unsigned request.
pub fn sample_request() -> PaymentRequest {
    PaymentRequest::new(sample_details())
}

/// [`sample_request`] signed by the self-signed RSA merchant certificate.
pub fn signed_request() -> PaymentRequest {
    let mut request = sample_request();
    request
        .sign(&merchant_key(), Some(&[fixtures::merchant_rsa_cert_der()]))
        .expect("fixture request signs");
    request
}

/// RSA key matching [`fixtures::MERCHANT_RSA_CERT_PEM`].
pub fn merchant_key() -> SigningKey {
    SigningKey::from_pkcs8_pem(fixtures::MERCHANT_RSA_KEY_PEM).expect("fixture RSA key")
}

/// P-256 key matching [`fixtures::LEAF_EC_CERT_PEM`].
pub fn leaf_key() -> SigningKey {
    SigningKey::from_pkcs8_pem(fixtures::LEAF_EC_KEY_PEM).expect("fixture EC key")
}
