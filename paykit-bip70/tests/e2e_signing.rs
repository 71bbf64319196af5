//! End-to-end signing and verification of payment requests.

mod common;

use std::sync::Arc;

use common::*;
use paykit_bip70::clock::FixedClock;
use paykit_bip70::pki::{TrustStore, X509Verifier};
use paykit_bip70::prelude::*;

#[test]
fn test_sign_serialize_verify() {
    init_tracing();
    let mut request = PaymentRequest::new(details());
    request
        .sign(&merchant_key(), Some(&[der(MERCHANT_RSA_CERT_PEM)]))
        .unwrap();

    let bytes = request.to_bytes().unwrap();
    let received = PaymentRequest::from_bytes(&bytes).unwrap();
    assert_eq!(received, request);
    assert!(received.verify());
    assert_eq!(received.payment_details.network_or_default(), "testnet");
    assert_eq!(received.payment_details.total_amount().unwrap(), 10_000);
}

#[test]
fn test_tampered_details_fail_verification() {
    init_tracing();
    let request = signed_request();
    let mut bytes = request.to_bytes().unwrap();

    // flip the output value inside the embedded details
    let details = request.payment_details_bytes().unwrap();
    let start = bytes
        .windows(details.len())
        .position(|w| w == details.as_slice())
        .unwrap();
    let value_at = start + details.iter().position(|&b| b == 0x90).unwrap();
    bytes[value_at] ^= 0x01;

    let tampered = PaymentRequest::from_bytes(&bytes).unwrap();
    assert_ne!(tampered.payment_details, request.payment_details);
    assert!(!tampered.verify());
}

#[test]
fn test_tampered_signature_fails_verification() {
    let mut request = signed_request();
    if let Some(sig) = request.signature.as_mut() {
        sig[10] ^= 0xff;
    }
    assert!(!request.verify());
}

#[test]
fn test_ecdsa_leaf_with_root() {
    init_tracing();
    let chain = vec![der(LEAF_EC_CERT_PEM), der(ROOT_CA_CERT_PEM)];
    let mut request = PaymentRequest::new(details().with_memo("EC signed"));
    request.sign(&leaf_key(), Some(&chain)).unwrap();

    let received = PaymentRequest::from_bytes(&request.to_bytes().unwrap()).unwrap();
    assert!(received.verify());
    assert!(received.verify_chain());

    let ca = received.root_authority().unwrap();
    assert_eq!(ca.name, "O=Paykit Test,CN=Paykit Test Root CA");
    assert!(ca.self_signed);
    assert!(!ca.trusted);
}

#[test]
fn test_trusted_root_via_store() {
    let chain = vec![der(LEAF_EC_CERT_PEM), der(ROOT_CA_CERT_PEM)];
    let mut request = PaymentRequest::new(details());
    request.sign(&leaf_key(), Some(&chain)).unwrap();

    let store = TrustStore::from_pem_bundle(ROOT_CA_CERT_PEM).unwrap();
    let binding = TrustBinding::new(
        RustCryptoProvider,
        X509Verifier::new(store).with_require_trusted_root(true),
    );
    let report = binding.verify_detailed(&request);
    assert!(report.is_valid());
    assert!(report.ca_trusted);
    assert_eq!(
        report.ca_name.as_deref(),
        Some("O=Paykit Test,CN=Paykit Test Root CA")
    );

    // self-signed merchant is not anchored
    let merchant = signed_request();
    assert!(binding.verify(&merchant));
    assert!(!binding.verify_chain(&merchant));
}

fn policy_binding() -> TrustBinding {
    let store = TrustStore::from_pem_bundle(POLICY_ROOT_CERT_PEM).unwrap();
    TrustBinding::new(
        RustCryptoProvider,
        X509Verifier::new(store)
            .with_require_trusted_root(true)
            .with_clock(Arc::new(FixedClock(1_893_456_000))),
    )
}

#[test]
fn test_chain_through_intermediate_ca() {
    init_tracing();
    let chain = vec![
        der(POLICY_LEAF_CERT_PEM),
        der(POLICY_INTERMEDIATE_CERT_PEM),
        der(POLICY_ROOT_CERT_PEM),
    ];
    let mut request = PaymentRequest::new(details());
    request.sign(&key(POLICY_LEAF_KEY_PEM), Some(&chain)).unwrap();

    let report = policy_binding().verify_detailed(&request);
    assert!(report.is_valid());
    assert!(report.ca_trusted);
}

#[test]
fn test_certificate_minted_by_end_entity_is_rejected() {
    init_tracing();
    // the issuer is an ordinary leaf of the trusted root
    let chain = vec![
        der(NON_CA_ISSUED_CERT_PEM),
        der(NON_CA_ISSUER_CERT_PEM),
        der(POLICY_ROOT_CERT_PEM),
    ];
    let mut request = PaymentRequest::new(details());
    request.sign(&key(NON_CA_ISSUED_KEY_PEM), Some(&chain)).unwrap();

    let binding = policy_binding();
    assert!(binding.verify(&request));
    assert!(!binding.verify_chain(&request));
    assert!(!binding.verify_detailed(&request).is_valid());

    // same result when the root is left to the store
    request.sign(&key(NON_CA_ISSUED_KEY_PEM), Some(&chain[..2])).unwrap();
    assert!(binding.verify(&request));
    assert!(!binding.verify_chain(&request));
}

#[test]
fn test_expired_certificate_chain() {
    let chain = vec![der(EXPIRED_EC_CERT_PEM)];
    let mut request = PaymentRequest::new(details()).with_pki_type("x509+sha256");
    request.set_chain(&chain).unwrap();

    assert!(!request.verify_chain());
    let at_2000 = TrustBinding::new(
        RustCryptoProvider,
        X509Verifier::default().with_clock(Arc::new(FixedClock(946_771_200))),
    );
    assert!(at_2000.verify_chain(&request));
}

#[test]
fn test_sha1_pki_type() {
    let mut request = PaymentRequest::new(details()).with_pki_type("x509+sha1");
    request
        .sign(&merchant_key(), Some(&[der(MERCHANT_RSA_CERT_PEM)]))
        .unwrap();
    assert_eq!(request.pki_type.as_deref(), Some("x509+sha1"));
    assert!(request.verify());

    // relabelled digest no longer matches
    request.pki_type = Some("x509+sha256".into());
    assert!(!request.verify());
}

#[test]
fn test_binding_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let roots = dir.path().join("roots.pem");
    std::fs::write(&roots, ROOT_CA_CERT_PEM).unwrap();

    let config = ProtocolConfig::new()
        .with_default_pki_type("x509+sha1")
        .with_require_trusted_root(true)
        .with_trusted_roots_pem(&roots);
    let binding = TrustBinding::from_config(&config).unwrap();
    assert_eq!(binding.verifier().trust_store().len(), 1);

    let mut request = PaymentRequest::new(details());
    binding
        .sign(&mut request, &leaf_key(), Some(&[der(LEAF_EC_CERT_PEM)]))
        .unwrap();
    assert_eq!(request.pki_type.as_deref(), Some("x509+sha1"));
    assert!(binding.verify(&request));
    assert!(binding.verify_chain(&request));
}

#[test]
fn test_payment_and_ack_exchange() {
    let request = PaymentRequest::from_bytes(&signed_request().to_bytes().unwrap()).unwrap();
    assert!(request.verify());

    let mut details = request.payment_details.clone();
    details
        .set_merchant_data_json(&serde_json::json!({"invoice": "INV-1"}))
        .unwrap();

    let payment = Payment::new()
        .with_merchant_data(details.merchant_data.clone().unwrap())
        .with_transaction(vec![0x02, 0x00, 0x00, 0x00, 0x01])
        .with_refund_to(PaymentOutput::new(10_000, vec![0x00, 0x14]).unwrap())
        .with_memo("paid");
    let payment = Payment::from_bytes(&payment.to_bytes().unwrap()).unwrap();
    let data: serde_json::Value = payment.merchant_data_json().unwrap().unwrap();
    assert_eq!(data["invoice"], "INV-1");

    let ack = PaymentAck::new(payment.clone()).with_memo("thank you");
    let ack = PaymentAck::from_bytes(&ack.to_bytes().unwrap()).unwrap();
    assert_eq!(ack.payment, payment);
    assert_eq!(ack.memo.as_deref(), Some("thank you"));
}
