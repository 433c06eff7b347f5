//! Integration tests for encrypted buttons.
//!
//! Envelopes are opened with the PayPal-side key generated for the test, the
//! same way PayPal recovers the button fields.

mod common;

use common::TestPki;
use paypal_standard::{
    IntegrationError,
    envelope::{Credentials, ENCRYPTED_BUTTON_CMD, EnvelopeBuilder, canonicalize, open_envelope},
    form::{FieldSet, PaymentForm},
    mapping::MappingTable,
};
use proptest::prelude::*;

fn order_fields() -> FieldSet {
    let mut form = PaymentForm::new(
        MappingTable::paypal(),
        "1000",
        "seller@example.com",
        &[("amount", "50.00"), ("currency", "CAD")],
    );
    form.set("invoice", "#1000").unwrap();
    form.into_fields()
}

#[test]
fn test_envelope_round_trip() {
    let pki = TestPki::new();
    let fields = order_fields();

    let envelope = EnvelopeBuilder::new(pki.config()).build(&fields).unwrap();
    let text = envelope.as_str();
    assert!(text.starts_with("-----BEGIN PKCS7-----"));
    assert!(text.ends_with("-----END PKCS7-----"));
    assert!(!text.contains('\n'));

    let plaintext = open_envelope(text, &pki.paypal.key, &pki.paypal.cert).unwrap();
    assert_eq!(plaintext, canonicalize(&fields));
}

#[test]
fn test_repeated_builds_share_plaintext() {
    let pki = TestPki::new();
    let builder = EnvelopeBuilder::new(pki.config());
    let fields = order_fields();

    let first = builder.build(&fields).unwrap();
    let second = builder.build(&fields).unwrap();
    assert_ne!(first, second, "fresh session key per envelope");

    let expected = canonicalize(&fields);
    for envelope in [&first, &second] {
        let plaintext = open_envelope(envelope.as_str(), &pki.paypal.key, &pki.paypal.cert).unwrap();
        assert_eq!(plaintext, expected);
    }
}

#[test]
fn test_merchant_cannot_open_envelope() {
    let pki = TestPki::new();
    let envelope = EnvelopeBuilder::new(pki.config()).build(&order_fields()).unwrap();

    let err = open_envelope(envelope.as_str(), &pki.merchant.key, &pki.merchant.cert).unwrap_err();
    assert!(matches!(err, IntegrationError::CredentialError(_)));
}

#[test]
fn test_seal_form_puts_cert_id_first() {
    let pki = TestPki::new();
    let fields = order_fields();

    let sealed = EnvelopeBuilder::new(pki.config()).seal_form(&fields).unwrap();
    assert_eq!(sealed.len(), 2);
    assert_eq!(sealed.get("cmd"), Some(ENCRYPTED_BUTTON_CMD));

    let plaintext =
        open_envelope(sealed.get("encrypted").unwrap(), &pki.paypal.key, &pki.paypal.cert).unwrap();
    let plaintext = String::from_utf8(plaintext).unwrap();
    let mut lines = plaintext.lines();
    assert_eq!(lines.next(), Some("cert_id=ABCDEFGHIJKLM"));
    assert_eq!(lines.next(), Some("item_number=1000"));
    assert!(plaintext.contains("\namount=50.00\n"));
    assert!(plaintext.contains("\ncurrency_code=CAD\n"));
    assert!(plaintext.ends_with("invoice=#1000"));
}

#[test]
fn test_passphrase_protected_key() {
    let pki = TestPki::with_passphrase(Some("s3cret"));
    let mut config = pki.config();

    let err = EnvelopeBuilder::new(config.clone()).build(&order_fields()).unwrap_err();
    assert!(matches!(err, IntegrationError::CredentialError(_)));

    config.prvkey_passphrase = "s3cret".to_owned();
    let envelope = EnvelopeBuilder::new(config).build(&order_fields()).unwrap();
    assert!(open_envelope(envelope.as_str(), &pki.paypal.key, &pki.paypal.cert).is_ok());
}

#[test]
fn test_missing_paypal_certificate() {
    let pki = TestPki::new();
    std::fs::remove_file(pki.dir.path().join("paypal-cert.pem")).unwrap();

    let err = EnvelopeBuilder::new(pki.config()).build(&order_fields()).unwrap_err();
    assert!(err.to_string().contains("paypal-cert.pem"));
}

#[test]
fn test_credentials_reread_each_build() {
    let pki = TestPki::new();
    let builder = EnvelopeBuilder::new(pki.config());
    builder.build(&order_fields()).unwrap();

    std::fs::write(pki.dir.path().join("paypal-prvkey.pem"), "garbage").unwrap();
    assert!(builder.build(&order_fields()).is_err());
}

#[test]
fn test_custom_file_names() {
    let pki = TestPki::new();
    std::fs::rename(pki.dir.path().join("paypal-cert.pem"), pki.dir.path().join("live.pem")).unwrap();

    let mut config = pki.config();
    config.paypal_cert_file = "live.pem".to_owned();
    assert!(EnvelopeBuilder::new(config).build(&order_fields()).is_ok());
}

#[test]
fn test_key_pair_check() {
    let pki = TestPki::new();
    assert!(Credentials::load(&pki.config()).unwrap().key_matches_certificate());

    std::fs::write(pki.dir.path().join("paypal-pubcert.pem"), pki.paypal.cert_pem()).unwrap();
    assert!(!Credentials::load(&pki.config()).unwrap().key_matches_certificate());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_round_trip_recovers_canonical_plaintext(
        values in proptest::collection::vec("[ -~]{1,40}", 1..6),
    ) {
        let pki = TestPki::new();
        let fields: FieldSet = values
            .iter()
            .enumerate()
            .map(|(i, value)| (format!("custom_{i}"), value.clone()))
            .collect();

        let envelope = EnvelopeBuilder::new(pki.config()).build(&fields).unwrap();
        let plaintext = open_envelope(envelope.as_str(), &pki.paypal.key, &pki.paypal.cert).unwrap();
        prop_assert_eq!(plaintext, canonicalize(&fields));
    }
}
