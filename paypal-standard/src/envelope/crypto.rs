//! Sign-then-encrypt primitives for encrypted buttons.
//!
//! Each step is a standalone function so the pipeline can be checked piece by
//! piece against OpenSSL's own `smime`/`pkcs7` tooling.

use base64::{Engine, engine::general_purpose::STANDARD};
use openssl::{
    pkcs7::{Pkcs7, Pkcs7Flags},
    pkey::{HasPrivate, PKeyRef, Private},
    stack::Stack,
    symm::Cipher,
    x509::{X509, X509Ref, store::X509StoreBuilder},
};
use sha2::{Digest, Sha256};

use crate::{
    error::{IntegrationError, Result},
    form::FieldSet,
};

const PEM_HEADER: &str = "-----BEGIN PKCS7-----";
const PEM_FOOTER: &str = "-----END PKCS7-----";

fn crypto_error(step: &'static str) -> impl FnOnce(openssl::error::ErrorStack) -> IntegrationError {
    move |e| IntegrationError::CredentialError(format!("{step} failed: {e}"))
}

/// Serializes fields as `name=value` lines joined by `\n`, in field-set order.
///
/// # Examples
///
/// ```
/// use paypal_standard::{envelope::canonicalize, form::FieldSet};
///
/// let fields: FieldSet = [("cert_id", "ABC"), ("cmd", "_cart")].into_iter().collect();
/// assert_eq!(canonicalize(&fields), b"cert_id=ABC\ncmd=_cart");
/// ```
#[must_use]
pub fn canonicalize(fields: &FieldSet) -> Vec<u8> {
    fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

/// Produces a DER-encoded PKCS#7 SignedData carrying `content`.
///
/// The content is embedded so the recipient can read it back after
/// decryption, and signed in binary mode so no newline translation happens.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if the key does not match the
/// certificate or OpenSSL rejects the material.
pub fn sign<T: HasPrivate>(content: &[u8], certificate: &X509Ref, key: &PKeyRef<T>) -> Result<Vec<u8>> {
    let chain = Stack::<X509>::new().map_err(crypto_error("signing"))?;
    let signed = Pkcs7::sign(certificate, key, &chain, content, Pkcs7Flags::BINARY)
        .map_err(crypto_error("signing"))?;
    signed.to_der().map_err(crypto_error("signature encoding"))
}

/// Produces a DER-encoded PKCS#7 EnvelopedData of `signed` for `recipient`.
///
/// Uses triple-DES in CBC mode, the cipher PayPal's encrypted button service accepts.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if the recipient certificate
/// cannot be used for key transport.
pub fn encrypt(signed: &[u8], recipient: &X509Ref) -> Result<Vec<u8>> {
    let mut recipients = Stack::<X509>::new().map_err(crypto_error("encryption"))?;
    recipients.push(recipient.to_owned()).map_err(crypto_error("encryption"))?;
    let enveloped =
        Pkcs7::encrypt(&recipients, signed, Cipher::des_ede3_cbc(), Pkcs7Flags::BINARY)
            .map_err(crypto_error("encryption"))?;
    enveloped.to_der().map_err(crypto_error("envelope encoding"))
}

/// Encodes a DER PKCS#7 structure as PEM with every line break removed.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if `der` is not PKCS#7.
pub fn armor(der: &[u8]) -> Result<String> {
    let pkcs7 = Pkcs7::from_der(der).map_err(crypto_error("envelope decoding"))?;
    let pem = pkcs7.to_pem().map_err(crypto_error("envelope encoding"))?;
    let text = String::from_utf8(pem).map_err(|e| {
        IntegrationError::CredentialError(format!("envelope encoding produced non-UTF-8 PEM: {e}"))
    })?;
    Ok(text.replace(['\r', '\n'], ""))
}

/// Decodes single-line or multi-line PEM text back to DER.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if the armor or base64 is invalid.
pub fn unarmor(text: &str) -> Result<Vec<u8>> {
    let body = text
        .trim()
        .strip_prefix(PEM_HEADER)
        .and_then(|rest| rest.strip_suffix(PEM_FOOTER))
        .ok_or_else(|| {
            IntegrationError::CredentialError("envelope is not PKCS#7 PEM".to_owned())
        })?;
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| IntegrationError::CredentialError(format!("invalid envelope base64: {e}")))
}

/// Decrypts an armored envelope and returns the signed content.
///
/// The signature is checked against the embedded signer certificate; the
/// certificate chain is not, because merchant certificates are self-signed.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if the envelope was not
/// encrypted for `certificate`, or the signature does not verify.
pub fn open_envelope(text: &str, key: &PKeyRef<Private>, certificate: &X509Ref) -> Result<Vec<u8>> {
    let der = unarmor(text)?;
    let enveloped = Pkcs7::from_der(&der).map_err(crypto_error("envelope decoding"))?;
    let signed_der = enveloped
        .decrypt(key, certificate, Pkcs7Flags::BINARY)
        .map_err(crypto_error("decryption"))?;

    let signed = Pkcs7::from_der(&signed_der).map_err(crypto_error("signature decoding"))?;
    let certs = Stack::<X509>::new().map_err(crypto_error("verification"))?;
    let store = X509StoreBuilder::new().map_err(crypto_error("verification"))?.build();
    let mut content = Vec::new();
    signed
        .verify(
            &certs,
            &store,
            None,
            Some(&mut content),
            Pkcs7Flags::NOVERIFY | Pkcs7Flags::BINARY,
        )
        .map_err(crypto_error("signature verification"))?;
    Ok(content)
}

/// Computes a SHA-256 digest of canonical content for correlation in logs.
#[must_use]
pub fn payload_digest(content: &[u8]) -> String {
    let hash = Sha256::digest(content);
    format!("sha-256=:{}:", STANDARD.encode(hash))
}
