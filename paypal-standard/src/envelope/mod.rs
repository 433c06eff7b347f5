//! Encrypted payment buttons.
//!
//! PayPal's encrypted website payments let a merchant seal the button fields so
//! the buyer's browser cannot alter the amount or the recipient. The fields are
//! canonicalized, signed with the merchant key and encrypted for PayPal's
//! certificate; the form then carries only `cmd=_s_xclick` and the sealed blob.
//!
//! # Pipeline
//!
//! ```text
//! FieldSet ──canonicalize──▶ bytes ──sign──▶ SignedData ──encrypt──▶ EnvelopedData ──armor──▶ text
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use paypal_standard::{
//!     config::CredentialConfig, envelope::EnvelopeBuilder, form::PaymentForm,
//!     mapping::MappingTable,
//! };
//!
//! # fn example() -> paypal_standard::Result<()> {
//! let form = PaymentForm::new(
//!     MappingTable::paypal(),
//!     "1000",
//!     "seller@example.com",
//!     &[("amount", "50.00"), ("currency", "CAD")],
//! );
//!
//! let mut credentials = CredentialConfig::in_dir("/etc/shop/paypal");
//! credentials.cert_id = Some("ABCDEFGHIJKLM".to_owned());
//!
//! let sealed = EnvelopeBuilder::new(credentials).seal_form(form.form_fields())?;
//! assert_eq!(sealed.get("cmd"), Some("_s_xclick"));
//! # Ok(())
//! # }
//! ```

use std::fmt;

use tracing::{debug, instrument};

use crate::{
    config::CredentialConfig,
    error::{IntegrationError, Result},
    form::FieldSet,
};

mod credentials;
mod crypto;

pub use credentials::{Credentials, load_certificate, load_private_key};
pub use crypto::{armor, canonicalize, encrypt, open_envelope, payload_digest, sign, unarmor};

/// `cmd` value for an encrypted button.
pub const ENCRYPTED_BUTTON_CMD: &str = "_s_xclick";

/// Form field that carries the sealed envelope.
pub const ENCRYPTED_FIELD: &str = "encrypted";

/// Signed-then-encrypted payment request as single-line PEM text.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope(String);

impl EncryptedEnvelope {
    /// Returns the envelope text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the envelope, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptedEnvelope").field(&format_args!("{} bytes", self.0.len())).finish()
    }
}

/// Seals field sets with the merchant's credentials.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    config: CredentialConfig,
}

impl EnvelopeBuilder {
    /// Creates a builder reading credentials from `config`.
    #[must_use]
    pub fn new(config: CredentialConfig) -> Self {
        Self { config }
    }

    /// Returns the credential configuration.
    #[must_use]
    pub fn config(&self) -> &CredentialConfig {
        &self.config
    }

    /// Canonicalizes, signs and encrypts `fields`.
    ///
    /// Credential files are read and parsed on every call.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::CredentialError`] if any credential file is
    /// missing or malformed, or a cryptographic step fails. Nothing is returned
    /// on failure.
    #[instrument(skip_all, fields(fields = fields.len(), cert_dir = %self.config.cert_dir.display()))]
    pub fn build(&self, fields: &FieldSet) -> Result<EncryptedEnvelope> {
        let credentials = Credentials::load(&self.config)?;

        let canonical = canonicalize(fields);
        let signed = sign(&canonical, &credentials.merchant_cert, &credentials.merchant_key)?;
        let enveloped = encrypt(&signed, &credentials.paypal_cert)?;
        let text = armor(&enveloped)?;

        debug!(digest = %payload_digest(&canonical), envelope_len = text.len(), "sealed payment envelope");
        Ok(EncryptedEnvelope(text))
    }

    /// Seals a complete button: `cert_id` plus every form field goes into the
    /// envelope, and the returned set holds only what the page should render.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::CredentialError`] if no `cert_id` is configured
    /// or [`build`](Self::build) fails.
    pub fn seal_form(&self, form_fields: &FieldSet) -> Result<FieldSet> {
        let cert_id = self
            .config
            .cert_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                IntegrationError::CredentialError(
                    "cert_id is required for encrypted buttons".to_owned(),
                )
            })?;

        let mut sealed_input = FieldSet::new();
        sealed_input.insert("cert_id", cert_id);
        sealed_input.extend(form_fields.iter());

        let envelope = self.build(&sealed_input)?;

        let mut rendered = FieldSet::new();
        rendered.insert("cmd", ENCRYPTED_BUTTON_CMD);
        rendered.insert(ENCRYPTED_FIELD, envelope.into_string());
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldSet {
        [("amount", "50.00"), ("currency_code", "CAD")].into_iter().collect()
    }

    #[test]
    fn test_missing_credentials_fail_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let builder = EnvelopeBuilder::new(CredentialConfig::in_dir(dir.path()));

        let err = builder.build(&fields()).unwrap_err();
        match err {
            IntegrationError::CredentialError(msg) => assert!(msg.contains("paypal-pubcert.pem")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_certificate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("paypal-pubcert.pem"), "not a certificate").unwrap();
        let builder = EnvelopeBuilder::new(CredentialConfig::in_dir(dir.path()));

        let err = builder.build(&fields()).unwrap_err();
        assert!(err.to_string().contains("malformed certificate"));
    }

    #[test]
    fn test_seal_form_requires_cert_id() {
        let dir = tempfile::tempdir().unwrap();
        let builder = EnvelopeBuilder::new(CredentialConfig::in_dir(dir.path()));

        let err = builder.seal_form(&fields()).unwrap_err();
        assert!(err.to_string().contains("cert_id"));
    }

    #[test]
    fn test_envelope_debug_hides_content() {
        let envelope = EncryptedEnvelope("-----BEGIN PKCS7-----AAAA-----END PKCS7-----".into());
        assert!(!format!("{envelope:?}").contains("AAAA"));
        assert!(envelope.to_string().contains("AAAA"));
    }
}
