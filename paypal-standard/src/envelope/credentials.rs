//! Credential loading.
//!
//! Files are read on every call; nothing is cached between envelopes.

use std::path::Path;

use openssl::{
    pkey::{PKey, Private},
    x509::X509,
};
use zeroize::Zeroize;

use crate::{
    config::CredentialConfig,
    error::{IntegrationError, Result},
};

/// Parsed certificate and key material for one envelope build.
pub struct Credentials {
    /// Merchant public certificate.
    pub merchant_cert: X509,
    /// Merchant private key.
    pub merchant_key: PKey<Private>,
    /// PayPal public certificate.
    pub paypal_cert: X509,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("merchant_key", &"[REDACTED]").finish_non_exhaustive()
    }
}

impl Credentials {
    /// Reads and parses all three credential files.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::CredentialError`] naming the first file that is
    /// missing, unreadable or malformed.
    pub fn load(config: &CredentialConfig) -> Result<Self> {
        let merchant_cert = load_certificate(&config.pubcert_path())?;
        let merchant_key = load_private_key(&config.prvkey_path(), &config.prvkey_passphrase)?;
        let paypal_cert = load_certificate(&config.paypal_cert_path())?;
        Ok(Self { merchant_cert, merchant_key, paypal_cert })
    }

    /// True when the merchant key is the private half of the merchant certificate.
    ///
    /// A mismatched pair loads fine but produces envelopes PayPal rejects.
    #[must_use]
    pub fn key_matches_certificate(&self) -> bool {
        self.merchant_cert
            .public_key()
            .is_ok_and(|public| public.public_eq(&*self.merchant_key))
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        IntegrationError::CredentialError(format!("cannot read {}: {e}", path.display()))
    })
}

/// Reads a PEM certificate.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if the file is unreadable or not a certificate.
pub fn load_certificate(path: &Path) -> Result<X509> {
    let pem = read(path)?;
    X509::from_pem(&pem).map_err(|e| {
        IntegrationError::CredentialError(format!("malformed certificate {}: {e}", path.display()))
    })
}

/// Reads a PEM private key, decrypting it with `passphrase` if it is encrypted.
///
/// # Errors
///
/// Returns [`IntegrationError::CredentialError`] if the file is unreadable, not a
/// private key, or the passphrase is wrong.
pub fn load_private_key(path: &Path, passphrase: &str) -> Result<PKey<Private>> {
    let mut pem = read(path)?;
    let key = PKey::private_key_from_pem_passphrase(&pem, passphrase.as_bytes());
    pem.zeroize();
    key.map_err(|e| {
        IntegrationError::CredentialError(format!("malformed private key {}: {e}", path.display()))
    })
}
