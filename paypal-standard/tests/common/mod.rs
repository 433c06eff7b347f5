//! Test credentials generated at run time.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::path::Path;

use openssl::{
    asn1::Asn1Time,
    bn::BigNum,
    hash::MessageDigest,
    pkey::{PKey, Private},
    rsa::Rsa,
    symm::Cipher,
    x509::{X509, X509NameBuilder},
};
use paypal_standard::config::CredentialConfig;
use tempfile::TempDir;

/// Key pair plus self-signed certificate.
pub struct Identity {
    pub key: PKey<Private>,
    pub cert: X509,
}

impl Identity {
    pub fn generate(common_name: &str, serial: u32) -> Self {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", common_name).unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        Self { key, cert: builder.build() }
    }

    pub fn cert_pem(&self) -> Vec<u8> {
        self.cert.to_pem().unwrap()
    }
}

/// Merchant and PayPal identities written to a credential directory.
pub struct TestPki {
    pub dir: TempDir,
    pub merchant: Identity,
    pub paypal: Identity,
}

impl TestPki {
    /// Writes credentials under the default file names with an unencrypted key.
    pub fn new() -> Self {
        Self::with_passphrase(None)
    }

    /// Writes credentials, encrypting the merchant key when `passphrase` is set.
    pub fn with_passphrase(passphrase: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let merchant = Identity::generate("merchant.example.com", 1);
        let paypal = Identity::generate("paypal.example.com", 2);

        let key_pem = match passphrase {
            Some(pass) => merchant
                .key
                .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), pass.as_bytes())
                .unwrap(),
            None => merchant.key.private_key_to_pem_pkcs8().unwrap(),
        };

        write(dir.path(), "paypal-pubcert.pem", &merchant.cert_pem());
        write(dir.path(), "paypal-prvkey.pem", &key_pem);
        write(dir.path(), "paypal-cert.pem", &paypal.cert_pem());

        Self { dir, merchant, paypal }
    }

    pub fn config(&self) -> CredentialConfig {
        let mut config = CredentialConfig::in_dir(self.dir.path());
        config.cert_id = Some("ABCDEFGHIJKLM".to_owned());
        config
    }
}

fn write(dir: &Path, name: &str, contents: &[u8]) {
    std::fs::write(dir.join(name), contents).unwrap();
}
