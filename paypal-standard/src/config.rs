//! Integration configuration.
//!
//! This module defines TOML-deserializable configuration for the merchant
//! account, the encrypted-button credentials and the IPN postback client.
//!
//! ```toml
//! environment = "sandbox"
//! account = "seller@example.com"
//! application_id = "Shop_Cart_WPS"
//!
//! [credentials]
//! cert_dir = "config/paypal"
//! cert_id = "ABCDEFGHIJKLM"
//!
//! [postback]
//! timeout_secs = 20
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::error::{IntegrationError, Result};

/// Live PayPal endpoint for buttons and IPN postbacks.
pub const PRODUCTION_SERVICE_URL: &str = "https://www.paypal.com/cgi-bin/webscr";

/// Sandbox PayPal endpoint for buttons and IPN postbacks.
pub const SANDBOX_SERVICE_URL: &str = "https://www.sandbox.paypal.com/cgi-bin/webscr";

/// Query appended to the service URL for IPN verification.
pub const NOTIFY_VALIDATE_QUERY: &str = "cmd=_notify-validate";

/// Which PayPal deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Live payments.
    #[default]
    Production,
    /// PayPal sandbox.
    Sandbox,
}

impl Environment {
    /// Returns the service URL for this environment.
    #[must_use]
    pub const fn service_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_SERVICE_URL,
            Self::Sandbox => SANDBOX_SERVICE_URL,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationConfig {
    /// Target deployment.
    #[serde(default)]
    pub environment: Environment,

    /// Explicit service URL, overriding `environment`.
    #[serde(default)]
    pub service_url: Option<String>,

    /// Merchant account (email or merchant id) that receives payments.
    #[serde(default)]
    pub account: String,

    /// Build notation sent as `bn`; truncated to 32 characters.
    #[serde(default)]
    pub application_id: Option<String>,

    /// Encrypted button credentials.
    #[serde(default)]
    pub credentials: CredentialConfig,

    /// IPN postback client settings.
    #[serde(default)]
    pub postback: PostbackConfig,
}

impl IntegrationConfig {
    /// Parses and validates configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidConfig`] if parsing or validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use paypal_standard::config::{IntegrationConfig, SANDBOX_SERVICE_URL};
    ///
    /// let config = IntegrationConfig::from_toml(r#"
    ///     environment = "sandbox"
    ///     account = "seller@example.com"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.service_url(), SANDBOX_SERVICE_URL);
    /// assert_eq!(config.credentials.pubcert_file, "paypal-pubcert.pem");
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| IntegrationError::InvalidConfig(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file.
    ///
    /// Relative credential directories are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IntegrationError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.credentials.cert_dir.is_relative()
            && let Some(parent) = path.parent()
        {
            config.credentials.cert_dir = parent.join(&config.credentials.cert_dir);
        }
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidConfig`] if the service URL is not HTTPS,
    /// a credential file name escapes the credential directory, or postback
    /// timeouts are out of range.
    pub fn validate(&self) -> Result<()> {
        if let Some(service_url) = &self.service_url {
            let url = Url::parse(service_url).map_err(|e| {
                IntegrationError::InvalidConfig(format!("invalid service_url '{service_url}': {e}"))
            })?;
            if url.scheme() != "https" {
                return Err(IntegrationError::InvalidConfig(format!(
                    "service_url must use HTTPS, got: {}",
                    url.scheme()
                )));
            }
        }

        self.credentials.validate()?;
        self.postback.validate()
    }

    /// Returns the service URL buttons post to.
    #[must_use]
    pub fn service_url(&self) -> &str {
        self.service_url.as_deref().unwrap_or_else(|| self.environment.service_url())
    }

    /// Returns the IPN verification URL.
    #[must_use]
    pub fn verification_url(&self) -> String {
        verification_url(self.service_url())
    }
}

/// Appends the notify-validate command to a service URL.
#[must_use]
pub fn verification_url(service_url: &str) -> String {
    let separator = if service_url.contains('?') { '&' } else { '?' };
    format!("{service_url}{separator}{NOTIFY_VALIDATE_QUERY}")
}

/// Location of the certificates used for encrypted buttons.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialConfig {
    /// Directory holding the three PEM files.
    #[serde(default = "default_cert_dir")]
    pub cert_dir: PathBuf,

    /// Merchant public certificate, as uploaded to PayPal.
    #[serde(default = "default_pubcert_file")]
    pub pubcert_file: String,

    /// Merchant private key.
    #[serde(default = "default_prvkey_file")]
    pub prvkey_file: String,

    /// PayPal's public certificate.
    #[serde(default = "default_paypal_cert_file")]
    pub paypal_cert_file: String,

    /// Certificate id PayPal assigned to the uploaded merchant certificate.
    #[serde(default)]
    pub cert_id: Option<String>,

    /// Private key passphrase; empty for unencrypted keys.
    #[serde(default)]
    pub prvkey_passphrase: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            cert_dir: default_cert_dir(),
            pubcert_file: default_pubcert_file(),
            prvkey_file: default_prvkey_file(),
            paypal_cert_file: default_paypal_cert_file(),
            cert_id: None,
            prvkey_passphrase: String::new(),
        }
    }
}

impl CredentialConfig {
    /// Creates a configuration for `cert_dir` with default file names.
    #[must_use]
    pub fn in_dir<P: Into<PathBuf>>(cert_dir: P) -> Self {
        Self { cert_dir: cert_dir.into(), ..Self::default() }
    }

    /// Path of the merchant public certificate.
    #[must_use]
    pub fn pubcert_path(&self) -> PathBuf {
        self.cert_dir.join(&self.pubcert_file)
    }

    /// Path of the merchant private key.
    #[must_use]
    pub fn prvkey_path(&self) -> PathBuf {
        self.cert_dir.join(&self.prvkey_file)
    }

    /// Path of PayPal's public certificate.
    #[must_use]
    pub fn paypal_cert_path(&self) -> PathBuf {
        self.cert_dir.join(&self.paypal_cert_file)
    }

    /// Validates file names.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidConfig`] if a file name is empty or
    /// contains a path separator or traversal sequence.
    pub fn validate(&self) -> Result<()> {
        let files = [
            ("pubcert_file", &self.pubcert_file),
            ("prvkey_file", &self.prvkey_file),
            ("paypal_cert_file", &self.paypal_cert_file),
        ];
        for (name, file) in files {
            if file.is_empty() || file.contains('/') || file.contains('\\') || file.contains("..") {
                return Err(IntegrationError::InvalidConfig(format!(
                    "{name} must be a plain file name, got '{file}'"
                )));
            }
        }
        Ok(())
    }
}

/// IPN postback client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PostbackConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// `User-Agent` header sent with the postback.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PostbackConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl PostbackConfig {
    /// Validates timeouts are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidConfig`] if:
    /// - `timeout_secs` is not 1-300
    /// - `connect_timeout_secs` is not 1-60
    /// - `user_agent` is empty or contains control characters
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(IntegrationError::InvalidConfig(
                "timeout_secs must be between 1 and 300".to_owned(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(IntegrationError::InvalidConfig(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        if self.user_agent.trim().is_empty() || self.user_agent.chars().any(char::is_control) {
            return Err(IntegrationError::InvalidConfig(
                "user_agent must be non-empty printable text".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_cert_dir() -> PathBuf {
    PathBuf::from("config/paypal")
}

fn default_pubcert_file() -> String {
    "paypal-pubcert.pem".to_owned()
}

fn default_prvkey_file() -> String {
    "paypal-prvkey.pem".to_owned()
}

fn default_paypal_cert_file() -> String {
    "paypal-cert.pem".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("paypal-standard/{}", env!("CARGO_PKG_VERSION"))
}
