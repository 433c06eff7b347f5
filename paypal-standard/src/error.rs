//! Error types for the PayPal Website Payments Standard integration.
//!
//! All errors implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Programmer errors** ([`IntegrationError::ConfigurationError`]): a logical field was
//!   requested that the mapping table does not define
//! - **Credential errors** ([`IntegrationError::CredentialError`]): certificate or key
//!   material could not be read or parsed; raised before anything leaves the process
//! - **Inbound errors** ([`IntegrationError::MalformedNotification`]): a notification
//!   that is not the subtype this parser handles
//! - **Protocol errors** ([`IntegrationError::ProtocolViolation`]): the verification
//!   postback answered with something other than `VERIFIED` or `INVALID`
//!
//! # Examples
//!
//! ```
//! use paypal_standard::error::{IntegrationError, Result};
//!
//! fn require_https(url: &str) -> Result<&str> {
//!     if !url.starts_with("https://") {
//!         return Err(IntegrationError::InvalidConfig("service_url must use HTTPS".to_owned()));
//!     }
//!     Ok(url)
//! }
//!
//! assert!(require_https("http://www.paypal.com").is_err());
//! ```

use thiserror::Error;

/// Result type alias for integration operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, IntegrationError>;

/// Errors that can occur while building payment forms or handling notifications.
///
/// Absence is never an error: an unmapped optional field is dropped and a missing
/// notification field reads as `None`. Every variant here is fatal for the
/// operation that raised it.
///
/// # Error Recovery
///
/// - [`ConfigurationError`](Self::ConfigurationError): fix the calling code or the mapping table
/// - [`CredentialError`](Self::CredentialError): check the credential directory and file names
/// - [`MalformedNotification`](Self::MalformedNotification): route the message to another handler
/// - [`ProtocolViolation`](Self::ProtocolViolation): do not trust the notification; investigate
///   processor API drift or connectivity, then let the processor redeliver
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// A logical field was requested through a mapping-table entry that does not exist.
    ///
    /// Distinct from an unmapped optional field, which is silently dropped.
    #[error("mapping table has no entry for {0}")]
    ConfigurationError(String),

    /// Certificate or private key material is missing, unreadable or malformed.
    ///
    /// Raised while building an envelope, before any field set is released.
    #[error("credential error: {0}")]
    CredentialError(String),

    /// The notification is not the subtype this parser accepts.
    ///
    /// Raised at parse time when the transaction type tag does not match or
    /// the recurring marker is absent.
    #[error("malformed notification: {0}")]
    MalformedNotification(String),

    /// The verification postback returned neither confirmation nor invalidation.
    ///
    /// Covers unexpected response text, empty bodies and transport failures.
    /// Never treat this as a rejection.
    #[error("verification protocol violation: {0}")]
    ProtocolViolation(String),

    /// Configuration file could not be parsed or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction or request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = IntegrationError::ConfigurationError("logical field `colour`".into());
        assert_eq!(error.to_string(), "mapping table has no entry for logical field `colour`");
    }

    #[test]
    fn test_protocol_violation_is_not_rejection() {
        let error = IntegrationError::ProtocolViolation("unexpected response \"ERROR\"".into());
        assert!(error.to_string().starts_with("verification protocol violation"));
        assert!(!matches!(error, IntegrationError::MalformedNotification(_)));
    }

    #[test]
    fn test_credential_error_display() {
        let error = IntegrationError::CredentialError("cannot read paypal-cert.pem".to_owned());
        assert_eq!(error.to_string(), "credential error: cannot read paypal-cert.pem");
    }

    #[test]
    fn test_malformed_notification_display() {
        let error = IntegrationError::MalformedNotification("not a recurring payment".to_owned());
        assert!(error.to_string().contains("malformed notification"));
    }
}
