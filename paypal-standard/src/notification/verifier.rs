//! Notification authenticity check.
//!
//! A notification is trusted only after its exact body has been echoed back
//! to PayPal and PayPal answered `VERIFIED`:
//!
//! ```text
//! Unverified ──acknowledge──▶ Pending ──VERIFIED──▶ Verified
//!                                │
//!                                ├────INVALID─────▶ Rejected
//!                                └────anything────▶ error
//! ```

use tracing::{debug, instrument, warn};

use crate::{
    config::IntegrationConfig,
    error::{IntegrationError, Result},
    notification::RecurringNotification,
    transport::{HttpPostbackTransport, PostbackRequest, PostbackTransport},
};

/// Response body confirming the notification came from PayPal.
pub const VERIFIED: &str = "VERIFIED";

/// Response body denying the notification.
pub const INVALID: &str = "INVALID";

/// Verification state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    /// Not yet sent back.
    Unverified,
    /// Postback in flight.
    Pending,
    /// PayPal confirmed the notification.
    Verified,
    /// PayPal denied the notification.
    Rejected,
}

impl VerificationState {
    /// True once PayPal has answered.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

/// Maps a postback response body to a terminal state.
///
/// Matching is exact: no trimming and no case folding.
///
/// # Errors
///
/// Returns [`IntegrationError::ProtocolViolation`] for any body other than
/// `VERIFIED` or `INVALID`.
pub fn classify_response(body: &[u8]) -> Result<VerificationState> {
    match body {
        b if b == VERIFIED.as_bytes() => Ok(VerificationState::Verified),
        b if b == INVALID.as_bytes() => Ok(VerificationState::Rejected),
        other => Err(IntegrationError::ProtocolViolation(format!(
            "unexpected postback response: {:?}",
            String::from_utf8_lossy(&other[..other.len().min(64)])
        ))),
    }
}

/// Checks notifications against PayPal's validation endpoint.
///
/// # Examples
///
/// ```rust,no_run
/// use paypal_standard::{
///     config::IntegrationConfig,
///     notification::{NotificationVerifier, RecurringNotification},
/// };
///
/// # async fn example(body: Vec<u8>) -> paypal_standard::Result<()> {
/// let config = IntegrationConfig::from_file("paypal.toml")?;
/// let verifier = NotificationVerifier::from_config(&config)?;
///
/// let notification = RecurringNotification::parse(body)?;
/// if verifier.acknowledge(&notification).await? {
///     println!("subscription {:?} confirmed", notification.subscription_id());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NotificationVerifier<T = HttpPostbackTransport> {
    transport: T,
    verification_url: String,
    user_agent: String,
}

impl NotificationVerifier<HttpPostbackTransport> {
    /// Creates a verifier posting to the configured environment over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: &IntegrationConfig) -> Result<Self> {
        let transport = HttpPostbackTransport::with_config(&config.postback)?;
        Ok(Self::with_transport(
            transport,
            config.verification_url(),
            config.postback.user_agent.clone(),
        ))
    }
}

impl<T: PostbackTransport> NotificationVerifier<T> {
    /// Creates a verifier over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        transport: T,
        verification_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            verification_url: verification_url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Returns the URL postbacks are sent to.
    #[must_use]
    pub fn verification_url(&self) -> &str {
        &self.verification_url
    }

    /// Returns true if PayPal confirms the notification, false if it denies it.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ProtocolViolation`] if the postback fails or
    /// the response is neither confirmation nor denial. Such a notification
    /// must not be trusted.
    pub async fn acknowledge(&self, notification: &RecurringNotification) -> Result<bool> {
        Ok(self.verify_raw(notification.raw()).await? == VerificationState::Verified)
    }

    /// Echoes `raw` back and returns the terminal state.
    ///
    /// Works for any notification subtype since only the bytes are sent.
    ///
    /// # Errors
    ///
    /// See [`acknowledge`](Self::acknowledge).
    #[instrument(skip(self, raw), fields(body_len = raw.len(), url = %self.verification_url))]
    pub async fn verify_raw(&self, raw: &[u8]) -> Result<VerificationState> {
        let mut state = VerificationState::Unverified;
        debug!(?state, "sending verification postback");

        let content_length = raw.len().to_string();
        let request = PostbackRequest {
            url: &self.verification_url,
            body: raw,
            headers: vec![
                ("User-Agent", self.user_agent.as_str()),
                ("Content-Length", content_length.as_str()),
            ],
        };

        state = VerificationState::Pending;
        let response = self.transport.post(request).await.map_err(|e| match e {
            IntegrationError::ProtocolViolation(_) => e,
            other => IntegrationError::ProtocolViolation(format!("postback failed: {other}")),
        })?;
        debug!(?state, status = response.status, "postback answered");

        if !response.is_success() {
            return Err(IntegrationError::ProtocolViolation(format!(
                "postback returned status {}",
                response.status
            )));
        }

        state = classify_response(&response.body)?;
        if state == VerificationState::Rejected {
            warn!("notification rejected by PayPal");
        } else {
            debug!(?state, "notification verified");
        }
        Ok(state)
    }
}
