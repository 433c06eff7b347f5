//! Postback transport abstraction.
//!
//! Notification verification echoes the received body back to PayPal. The
//! [`PostbackTransport`] trait separates that HTTP exchange from the
//! verification logic so the verifier can run against any client.
//!
//! # Examples
//!
//! ```rust,no_run
//! use paypal_standard::transport::{HttpPostbackTransport, PostbackRequest, PostbackTransport};
//!
//! # async fn example() -> paypal_standard::Result<()> {
//! let transport = HttpPostbackTransport::new()?;
//!
//! let request = PostbackRequest {
//!     url: "https://www.paypal.com/cgi-bin/webscr?cmd=_notify-validate",
//!     body: b"txn_type=subscr_signup&recurring=1",
//!     headers: vec![("User-Agent", "shop/1.0")],
//! };
//!
//! let response = transport.post(request).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::error::Result;

pub mod http;

pub use http::HttpPostbackTransport;

/// A verification postback ready to send.
#[derive(Debug, Clone)]
pub struct PostbackRequest<'a> {
    /// Full verification URL, including the validate command.
    pub url: &'a str,
    /// Body bytes, sent unchanged.
    pub body: &'a [u8],
    /// Additional HTTP headers.
    pub headers: Vec<(&'a str, &'a str)>,
}

/// Response to a verification postback.
#[derive(Debug)]
pub struct PostbackResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl PostbackResponse {
    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends verification postbacks.
///
/// Implementations report network failures as errors; they never interpret
/// the response body.
pub trait PostbackTransport: Send + Sync {
    /// POSTs `request.body` to `request.url`.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the response cannot be read.
    fn post<'a>(
        &'a self,
        request: PostbackRequest<'a>,
    ) -> impl Future<Output = Result<PostbackResponse>> + Send + 'a;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postback_request_debug() {
        let request = PostbackRequest {
            url: "https://www.sandbox.paypal.com/cgi-bin/webscr?cmd=_notify-validate",
            body: b"recurring=1",
            headers: vec![],
        };

        let debug_str = format!("{request:?}");
        assert!(debug_str.contains("PostbackRequest"));
        assert!(debug_str.contains("_notify-validate"));
    }

    #[test]
    fn test_postback_response_success_range() {
        let ok = PostbackResponse { status: 200, body: b"VERIFIED".to_vec() };
        assert!(ok.is_success());

        let redirect = PostbackResponse { status: 302, body: vec![] };
        assert!(!redirect.is_success());

        let error = PostbackResponse { status: 503, body: b"Service Unavailable".to_vec() };
        assert!(!error.is_success());
    }
}
