//! Instant Payment Notifications (IPN).
//!
//! PayPal posts a form-encoded message to the merchant's notify URL after a
//! payment event. [`RecurringNotification`] decodes subscription sign-ups and
//! [`NotificationVerifier`] confirms with PayPal that the message is genuine
//! before any of its fields are trusted.

mod recurring;
mod verifier;

pub use recurring::{RecurringNotification, SUBSCRIPTION_SIGNUP, parse_paypal_date};
pub use verifier::{INVALID, NotificationVerifier, VERIFIED, VerificationState, classify_response};
