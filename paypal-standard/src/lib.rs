//! PayPal Website Payments Standard integration.
//!
//! A merchant-side library for the three halves of a PayPal Standard checkout:
//!
//! - **Payment forms**: translate an order into the hidden fields of a PayPal
//!   button, through a table mapping logical field names to PayPal's names
//! - **Encrypted buttons**: sign the fields with the merchant key and encrypt
//!   them for PayPal's certificate so the browser cannot tamper with them
//! - **Notifications**: parse recurring-payment sign-up notifications and
//!   confirm them with PayPal before trusting them
//!
//! # Architecture
//!
//! ```text
//!  order ──▶ PaymentForm ──▶ FieldSet ──┬──────────────▶ plain <form> fields
//!               ▲                       └─▶ EnvelopeBuilder ──▶ cmd=_s_xclick + encrypted
//!          MappingTable
//!
//!  IPN body ──▶ RecurringNotification ──▶ NotificationVerifier ──postback──▶ PayPal
//!                                                │
//!                                          VERIFIED / INVALID
//! ```
//!
//! # Quick Start
//!
//! ## 1. Build a payment form
//!
//! ```
//! use paypal_standard::{form::PaymentForm, mapping::MappingTable};
//!
//! let form = PaymentForm::new(
//!     MappingTable::paypal(),
//!     "#1000",
//!     "seller@example.com",
//!     &[("amount", "50.00"), ("currency", "CAD")],
//! );
//!
//! let fields = form.form_fields();
//! assert_eq!(fields.get("invoice"), None);
//! assert_eq!(fields.get("item_number"), Some("#1000"));
//! assert_eq!(fields.get("amount"), Some("50.00"));
//! assert_eq!(fields.get("currency_code"), Some("CAD"));
//! assert_eq!(fields.get("cmd"), Some("_cart"));
//! ```
//!
//! ## 2. Verify a notification
//!
//! ```rust,no_run
//! use paypal_standard::{
//!     config::IntegrationConfig,
//!     notification::{NotificationVerifier, RecurringNotification},
//! };
//!
//! # async fn example(body: Vec<u8>) -> paypal_standard::Result<()> {
//! let config = IntegrationConfig::from_file("paypal.toml")?;
//! let verifier = NotificationVerifier::from_config(&config)?;
//!
//! let notification = RecurringNotification::parse(body)?;
//! if verifier.acknowledge(&notification).await? {
//!     println!("amount: {:?}", notification.amount()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`](error::Result). An unmapped
//! optional field or an absent notification field is never an error.
//!
//! ```rust,no_run
//! use paypal_standard::{IntegrationError, notification::RecurringNotification};
//!
//! match RecurringNotification::parse("txn_type=web_accept") {
//!     Ok(n) => println!("sign-up {:?}", n.subscription_id()),
//!     Err(IntegrationError::MalformedNotification(msg)) => eprintln!("not ours: {msg}"),
//!     Err(e) => eprintln!("error: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and openssl"
)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod mapping;
pub mod notification;
pub mod transport;

pub use error::{IntegrationError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_result_carries_integration_error() {
        let result: Result<()> = mapping::MappingTable::paypal().resolve("no_such_field").map(drop);
        assert!(matches!(result, Err(IntegrationError::ConfigurationError(_))));
    }
}
