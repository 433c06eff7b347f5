//! Recurring payment (subscription sign-up) notifications.

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{instrument, warn};

use crate::error::{IntegrationError, Result};

/// `txn_type` of a subscription sign-up.
pub const SUBSCRIPTION_SIGNUP: &str = "subscr_signup";

/// Format of `subscr_date` without its trailing zone abbreviation.
const PAYPAL_DATE_FORMAT: &str = "%H:%M:%S %b %d, %Y";

/// A parsed IPN message for a recurring subscription sign-up.
///
/// Holds the decoded fields and the raw body exactly as received; the raw
/// body is what must be echoed back for verification.
///
/// # Examples
///
/// ```
/// use paypal_standard::notification::RecurringNotification;
///
/// # fn example() -> paypal_standard::Result<()> {
/// let notification = RecurringNotification::parse(
///     "txn_type=subscr_signup&recurring=1&subscr_id=I-4X2&mc_amount3=9.99&mc_currency=USD",
/// )?;
///
/// assert_eq!(notification.subscription_id(), Some("I-4X2"));
/// assert_eq!(notification.gross(), Some("9.99"));
/// assert_eq!(notification.fee(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RecurringNotification {
    params: HashMap<String, String>,
    raw: Vec<u8>,
}

impl RecurringNotification {
    /// Parses a form-encoded IPN body.
    ///
    /// Repeated keys keep their last value.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::MalformedNotification`] unless `txn_type` is
    /// `subscr_signup` and `recurring` is `1`.
    #[instrument(skip_all, fields(body_len = tracing::field::Empty))]
    pub fn parse(raw: impl Into<Vec<u8>>) -> Result<Self> {
        let raw = raw.into();
        tracing::Span::current().record("body_len", raw.len());

        let params: HashMap<String, String> = url::form_urlencoded::parse(&raw)
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let notification = Self { params, raw };

        if notification.get("recurring") != Some("1") {
            warn!("rejecting notification without recurring marker");
            return Err(IntegrationError::MalformedNotification(
                "not a recurring payment: recurring marker absent".to_owned(),
            ));
        }
        if notification.transaction_type() != Some(SUBSCRIPTION_SIGNUP) {
            warn!(txn_type = ?notification.transaction_type(), "rejecting unexpected transaction type");
            return Err(IntegrationError::MalformedNotification(format!(
                "not a recurring payment: txn_type is {:?}, expected {SUBSCRIPTION_SIGNUP}",
                notification.transaction_type()
            )));
        }

        Ok(notification)
    }

    /// Returns a raw field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns all decoded fields.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns the body exactly as received.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Payer status: `verified` or `unverified`.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get("payer_status")
    }

    /// True when the payer's account is verified.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status() == Some("verified")
    }

    /// True when the subscription starts with a trial period.
    #[must_use]
    pub fn is_trial(&self) -> bool {
        self.get("period1").is_some() || self.get("period2").is_some()
    }

    /// PayPal subscription id.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.get("subscr_id")
    }

    /// Alias of [`transaction_id`](Self::transaction_id).
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        self.transaction_id()
    }

    /// The `txn_type` tag.
    #[must_use]
    pub fn transaction_type(&self) -> Option<&str> {
        self.get("txn_type")
    }

    /// Amount of the first billing tier present: trial, second trial, then regular.
    #[must_use]
    pub fn gross(&self) -> Option<&str> {
        self.get("mc_amount1").or_else(|| self.get("mc_amount2")).or_else(|| self.get("mc_amount3"))
    }

    /// [`gross`](Self::gross) as a decimal.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::MalformedNotification`] if the amount is not a number.
    pub fn amount(&self) -> Result<Option<Decimal>> {
        self.gross()
            .map(|gross| {
                Decimal::from_str(gross).map_err(|e| {
                    IntegrationError::MalformedNotification(format!("invalid amount '{gross}': {e}"))
                })
            })
            .transpose()
    }

    /// PayPal's fee.
    #[must_use]
    pub fn fee(&self) -> Option<&str> {
        self.get("mc_fee")
    }

    /// Currency code.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.get("mc_currency")
    }

    /// The item number submitted with the button, falling back to `custom`.
    ///
    /// PayPal omits `item_number` from some notifications, and the form maps
    /// the order id to both fields.
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        self.get("item_number").or_else(|| self.get("custom"))
    }

    /// Invoice submitted with the button.
    #[must_use]
    pub fn invoice(&self) -> Option<&str> {
        self.get("invoice")
    }

    /// True for sandbox notifications.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.get("test_ipn") == Some("1")
    }

    /// Receiving account: `business`, then `receiver_email`.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        self.get("business").or_else(|| self.get("receiver_email"))
    }

    /// When the buyer subscribed.
    ///
    /// Notifications can arrive long after the fact when PayPal retries, so
    /// this is the only reliable sign-up time.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::MalformedNotification`] if `subscr_date` is present
    /// but not in PayPal's `HH:MM:SS Mon DD, YYYY PST` format.
    pub fn subscribed_at(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.get("subscr_date").map(parse_paypal_date).transpose()
    }
}

/// Parses PayPal's IPN date format, e.g. `20:12:59 Jan 13, 2009 PST`.
///
/// # Errors
///
/// Returns [`IntegrationError::MalformedNotification`] for any other format or zone.
pub fn parse_paypal_date(value: &str) -> Result<DateTime<FixedOffset>> {
    let malformed =
        || IntegrationError::MalformedNotification(format!("invalid subscr_date '{value}'"));

    let (local, zone) = value.trim().rsplit_once(' ').ok_or_else(malformed)?;
    let offset_hours = match zone {
        "PST" => -8,
        "PDT" => -7,
        "UTC" | "GMT" => 0,
        _ => return Err(malformed()),
    };
    let offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(malformed)?;
    let naive = NaiveDateTime::parse_from_str(local, PAYPAL_DATE_FORMAT).map_err(|_| malformed())?;
    naive.and_local_timezone(offset).single().ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    const SIGNUP: &str = "txn_type=subscr_signup&subscr_id=I-ABC123&last_name=Fauser\
        &residence_country=CA&mc_currency=CAD&item_name=Gold+Plan&business=seller%40example.com\
        &recurring=1&payer_status=verified&first_name=Cody&receiver_email=payments%40example.com\
        &item_number=1000&period3=1+M&mc_amount3=9.99&subscr_date=20%3A12%3A59+Jan+13%2C+2009+PST\
        &test_ipn=1&invoice=%231000";

    #[test]
    fn test_parse_signup() {
        let notification = RecurringNotification::parse(SIGNUP).unwrap();
        assert_eq!(notification.transaction_type(), Some("subscr_signup"));
        assert_eq!(notification.subscription_id(), Some("I-ABC123"));
        assert_eq!(notification.currency(), Some("CAD"));
        assert_eq!(notification.gross(), Some("9.99"));
        assert_eq!(notification.amount().unwrap(), Some(Decimal::new(999, 2)));
        assert_eq!(notification.item_id(), Some("1000"));
        assert_eq!(notification.invoice(), Some("#1000"));
        assert_eq!(notification.get("item_name"), Some("Gold Plan"));
        assert!(notification.is_complete());
        assert!(notification.is_test());
        assert!(!notification.is_trial());
    }

    #[test]
    fn test_raw_body_preserved() {
        let notification = RecurringNotification::parse(SIGNUP).unwrap();
        assert_eq!(notification.raw(), SIGNUP.as_bytes());
    }

    #[test]
    fn test_missing_recurring_marker_rejected() {
        let err = RecurringNotification::parse("txn_type=subscr_signup&subscr_id=I-1").unwrap_err();
        assert!(matches!(err, IntegrationError::MalformedNotification(_)));
    }

    #[test]
    fn test_recurring_marker_must_be_one() {
        let err = RecurringNotification::parse("txn_type=subscr_signup&recurring=0").unwrap_err();
        assert!(matches!(err, IntegrationError::MalformedNotification(_)));
    }

    #[test]
    fn test_wrong_transaction_type_rejected() {
        for body in ["txn_type=subscr_payment&recurring=1", "recurring=1", "txn_type=cart&recurring=1"] {
            let err = RecurringNotification::parse(body).unwrap_err();
            assert!(matches!(err, IntegrationError::MalformedNotification(_)), "{body}");
        }
    }

    #[test]
    fn test_minimal_signup_accepted() {
        let notification = RecurringNotification::parse("txn_type=subscr_signup&recurring=1").unwrap();
        assert_eq!(notification.gross(), None);
        assert_eq!(notification.amount().unwrap(), None);
        assert_eq!(notification.account(), None);
        assert_eq!(notification.subscribed_at().unwrap(), None);
        assert!(!notification.is_complete());
        assert!(!notification.is_test());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let notification = RecurringNotification::parse(
            "txn_type=cart&txn_type=subscr_signup&recurring=1&invoice=A&invoice=B",
        )
        .unwrap();
        assert_eq!(notification.invoice(), Some("B"));
    }

    #[test]
    fn test_gross_fallback_chain() {
        let base = "txn_type=subscr_signup&recurring=1";
        let tier2 = RecurringNotification::parse(format!("{base}&mc_amount3=30&mc_amount2=20")).unwrap();
        assert_eq!(tier2.gross(), Some("20"));

        let tier1 = RecurringNotification::parse(format!("{base}&mc_amount3=30&mc_amount1=0.00&period1=7+D"))
            .unwrap();
        assert_eq!(tier1.gross(), Some("0.00"));
        assert!(tier1.is_trial());
    }

    #[test]
    fn test_account_fallback() {
        let body = "txn_type=subscr_signup&recurring=1&receiver_email=payments%40example.com";
        let notification = RecurringNotification::parse(body).unwrap();
        assert_eq!(notification.account(), Some("payments@example.com"));

        let notification = RecurringNotification::parse(SIGNUP).unwrap();
        assert_eq!(notification.account(), Some("seller@example.com"));
    }

    #[test]
    fn test_item_id_falls_back_to_custom() {
        let body = "txn_type=subscr_signup&recurring=1&custom=order-77";
        let notification = RecurringNotification::parse(body).unwrap();
        assert_eq!(notification.item_id(), Some("order-77"));
    }

    #[test]
    fn test_invalid_amount() {
        let body = "txn_type=subscr_signup&recurring=1&mc_amount3=free";
        let notification = RecurringNotification::parse(body).unwrap();
        assert!(notification.amount().is_err());
    }

    #[test]
    fn test_subscribed_at() {
        let notification = RecurringNotification::parse(SIGNUP).unwrap();
        let subscribed = notification.subscribed_at().unwrap().unwrap();
        assert_eq!(subscribed.year(), 2009);
        assert_eq!(subscribed.month(), 1);
        assert_eq!(subscribed.day(), 13);
        assert_eq!(subscribed.hour(), 20);
        assert_eq!(subscribed.offset().local_minus_utc(), -8 * 3600);
    }

    #[test]
    fn test_parse_paypal_date_daylight_time() {
        let parsed = parse_paypal_date("08:30:00 Jul 04, 2021 PDT").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_parse_paypal_date_rejects_garbage() {
        assert!(parse_paypal_date("yesterday").is_err());
        assert!(parse_paypal_date("08:30:00 Jul 04, 2021 CET").is_err());
        assert!(parse_paypal_date("2021-07-04 PST").is_err());
    }
}
