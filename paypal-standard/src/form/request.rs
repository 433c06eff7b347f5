//! Declarative checkout description.
//!
//! A [`CheckoutRequest`] is what a storefront knows about an order, in a shape
//! that can be loaded from TOML or JSON and replayed onto a [`PaymentForm`].

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::Result,
    form::{Address, LineItem, PaymentForm},
    mapping::MappingTable,
};

/// Buyer details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Customer {
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Billing period unit for subscription terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PeriodUnit {
    /// Days.
    #[serde(rename = "D", alias = "day")]
    Day,
    /// Weeks.
    #[serde(rename = "W", alias = "week")]
    Week,
    /// Months.
    #[serde(rename = "M", alias = "month")]
    Month,
    /// Years.
    #[serde(rename = "Y", alias = "year")]
    Year,
}

impl PeriodUnit {
    /// Returns PayPal's one-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Day => "D",
            Self::Week => "W",
            Self::Month => "M",
            Self::Year => "Y",
        }
    }
}

/// One billing term: `amount` charged every `period` `unit`s.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Term {
    /// Charge per period.
    pub amount: Decimal,
    /// Number of units in the period.
    pub period: u32,
    /// Period unit.
    pub unit: PeriodUnit,
}

/// Subscription button terms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscription {
    /// First trial period (`a1`, `p1`, `t1`).
    #[serde(default)]
    pub trial: Option<Term>,
    /// Second trial period (`a2`, `p2`, `t2`).
    #[serde(default)]
    pub second_trial: Option<Term>,
    /// Regular billing (`a3`, `p3`, `t3`).
    pub regular: Term,
    /// Recur until cancelled (`src`).
    #[serde(default = "default_true")]
    pub recurring: bool,
    /// Reattempt failed payments (`sra`).
    #[serde(default)]
    pub reattempt: bool,
}

fn default_true() -> bool {
    true
}

/// Everything needed to build a payment form for one order.
///
/// # Examples
///
/// ```
/// use paypal_standard::{form::CheckoutRequest, mapping::MappingTable};
///
/// let request: CheckoutRequest = toml::from_str(r##"
///     order = "1000"
///     amount = "50.00"
///     currency = "CAD"
///     invoice = "#1000"
/// "##).unwrap();
///
/// let form = request.to_form(MappingTable::paypal(), "seller@example.com", None).unwrap();
/// assert_eq!(form.form_fields().get("amount"), Some("50.00"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    /// Merchant order identifier.
    pub order: String,
    /// Order total.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Invoice number; PayPal rejects duplicates per account.
    #[serde(default)]
    pub invoice: Option<String>,
    /// Single-item description.
    #[serde(default)]
    pub item_name: Option<String>,
    /// IPN listener URL.
    #[serde(default)]
    pub notify_url: Option<String>,
    /// Where to send the buyer after payment.
    #[serde(default)]
    pub return_url: Option<String>,
    /// Where to send the buyer on cancel.
    #[serde(default)]
    pub cancel_return_url: Option<String>,
    /// Checkout page header image.
    #[serde(default)]
    pub cpp_header_image: Option<String>,
    /// Cart-wide tax.
    #[serde(default)]
    pub tax: Option<Decimal>,
    /// Cart-wide shipping.
    #[serde(default)]
    pub shipping: Option<Decimal>,
    /// Buyer details.
    #[serde(default)]
    pub customer: Option<Customer>,
    /// Shipping address.
    #[serde(default)]
    pub shipping_address: Option<Address>,
    /// Cart lines.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Subscription terms; switches the button to a subscription.
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

impl CheckoutRequest {
    /// Builds a payment form for this request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IntegrationError::ConfigurationError`] if `table` lacks an
    /// entry this request needs.
    pub fn to_form<'t>(
        &self,
        table: &'t MappingTable,
        account: &str,
        application_id: Option<&str>,
    ) -> Result<PaymentForm<'t>> {
        let amount = self.amount.map(|amount| amount.to_string());
        let mut options: Vec<(&str, &str)> = Vec::new();
        if let Some(amount) = &amount {
            options.push(("amount", amount.as_str()));
        }
        if let Some(currency) = &self.currency {
            options.push(("currency", currency.as_str()));
        }
        if let Some(id) = application_id {
            options.push(("application_id", id));
        }

        let mut form = PaymentForm::new(table, &self.order, account, &options);
        self.apply(&mut form)?;
        Ok(form)
    }

    /// Replays the remaining request fields onto an existing form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IntegrationError::ConfigurationError`] if the form's table
    /// lacks an entry this request needs.
    pub fn apply(&self, form: &mut PaymentForm<'_>) -> Result<()> {
        let scalars = [
            ("invoice", self.invoice.clone()),
            ("item_name", self.item_name.clone()),
            ("notify_url", self.notify_url.clone()),
            ("return_url", self.return_url.clone()),
            ("cancel_return_url", self.cancel_return_url.clone()),
            ("cpp_header_image", self.cpp_header_image.clone()),
            ("tax", self.tax.map(|tax| tax.to_string())),
            ("shipping", self.shipping.map(|shipping| shipping.to_string())),
        ];
        for (logical, value) in scalars {
            if let Some(value) = value {
                form.set(logical, &value)?;
            }
        }

        if let Some(customer) = &self.customer {
            let mut params = Vec::new();
            for (key, value) in [
                ("first_name", &customer.first_name),
                ("last_name", &customer.last_name),
                ("email", &customer.email),
            ] {
                if let Some(value) = value {
                    params.push((key, value.as_str()));
                }
            }
            form.customer(&params)?;
        }

        if let Some(address) = &self.shipping_address {
            form.shipping_address(address)?;
        }

        form.line_items(&self.line_items);

        if let Some(subscription) = &self.subscription {
            apply_subscription(form, subscription)?;
        }
        Ok(())
    }
}

fn apply_subscription(form: &mut PaymentForm<'_>, subscription: &Subscription) -> Result<()> {
    form.set("cmd", "_xclick-subscriptions")?;

    let terms = [(1, &subscription.trial), (2, &subscription.second_trial)];
    for (index, term) in terms {
        if let Some(term) = term {
            set_term(form, index, term)?;
        }
    }
    set_term(form, 3, &subscription.regular)?;

    if subscription.recurring {
        form.set("src", "1")?;
    }
    if subscription.reattempt {
        form.set("sra", "1")?;
    }
    Ok(())
}

fn set_term(form: &mut PaymentForm<'_>, index: u8, term: &Term) -> Result<()> {
    form.set(&format!("a{index}"), &term.amount.to_string())?;
    form.set(&format!("p{index}"), &term.period.to_string())?;
    form.set(&format!("t{index}"), term.unit.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntegrationError;

    #[test]
    fn test_full_request_from_toml() {
        let request: CheckoutRequest = toml::from_str(
            r##"
            order = "1000"
            amount = "50.00"
            currency = "CAD"
            invoice = "#1000"
            tax = "0.00"
            notify_url = "https://shop.example.com/notify"

            [customer]
            first_name = "Cody"
            email = "cody@example.com"

            [shipping_address]
            city = "Ottawa"
            state = "ON"
            country = "CA"
            phone = "(613)555-1234"

            [[line_items]]
            name = "Snowshoes"
            price = "25.00"
            quantity = 2
            "##,
        )
        .unwrap();

        let form = request.to_form(MappingTable::paypal(), "seller@example.com", None).unwrap();
        let fields = form.form_fields();
        assert_eq!(fields.get("invoice"), Some("#1000"));
        assert_eq!(fields.get("amount"), Some("50.00"));
        assert_eq!(fields.get("currency_code"), Some("CAD"));
        assert_eq!(fields.get("notify_url"), Some("https://shop.example.com/notify"));
        assert_eq!(fields.get("tax"), Some("0.00"));
        assert_eq!(fields.get("first_name"), Some("Cody"));
        assert_eq!(fields.get("state"), Some("Ontario"));
        assert_eq!(fields.get("item_name_1"), Some("Snowshoes"));
        assert_eq!(fields.get("quantity_1"), Some("2"));
    }

    #[test]
    fn test_subscription_terms() {
        let request: CheckoutRequest = toml::from_str(
            r#"
            order = "sub-1"
            currency = "USD"

            [subscription]
            reattempt = true

            [subscription.trial]
            amount = "0.00"
            period = 7
            unit = "D"

            [subscription.regular]
            amount = "9.99"
            period = 1
            unit = "month"
            "#,
        )
        .unwrap();

        let form = request.to_form(MappingTable::paypal(), "seller@example.com", None).unwrap();
        let fields = form.form_fields();
        assert_eq!(fields.get("cmd"), Some("_xclick-subscriptions"));
        assert_eq!(fields.get("a1"), Some("0.00"));
        assert_eq!(fields.get("p1"), Some("7"));
        assert_eq!(fields.get("t1"), Some("D"));
        assert_eq!(fields.get("a3"), Some("9.99"));
        assert_eq!(fields.get("t3"), Some("M"));
        assert_eq!(fields.get("src"), Some("1"));
        assert_eq!(fields.get("sra"), Some("1"));
        assert!(!fields.contains("a2"));
    }

    #[test]
    fn test_table_without_invoice_fails() {
        let table = MappingTable::default();
        let request = CheckoutRequest {
            order: "1".into(),
            invoice: Some("#1".into()),
            ..CheckoutRequest::default()
        };
        let err = request.to_form(&table, "seller@example.com", None).unwrap_err();
        assert!(matches!(err, IntegrationError::ConfigurationError(_)));
    }

    #[test]
    fn test_application_id_becomes_bn() {
        let request = CheckoutRequest { order: "1".into(), ..CheckoutRequest::default() };
        let form = request
            .to_form(MappingTable::paypal(), "seller@example.com", Some("Shop_Cart_WPS"))
            .unwrap();
        assert_eq!(form.form_fields().get("bn"), Some("Shop_Cart_WPS"));
    }
}
