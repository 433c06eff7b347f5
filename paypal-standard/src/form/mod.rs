//! Outbound payment form construction.
//!
//! [`PaymentForm`] accumulates the hidden fields of a PayPal "third-party shopping
//! cart" button. Callers speak in logical names; the form resolves them through a
//! [`MappingTable`] and applies PayPal's address conventions.
//!
//! Two kinds of unknown names are handled differently:
//!
//! - [`PaymentForm::set`] takes a name the calling code declares it needs; an
//!   unmapped name is a [`IntegrationError::ConfigurationError`].
//! - [`PaymentForm::set_option`] and composite sub-keys take names that may be
//!   meaningful to other processors; an unmapped name is dropped.
//!
//! # Examples
//!
//! ```
//! use paypal_standard::{form::PaymentForm, mapping::MappingTable};
//!
//! # fn example() -> paypal_standard::Result<()> {
//! let mut form = PaymentForm::new(
//!     MappingTable::paypal(),
//!     "order-500",
//!     "seller@example.com",
//!     &[("amount", "50.00"), ("currency", "CAD")],
//! );
//! form.set("invoice", "#1000")?;
//!
//! let fields = form.form_fields();
//! assert_eq!(fields.get("currency_code"), Some("CAD"));
//! assert_eq!(fields.get("invoice"), Some("#1000"));
//! # Ok(())
//! # }
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{IntegrationError, Result},
    mapping::{FieldMapping, MappingTable, lookup_country_code},
};

mod address;
mod fields;
pub mod request;

pub use address::{
    Address, MISSING_STATE, PhoneFields, SPLIT_PHONE_COUNTRIES, normalize_phone, normalize_state,
};
pub use fields::FieldSet;
pub use request::CheckoutRequest;

/// Maximum length PayPal accepts for the `bn` build notation.
pub const MAX_APPLICATION_ID_LEN: usize = 32;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItem {
    /// Display name.
    pub name: String,
    /// Unit price, not the line total.
    pub price: Decimal,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Builder for the hidden fields of a PayPal payment button.
#[derive(Debug, Clone)]
pub struct PaymentForm<'t> {
    table: &'t MappingTable,
    fields: FieldSet,
}

impl<'t> PaymentForm<'t> {
    /// Starts a cart form for `order`, paid to `account`.
    ///
    /// `options` are `(logical, value)` pairs such as `amount`, `currency`,
    /// `notify_url` or `application_id`; names the table does not map are dropped.
    #[must_use]
    pub fn new(table: &'t MappingTable, order: &str, account: &str, options: &[(&str, &str)]) -> Self {
        let mut form = Self { table, fields: FieldSet::new() };

        form.set_option("order", order);
        form.set_option("account", account);

        let mut application_id = None;
        for (logical, value) in options {
            if *logical == "application_id" {
                application_id = Some(*value);
                continue;
            }
            form.set_option(logical, value);
        }

        form.add_field("cmd", "_cart");
        form.add_field("upload", "1");
        form.add_field("no_shipping", "1");
        form.add_field("no_note", "1");
        form.add_field("charset", "utf-8");
        form.add_field("address_override", "0");
        if let Some(id) = application_id {
            let truncated: String = id.chars().take(MAX_APPLICATION_ID_LEN).collect();
            form.add_field("bn", &truncated);
        }

        form
    }

    /// Writes a physical field; blank values are ignored.
    pub fn add_field(&mut self, name: &str, value: &str) {
        if name.trim().is_empty() || value.trim().is_empty() {
            return;
        }
        self.fields.insert(name, value);
    }

    /// Writes a logical field the caller requires the table to map.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ConfigurationError`] when the table has no entry for
    /// `logical`, or when the entry is composite and needs structured input.
    pub fn set(&mut self, logical: &str, value: &str) -> Result<()> {
        let mapping = *self.table.resolve(logical)?;
        self.write_scalar(logical, mapping, value)
    }

    /// Writes a logical field if the table maps it; otherwise does nothing.
    pub fn set_option(&mut self, logical: &str, value: &str) {
        let Some(mapping) = self.table.get(logical).copied() else {
            debug!(logical, "dropping unmapped option");
            return;
        };
        if self.write_scalar(logical, mapping, value).is_err() {
            debug!(logical, "dropping scalar value for composite option");
        }
    }

    /// Fans a composite logical field out into its physical fields.
    ///
    /// Sub-keys without a mapping are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ConfigurationError`] when `logical` is not a
    /// composite entry in the table.
    pub fn set_composite(&mut self, logical: &str, params: &[(&str, &str)]) -> Result<()> {
        let mapping = *self.table.resolve(logical)?;
        if !matches!(mapping, FieldMapping::Composite(_)) {
            return Err(IntegrationError::ConfigurationError(format!(
                "composite field `{logical}`"
            )));
        }

        for (key, value) in params {
            match mapping.sub_field(key) {
                Some(physical) => self.add_field(physical, value),
                None => debug!(logical, key, "dropping unmapped sub-field"),
            }
        }
        Ok(())
    }

    /// Sets customer details (`first_name`, `last_name`, `email`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ConfigurationError`] if the table lacks a
    /// `customer` composite.
    pub fn customer(&mut self, params: &[(&str, &str)]) -> Result<()> {
        self.set_composite("customer", params)
    }

    /// Sets the shipping address, applying PayPal's country, phone and state rules.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ConfigurationError`] if the table does not map
    /// `shipping_address.country` and `shipping_address.state`.
    pub fn shipping_address(&mut self, address: &Address) -> Result<()> {
        let country_field = self.table.require_sub_field("shipping_address", "country")?;
        let state_field = self.table.require_sub_field("shipping_address", "state")?;

        let country_code = address.country.as_deref().map(lookup_country_code);
        if let Some(code) = &country_code {
            self.add_field(country_field, code);
        }

        if let Some(phone) = &address.phone {
            match normalize_phone(phone, country_code.as_deref().unwrap_or_default()) {
                PhoneFields::Split { area, exchange, line } => {
                    self.add_field("night_phone_a", &area);
                    self.add_field("night_phone_b", &exchange);
                    self.add_field("night_phone_c", &line);
                }
                PhoneFields::Single(digits) => self.add_field("night_phone_b", &digits),
            }
        }

        if let Some(state) = normalize_state(address.state.as_deref(), country_code.as_deref()) {
            self.add_field(state_field, &state);
        }

        let rest = [
            ("city", &address.city),
            ("address1", &address.address1),
            ("address2", &address.address2),
            ("zip", &address.zip),
        ];
        self.write_address_lines("shipping_address", &rest);
        Ok(())
    }

    /// Sets the billing address when the table maps one; PayPal's does not.
    pub fn billing_address(&mut self, address: &Address) {
        let Some(mapping) = self.table.get("billing_address").copied() else {
            debug!("table has no billing address mapping");
            return;
        };

        if let (Some(field), Some(country)) = (mapping.sub_field("country"), &address.country) {
            self.add_field(field, &lookup_country_code(country));
        }
        let rest = [
            ("city", &address.city),
            ("address1", &address.address1),
            ("address2", &address.address2),
            ("state", &address.state),
            ("zip", &address.zip),
            ("phone", &address.phone),
        ];
        self.write_address_lines("billing_address", &rest);
    }

    /// Adds indexed cart lines (`item_name_1`, `amount_1`, `quantity_1`, ...).
    pub fn line_items(&mut self, items: &[LineItem]) {
        for (index, line) in items.iter().enumerate() {
            let n = index + 1;
            self.add_field(&format!("item_name_{n}"), &line.name);
            self.add_field(&format!("amount_{n}"), &line.price.to_string());
            self.add_field(&format!("quantity_{n}"), &line.quantity.to_string());
        }
    }

    /// Returns the accumulated fields.
    #[must_use]
    pub fn form_fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Consumes the form, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> FieldSet {
        self.fields
    }

    fn write_scalar(&mut self, logical: &str, mapping: FieldMapping, value: &str) -> Result<()> {
        match mapping {
            FieldMapping::Single(physical) => self.add_field(physical, value),
            FieldMapping::Multi(physicals) => {
                for physical in physicals {
                    self.add_field(physical, value);
                }
            }
            FieldMapping::Composite(_) => {
                return Err(IntegrationError::ConfigurationError(format!(
                    "scalar field `{logical}` (entry is composite)"
                )));
            }
        }
        Ok(())
    }

    fn write_address_lines(&mut self, composite: &str, lines: &[(&str, &Option<String>)]) {
        let Some(mapping) = self.table.get(composite).copied() else {
            return;
        };
        for (key, value) in lines {
            if let (Some(physical), Some(value)) = (mapping.sub_field(key), value) {
                self.add_field(physical, value);
            }
        }
    }
}
