//! Logical-to-physical field name mapping.
//!
//! The [`MappingTable`] translates the names callers use (`currency`, `return_url`,
//! `shipping_address.state`) into the names PayPal expects on the wire
//! (`currency_code`, `return`, `state`). A table is built once and shared by
//! reference; it is never mutated after construction.

use std::{collections::HashMap, sync::LazyLock};

use crate::error::{IntegrationError, Result};

pub mod country;

pub use country::{canadian_province_name, lookup_country_code};

/// How a single logical field lands in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMapping {
    /// One physical field.
    Single(&'static str),
    /// The same value written to several physical fields.
    Multi(&'static [&'static str]),
    /// A structured value whose sub-keys each map to their own physical field.
    Composite(&'static [(&'static str, &'static str)]),
}

impl FieldMapping {
    /// Looks up the physical name of a composite sub-key.
    ///
    /// Returns `None` for non-composite mappings and unknown sub-keys.
    #[must_use]
    pub fn sub_field(&self, key: &str) -> Option<&'static str> {
        match self {
            Self::Composite(fields) => {
                fields.iter().find(|(sub, _)| *sub == key).map(|(_, physical)| *physical)
            }
            Self::Single(_) | Self::Multi(_) => None,
        }
    }
}

/// Immutable lookup from logical field symbol to its [`FieldMapping`].
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<&'static str, FieldMapping>,
}

static PAYPAL_TABLE: LazyLock<MappingTable> = LazyLock::new(|| {
    MappingTable::from_entries([
        ("order", FieldMapping::Multi(&["item_number", "custom"])),
        ("account", FieldMapping::Single("business")),
        ("amount", FieldMapping::Single("amount")),
        ("currency", FieldMapping::Single("currency_code")),
        ("notify_url", FieldMapping::Single("notify_url")),
        ("return_url", FieldMapping::Single("return")),
        ("cancel_return_url", FieldMapping::Single("cancel_return")),
        ("invoice", FieldMapping::Single("invoice")),
        ("item_name", FieldMapping::Single("item_name")),
        ("quantity", FieldMapping::Single("quantity")),
        ("no_shipping", FieldMapping::Single("no_shipping")),
        ("no_note", FieldMapping::Single("no_note")),
        ("address_override", FieldMapping::Single("address_override")),
        ("application_id", FieldMapping::Single("bn")),
        ("cpp_header_image", FieldMapping::Single("cpp_header_image")),
        ("shipping", FieldMapping::Single("shipping")),
        ("tax", FieldMapping::Single("tax")),
        ("cmd", FieldMapping::Single("cmd")),
        ("custom", FieldMapping::Single("custom")),
        ("src", FieldMapping::Single("src")),
        ("sra", FieldMapping::Single("sra")),
        ("a1", FieldMapping::Single("a1")),
        ("a2", FieldMapping::Single("a2")),
        ("a3", FieldMapping::Single("a3")),
        ("p1", FieldMapping::Single("p1")),
        ("p2", FieldMapping::Single("p2")),
        ("p3", FieldMapping::Single("p3")),
        ("t1", FieldMapping::Single("t1")),
        ("t2", FieldMapping::Single("t2")),
        ("t3", FieldMapping::Single("t3")),
        (
            "customer",
            FieldMapping::Composite(&[
                ("first_name", "first_name"),
                ("last_name", "last_name"),
                ("email", "email"),
            ]),
        ),
        (
            "shipping_address",
            FieldMapping::Composite(&[
                ("city", "city"),
                ("address1", "address1"),
                ("address2", "address2"),
                ("state", "state"),
                ("zip", "zip"),
                ("country", "country"),
            ]),
        ),
    ])
});

impl MappingTable {
    /// Builds a table from `(logical, mapping)` pairs.
    ///
    /// A logical name declared twice keeps its last declaration.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, FieldMapping)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    /// Returns the shared PayPal Website Payments Standard table.
    ///
    /// # Examples
    ///
    /// ```
    /// use paypal_standard::mapping::{FieldMapping, MappingTable};
    ///
    /// let table = MappingTable::paypal();
    /// assert_eq!(table.get("currency"), Some(&FieldMapping::Single("currency_code")));
    /// assert!(table.get("colour").is_none());
    /// ```
    #[must_use]
    pub fn paypal() -> &'static Self {
        &PAYPAL_TABLE
    }

    /// Looks up a logical field, returning `None` when it is not mapped.
    #[must_use]
    pub fn get(&self, logical: &str) -> Option<&FieldMapping> {
        self.entries.get(logical)
    }

    /// Looks up a logical field that the caller requires to exist.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ConfigurationError`] if the table has no entry.
    pub fn resolve(&self, logical: &str) -> Result<&FieldMapping> {
        self.get(logical).ok_or_else(|| {
            IntegrationError::ConfigurationError(format!("logical field `{logical}`"))
        })
    }

    /// Looks up a composite sub-key that the caller requires to exist.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ConfigurationError`] if either the composite
    /// or the sub-key is missing.
    pub fn require_sub_field(&self, composite: &str, key: &str) -> Result<&'static str> {
        self.resolve(composite)?.sub_field(key).ok_or_else(|| {
            IntegrationError::ConfigurationError(format!("logical field `{composite}.{key}`"))
        })
    }

    /// Returns the number of logical fields in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table maps nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paypal_table_scalar_entries() {
        let table = MappingTable::paypal();
        assert_eq!(table.get("account"), Some(&FieldMapping::Single("business")));
        assert_eq!(table.get("return_url"), Some(&FieldMapping::Single("return")));
        assert_eq!(table.get("application_id"), Some(&FieldMapping::Single("bn")));
        assert_eq!(table.get("shipping"), Some(&FieldMapping::Single("shipping")));
    }

    #[test]
    fn test_paypal_table_subscription_terms() {
        let table = MappingTable::paypal();
        for letter in ["a", "p", "t"] {
            for index in 1..=3 {
                let name = format!("{letter}{index}");
                assert!(table.get(&name).is_some(), "missing {name}");
            }
        }
    }

    #[test]
    fn test_order_maps_to_two_fields() {
        let table = MappingTable::paypal();
        assert_eq!(table.get("order"), Some(&FieldMapping::Multi(&["item_number", "custom"])));
    }

    #[test]
    fn test_resolve_unknown_is_configuration_error() {
        let table = MappingTable::paypal();
        let err = table.resolve("favourite_colour").unwrap_err();
        assert!(matches!(err, IntegrationError::ConfigurationError(_)));
    }

    #[test]
    fn test_sub_field_lookup() {
        let table = MappingTable::paypal();
        assert_eq!(table.require_sub_field("shipping_address", "zip").unwrap(), "zip");
        assert!(table.resolve("customer").unwrap().sub_field("phone").is_none());
        assert!(table.require_sub_field("customer", "phone").is_err());
        assert!(table.require_sub_field("amount", "value").is_err());
    }

    #[test]
    fn test_last_declaration_wins() {
        let table = MappingTable::from_entries([
            ("shipping", FieldMapping::Single("handling_cart")),
            ("shipping", FieldMapping::Single("shipping")),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("shipping"), Some(&FieldMapping::Single("shipping")));
    }

    #[test]
    fn test_empty_table() {
        let table = MappingTable::default();
        assert!(table.is_empty());
        assert!(table.resolve("amount").is_err());
    }
}
