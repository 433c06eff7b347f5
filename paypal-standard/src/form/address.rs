//! Address normalization rules PayPal applies to shipping details.

use serde::Deserialize;

use crate::mapping::canadian_province_name;

/// Countries whose 10-digit phone numbers are split into area code, exchange and line.
pub const SPLIT_PHONE_COUNTRIES: &[&str] = &["US", "CA"];

/// Sentinel PayPal expects when a non-North-American address has no region.
pub const MISSING_STATE: &str = "N/A";

/// Postal address as collected by the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Address {
    /// Street line one.
    #[serde(default)]
    pub address1: Option<String>,
    /// Street line two.
    #[serde(default)]
    pub address2: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Province or state code.
    #[serde(default)]
    pub state: Option<String>,
    /// Postal or ZIP code.
    #[serde(default)]
    pub zip: Option<String>,
    /// Country name or code.
    #[serde(default)]
    pub country: Option<String>,
    /// Phone number in any punctuation.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Phone number laid out for PayPal's `night_phone_*` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneFields {
    /// North American number split 3-3-4.
    Split {
        /// `night_phone_a`
        area: String,
        /// `night_phone_b`
        exchange: String,
        /// `night_phone_c`
        line: String,
    },
    /// Any other number, digits only, placed in `night_phone_b`.
    Single(String),
}

/// Strips punctuation from a phone number and decides how PayPal should receive it.
///
/// # Examples
///
/// ```
/// use paypal_standard::form::{PhoneFields, normalize_phone};
///
/// let split = normalize_phone("(555) 555-1234", "CA");
/// assert_eq!(split, PhoneFields::Split {
///     area: "555".into(),
///     exchange: "555".into(),
///     line: "1234".into(),
/// });
///
/// assert_eq!(normalize_phone("+44 20 7946 0000", "GB"), PhoneFields::Single("442079460000".into()));
/// ```
#[must_use]
pub fn normalize_phone(phone: &str, country_code: &str) -> PhoneFields {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 10 && SPLIT_PHONE_COUNTRIES.contains(&country_code) {
        let (area, rest) = digits.split_at(3);
        let (exchange, line) = rest.split_at(3);
        return PhoneFields::Split {
            area: area.to_owned(),
            exchange: exchange.to_owned(),
            line: line.to_owned(),
        };
    }

    PhoneFields::Single(digits)
}

/// Chooses the `state` value for an address in `country_code`.
///
/// - `CA`: the full province name; unknown or missing codes yield `None`
/// - `US`: the code verbatim
/// - anything else: [`MISSING_STATE`] when blank, the input otherwise
#[must_use]
pub fn normalize_state(state: Option<&str>, country_code: Option<&str>) -> Option<String> {
    match country_code {
        Some("CA") => state.and_then(canadian_province_name).map(str::to_owned),
        Some("US") => state.map(str::to_owned),
        _ => match state {
            Some(state) if !state.trim().is_empty() => Some(state.to_owned()),
            _ => Some(MISSING_STATE.to_owned()),
        },
    }
}
