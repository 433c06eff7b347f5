//! Country and province lookup tables.
//!
//! PayPal wants ISO 3166-1 alpha-2 country codes and, for Canada, the full
//! province name. Inputs arrive in whatever form the storefront collected them.

/// Country name variants keyed by ISO 3166-1 alpha-2 code.
///
/// Each row is `(alpha2, alpha3, names)`; matching is case-insensitive.
const COUNTRIES: &[(&str, &str, &[&str])] = &[
    ("AR", "ARG", &["Argentina"]),
    ("AT", "AUT", &["Austria"]),
    ("AU", "AUS", &["Australia"]),
    ("BE", "BEL", &["Belgium"]),
    ("BR", "BRA", &["Brazil"]),
    ("CA", "CAN", &["Canada"]),
    ("CH", "CHE", &["Switzerland"]),
    ("CL", "CHL", &["Chile"]),
    ("CN", "CHN", &["China", "People's Republic of China"]),
    ("CZ", "CZE", &["Czech Republic", "Czechia"]),
    ("DE", "DEU", &["Germany", "Deutschland"]),
    ("DK", "DNK", &["Denmark"]),
    ("ES", "ESP", &["Spain", "España"]),
    ("FI", "FIN", &["Finland"]),
    ("FR", "FRA", &["France"]),
    ("GB", "GBR", &["United Kingdom", "Great Britain", "UK", "England"]),
    ("GR", "GRC", &["Greece"]),
    ("HK", "HKG", &["Hong Kong"]),
    ("HU", "HUN", &["Hungary"]),
    ("IE", "IRL", &["Ireland"]),
    ("IL", "ISR", &["Israel"]),
    ("IN", "IND", &["India"]),
    ("IT", "ITA", &["Italy"]),
    ("JP", "JPN", &["Japan"]),
    ("KR", "KOR", &["South Korea", "Korea, Republic of"]),
    ("MX", "MEX", &["Mexico"]),
    ("MY", "MYS", &["Malaysia"]),
    ("NL", "NLD", &["Netherlands", "The Netherlands", "Holland"]),
    ("NO", "NOR", &["Norway"]),
    ("NZ", "NZL", &["New Zealand"]),
    ("PH", "PHL", &["Philippines"]),
    ("PL", "POL", &["Poland"]),
    ("PT", "PRT", &["Portugal"]),
    ("RU", "RUS", &["Russia", "Russian Federation"]),
    ("SE", "SWE", &["Sweden"]),
    ("SG", "SGP", &["Singapore"]),
    ("TH", "THA", &["Thailand"]),
    ("TR", "TUR", &["Turkey", "Türkiye"]),
    ("TW", "TWN", &["Taiwan"]),
    ("US", "USA", &["United States", "United States of America", "America"]),
    ("ZA", "ZAF", &["South Africa"]),
];

const CANADIAN_PROVINCES: &[(&str, &str)] = &[
    ("AB", "Alberta"),
    ("BC", "British Columbia"),
    ("MB", "Manitoba"),
    ("NB", "New Brunswick"),
    ("NL", "Newfoundland"),
    ("NS", "Nova Scotia"),
    ("NU", "Nunavut"),
    ("NT", "Northwest Territories"),
    ("ON", "Ontario"),
    ("PE", "Prince Edward Island"),
    ("QC", "Quebec"),
    ("SK", "Saskatchewan"),
    ("YT", "Yukon"),
];

/// Resolves a country name or code to its two-letter code.
///
/// Unresolved input is returned unchanged.
///
/// # Examples
///
/// ```
/// use paypal_standard::mapping::lookup_country_code;
///
/// assert_eq!(lookup_country_code("Canada"), "CA");
/// assert_eq!(lookup_country_code("usa"), "US");
/// assert_eq!(lookup_country_code("Atlantis"), "Atlantis");
/// ```
#[must_use]
pub fn lookup_country_code(name_or_code: &str) -> String {
    let needle = name_or_code.trim();
    COUNTRIES
        .iter()
        .find(|(alpha2, alpha3, names)| {
            alpha2.eq_ignore_ascii_case(needle)
                || alpha3.eq_ignore_ascii_case(needle)
                || names.iter().any(|name| name.to_lowercase() == needle.to_lowercase())
        })
        .map_or_else(|| name_or_code.to_owned(), |(alpha2, _, _)| (*alpha2).to_owned())
}

/// Translates a Canadian province code to the name PayPal expects.
#[must_use]
pub fn canadian_province_name(code: &str) -> Option<&'static str> {
    CANADIAN_PROVINCES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code.trim()))
        .map(|(_, name)| *name)
}
