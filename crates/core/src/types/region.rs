//! Region and country lookups.
//!
//! Backends group countries into regions that fix the currency and the
//! available payment providers; cart creation resolves a country to its
//! region first.

use serde::{Deserialize, Serialize};

/// A country a store can ship to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub code: String,
    pub name: String,
    /// ISO 4217 currency code of the country's region, lowercase.
    pub currency_code: String,
}

/// A backend region: a currency zone covering one or more countries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub currency_code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<Country>,
}

impl Region {
    /// Whether this region covers the given country code (case-insensitive).
    #[must_use]
    pub fn covers(&self, country_code: &str) -> bool {
        self.countries
            .iter()
            .any(|c| c.code.eq_ignore_ascii_case(country_code))
    }
}
