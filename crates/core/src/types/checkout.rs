//! Address, shipping, payment, and order types used during checkout.

use serde::{Deserialize, Serialize};

/// A shipping (and billing) address supplied by the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub postal_code: String,
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A shipping option the shopper may select for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    pub id: String,
    pub name: String,
    /// Price in minor units.
    pub amount: i64,
}

/// A payment provider available in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Backend-canonical provider id (e.g. `pp_stripe_stripe`).
    pub id: String,
    /// Human-readable provider name.
    pub name: String,
}

/// The result of completing a cart.
///
/// Backend-owned; the gateway only reads enough to build the post-purchase
/// redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: String,
    /// Total in minor units.
    pub total: i64,
    pub currency_code: String,
    /// Key allowing a guest to look the order up without an account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Country code from the order's shipping address; required to build the
    /// redirect URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Display metadata for a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_providers: Vec<PaymentMethod>,
}
