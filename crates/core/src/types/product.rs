//! Normalized product projections.
//!
//! Read-only views of backend catalogue data. The gateway never caches these;
//! every tool call fetches fresh data so inventory and pricing stay accurate
//! across conversation turns.

use serde::{Deserialize, Serialize};

/// A product as exposed to the calling agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    /// URL-safe handle, unique within a store.
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variants: Vec<ProductVariant>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Price in minor units for the requested region's currency.
    pub price: i64,
    /// ISO 4217 currency code, lowercase (backend convention).
    pub currency_code: String,
    pub inventory_quantity: i64,
    /// Whether the variant can be ordered when out of stock.
    pub allow_backorder: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<VariantOption>,
}

/// A named option value on a variant (e.g. Size = "M").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    pub name: String,
    pub value: String,
}

impl ProductVariant {
    /// Whether an order for `quantity` units can currently be fulfilled.
    #[must_use]
    pub const fn is_purchasable(&self, quantity: i64) -> bool {
        self.allow_backorder || self.inventory_quantity >= quantity
    }
}
