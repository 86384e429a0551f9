//! Wire types for openfront GraphQL responses and their conversions into the
//! normalized core model.

use chrono::{DateTime, Utc};
use marketplace_core::{
    Cart, Country, LineItem, Order, PaymentMethod, PaymentSession, PaymentSessionStatus, Product,
    ProductVariant, Region, ShippingAddress, ShippingMethod, ShippingOption, StoreInfo,
    VariantOption,
};
use serde::Deserialize;

// =============================================================================
// Catalogue
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub product_variants: Vec<WireVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVariant {
    pub id: String,
    pub title: String,
    pub sku: Option<String>,
    pub price: i64,
    pub currency_code: String,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub allow_backorder: bool,
    #[serde(default)]
    pub options: Vec<WireVariantOption>,
}

#[derive(Debug, Deserialize)]
pub struct WireVariantOption {
    pub name: String,
    pub value: String,
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            handle: wire.handle,
            thumbnail: wire.thumbnail,
            description: wire.description,
            variants: wire.product_variants.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WireVariant> for ProductVariant {
    fn from(wire: WireVariant) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            sku: wire.sku,
            price: wire.price,
            currency_code: wire.currency_code,
            inventory_quantity: wire.inventory_quantity,
            allow_backorder: wire.allow_backorder,
            options: wire
                .options
                .into_iter()
                .map(|o| VariantOption {
                    name: o.name,
                    value: o.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchProductsData {
    pub products: Vec<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub struct GetProductData {
    pub product: Option<WireProduct>,
}

// =============================================================================
// Regions
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRegion {
    pub id: String,
    pub name: String,
    pub currency_code: String,
    #[serde(default)]
    pub countries: Vec<WireCountry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCountry {
    pub iso2: String,
    pub display_name: String,
}

impl From<WireRegion> for Region {
    fn from(wire: WireRegion) -> Self {
        let currency = wire.currency_code;
        Self {
            id: wire.id,
            name: wire.name,
            countries: wire
                .countries
                .into_iter()
                .map(|c| Country {
                    code: c.iso2.to_lowercase(),
                    name: c.display_name,
                    currency_code: currency.clone(),
                })
                .collect(),
            currency_code: currency,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegionsData {
    pub regions: Vec<WireRegion>,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCart {
    pub id: String,
    pub email: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtotal: i64,
    #[serde(default)]
    pub total: i64,
    pub currency_code: String,
    pub region: Option<WireIdRef>,
    #[serde(default)]
    pub line_items: Vec<WireLineItem>,
    pub shipping_address: Option<WireAddress>,
    #[serde(default)]
    pub shipping_methods: Vec<WireShippingMethod>,
    #[serde(default)]
    pub payment_sessions: Vec<WirePaymentSession>,
}

#[derive(Debug, Deserialize)]
pub struct WireIdRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLineItem {
    pub id: String,
    pub quantity: i64,
    pub title: String,
    pub unit_price: i64,
    pub product_variant: WireIdRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub province: Option<String>,
    pub postal_code: String,
    pub country_code: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShippingMethod {
    pub id: String,
    pub shipping_option_id: String,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePaymentSession {
    pub id: String,
    pub provider_id: String,
    pub status: PaymentSessionStatus,
    pub is_selected: bool,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl From<WireAddress> for ShippingAddress {
    fn from(wire: WireAddress) -> Self {
        Self {
            first_name: wire.first_name,
            last_name: wire.last_name,
            address_1: wire.address_1,
            address_2: wire.address_2,
            city: wire.city,
            province: wire.province,
            postal_code: wire.postal_code,
            country_code: wire.country_code,
            phone: wire.phone,
        }
    }
}

impl From<WireCart> for Cart {
    fn from(wire: WireCart) -> Self {
        Self {
            id: wire.id,
            email: wire.email,
            items: wire
                .line_items
                .into_iter()
                .map(|l| LineItem {
                    id: l.id,
                    quantity: l.quantity,
                    variant_id: l.product_variant.id,
                    product_title: l.title,
                    unit_price: l.unit_price,
                })
                .collect(),
            subtotal: wire.subtotal,
            total: wire.total,
            currency_code: wire.currency_code,
            region_id: wire.region.map(|r| r.id),
            shipping_address: wire.shipping_address.map(Into::into),
            shipping_methods: wire
                .shipping_methods
                .into_iter()
                .map(|m| ShippingMethod {
                    id: m.id,
                    shipping_option_id: m.shipping_option_id,
                    price: m.price,
                })
                .collect(),
            payment_sessions: wire
                .payment_sessions
                .into_iter()
                .map(|s| PaymentSession {
                    id: s.id,
                    provider_id: s.provider_id,
                    status: s.status,
                    is_selected: s.is_selected,
                    amount: s.amount,
                    data: s.data,
                })
                .collect(),
            completed_at: wire.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartData {
    pub create_cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
pub struct GetCartData {
    pub cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartLineItemData {
    pub add_cart_line_item: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLineItemData {
    pub update_cart_line_item: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartLineItemData {
    pub remove_cart_line_item: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartData {
    pub update_cart: Option<WireCart>,
}

// =============================================================================
// Shipping
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartShippingOptionsData {
    #[serde(default)]
    pub cart_shipping_options: Vec<WireShippingOption>,
}

#[derive(Debug, Deserialize)]
pub struct WireShippingOption {
    pub id: String,
    pub name: String,
    pub amount: i64,
}

impl From<WireShippingOption> for ShippingOption {
    fn from(wire: WireShippingOption) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            amount: wire.amount,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddShippingMethodData {
    pub add_cart_shipping_method: Option<WireCart>,
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedItemData {
    pub authenticated_item: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersCountData {
    pub users_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserData {
    pub create_user: Option<WireUser>,
}

/// Keystone authentication union: success carries the token and user,
/// failure carries only a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAuthResult {
    pub session_token: Option<String>,
    pub item: Option<WireUser>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateUserData {
    pub authenticate_user_with_password: Option<WireAuthResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressData {
    pub create_address: Option<WireIdRef>,
}

// =============================================================================
// Payment and completion
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProvidersData {
    #[serde(default)]
    pub payment_providers: Vec<WirePaymentProvider>,
}

#[derive(Debug, Deserialize)]
pub struct WirePaymentProvider {
    pub id: String,
    pub name: String,
}

impl From<WirePaymentProvider> for PaymentMethod {
    fn from(wire: WirePaymentProvider) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentSessionData {
    pub initiate_payment_session: Option<WirePaymentSession>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    pub id: String,
    pub status: String,
    pub total: i64,
    pub currency_code: String,
    pub secret_key: Option<String>,
    pub shipping_address: Option<WireOrderAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrderAddress {
    pub country_code: Option<String>,
}

impl From<WireOrder> for Order {
    fn from(wire: WireOrder) -> Self {
        Self {
            id: wire.id,
            status: wire.status,
            total: wire.total,
            currency_code: wire.currency_code,
            secret_key: wire.secret_key,
            country_code: wire.shipping_address.and_then(|a| a.country_code),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCartData {
    pub complete_cart: Option<WireOrder>,
}

// =============================================================================
// Store metadata
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStore {
    pub name: String,
    pub logo: Option<String>,
    #[serde(default)]
    pub payment_providers: Vec<WirePaymentProvider>,
}

impl From<WireStore> for StoreInfo {
    fn from(wire: WireStore) -> Self {
        Self {
            name: wire.name,
            logo: wire.logo,
            payment_providers: wire.payment_providers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreInfoData {
    pub store: Option<WireStore>,
}
