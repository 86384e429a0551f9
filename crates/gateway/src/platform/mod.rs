//! Platform adapters: one capability contract over heterogeneous backends.
//!
//! An adapter normalizes one backend platform (its query protocol, its cart
//! and checkout semantics) into the fixed capability set the tool handlers
//! program against. Adapters are stateless singletons cached per platform
//! type for the process lifetime; all per-request data (credentials, cart
//! ids) is passed into every call.

pub mod openfront;
pub mod registry;

use async_trait::async_trait;
use marketplace_core::{
    Cart, Country, Order, PaymentMethod, PaymentSession, Product, Region, ResolvedStore,
    ShippingAddress, ShippingOption, StoreInfo,
};
use serde::Serialize;

use crate::context::Credentials;
use crate::error::Result;

pub use registry::AdapterRegistry;

/// An authenticated backend customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIdentity {
    pub id: String,
    pub email: String,
}

/// The result of authenticating (or bootstrapping) a backend user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Store-scoped session token. The gateway never persists this; it is
    /// returned to the caller to resend on later requests.
    pub session_token: String,
    pub customer: CustomerIdentity,
}

/// The capability contract every platform adapter implements.
///
/// Implementations must be stateless (or hold only configuration) since one
/// instance is shared by all concurrent requests for its platform type.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    // -- Catalogue ----------------------------------------------------------

    async fn search_products(
        &self,
        store: &ResolvedStore,
        country_code: &str,
        query: Option<&str>,
        limit: i64,
        credentials: &Credentials,
    ) -> Result<Vec<Product>>;

    async fn get_product(
        &self,
        store: &ResolvedStore,
        product_id: &str,
        country_code: &str,
        credentials: &Credentials,
    ) -> Result<Product>;

    // -- Cart lifecycle -----------------------------------------------------

    /// Create a cart for a country. Resolves the country to a backend region
    /// first and fails with "no region for country" if none covers it.
    async fn create_cart(
        &self,
        store: &ResolvedStore,
        country_code: &str,
        credentials: &Credentials,
    ) -> Result<Cart>;

    async fn get_cart(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart>;

    /// The cart in the backend's native shape, for UI fragments and
    /// debugging.
    async fn get_cart_raw(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<serde_json::Value>;

    async fn add_to_cart(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        variant_id: &str,
        quantity: i64,
        credentials: &Credentials,
    ) -> Result<Cart>;

    async fn update_cart_item_quantity(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        line_item_id: &str,
        quantity: i64,
        credentials: &Credentials,
    ) -> Result<Cart>;

    async fn remove_cart_item(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        line_item_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart>;

    // -- Regions and shipping -----------------------------------------------

    /// Countries the store ships to, sorted by display name.
    async fn get_available_countries(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Vec<Country>>;

    async fn get_regions(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Vec<Region>>;

    async fn get_cart_shipping_options(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<ShippingOption>>;

    /// Idempotent: re-selecting the already-applied option is a no-op
    /// success on the backend.
    async fn set_shipping_method(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        shipping_option_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart>;

    // -- Identity -----------------------------------------------------------

    /// The customer the forwarded credentials resolve to, if any.
    async fn current_customer(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Option<CustomerIdentity>>;

    async fn customer_email_exists(&self, store: &ResolvedStore, email: &str) -> Result<bool>;

    /// Create a guest account and authenticate it in one step.
    async fn register_guest(
        &self,
        store: &ResolvedStore,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser>;

    /// Fails with "authentication failed" on invalid credentials.
    async fn authenticate_user(
        &self,
        store: &ResolvedStore,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser>;

    async fn connect_cart_to_user(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        user_id: &str,
        email: &str,
        credentials: &Credentials,
    ) -> Result<()>;

    /// Create an address record owned by the given customer; returns the
    /// address id.
    async fn create_address(
        &self,
        store: &ResolvedStore,
        address: &ShippingAddress,
        customer_id: &str,
        credentials: &Credentials,
    ) -> Result<String>;

    /// Set email, link shipping/billing address, and link the customer on a
    /// cart; returns the refreshed cart.
    async fn set_cart_details(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        email: &str,
        address_id: &str,
        customer_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart>;

    // -- Payment and completion ---------------------------------------------

    async fn get_available_payment_methods(
        &self,
        store: &ResolvedStore,
        region_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<PaymentMethod>>;

    async fn initiate_payment_session(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        provider_id: &str,
        credentials: &Credentials,
    ) -> Result<PaymentSession>;

    async fn complete_cart(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        payment_session_id: &str,
        credentials: &Credentials,
    ) -> Result<Order>;

    // -- Store metadata -----------------------------------------------------

    async fn get_store_info(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<StoreInfo>;

    /// Hosted checkout URL for a cart. Pure; no backend call.
    fn build_checkout_link(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        country_code: &str,
    ) -> String;
}

impl std::fmt::Debug for dyn PlatformAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PlatformAdapter")
    }
}

/// Resolve a human-readable payment provider name or code to one of the
/// region's providers via case-insensitive substring match on id and name.
#[must_use]
pub fn resolve_payment_provider<'a>(
    methods: &'a [PaymentMethod],
    requested: &str,
) -> Option<&'a PaymentMethod> {
    let needle = requested.to_lowercase();
    methods.iter().find(|m| {
        m.id.to_lowercase().contains(&needle) || m.name.to_lowercase().contains(&needle)
    })
}
