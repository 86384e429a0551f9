//! Openfront platform adapter.
//!
//! Talks GraphQL over HTTP to an openfront (Keystone-based) store backend.
//! One instance serves every openfront store: the target endpoint and the
//! forwarded credentials arrive with each call, never through shared state.

pub mod queries;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use marketplace_core::{
    Cart, Country, Order, PaymentMethod, PaymentSession, Product, Region, ResolvedStore,
    ShippingAddress, ShippingOption, StoreInfo,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{AuthenticatedUser, CustomerIdentity, PlatformAdapter};
use crate::context::{Credentials, EffectiveCredential};
use crate::error::{GatewayError, Result, UpstreamError};

use queries::{
    AddCartLineItemVars, AddShippingMethodVars, AuthenticateVars, CartUpdateData, CompleteCartVars,
    ConnectById, CreateAddressVars, CreateCartVars, EmailVars, GetCartVars, GetProductVars,
    InitiatePaymentSessionVars, NoVars, RegionIdVars, RemoveCartLineItemVars, SearchProductsVars,
    UpdateCartLineItemVars, UpdateCartVars,
};
use types::{
    AddCartLineItemData, AddShippingMethodData, AuthenticateUserData, AuthenticatedItemData,
    CartShippingOptionsData, CompleteCartData, CreateAddressData, CreateCartData, CreateUserData,
    GetCartData, GetProductData, InitiatePaymentSessionData, PaymentProvidersData, RegionsData,
    RemoveCartLineItemData, SearchProductsData, StoreInfoData, UpdateCartData,
    UpdateCartLineItemData, UsersCountData,
};

/// Body of every outbound GraphQL request.
#[derive(Debug, Serialize)]
struct GraphqlRequest<V: Serialize> {
    query: &'static str,
    variables: V,
}

/// Standard GraphQL response envelope.
#[derive(Debug, serde::Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<WireGraphqlError>>,
}

#[derive(Debug, serde::Deserialize)]
struct WireGraphqlError {
    message: String,
    #[serde(default)]
    path: Option<Vec<serde_json::Value>>,
}

/// Adapter for openfront store backends.
pub struct OpenfrontAdapter {
    client: reqwest::Client,
}

impl OpenfrontAdapter {
    /// Create a new adapter with a bounded per-call timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed. Adapters are built
    /// once per process; a fallback client would carry no request timeout.
    #[must_use]
    pub fn new(upstream_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout)
            .build()
            .expect("Failed to construct backend HTTP client");
        Self { client }
    }

    /// Execute one GraphQL operation against a store's endpoint.
    async fn execute<V, T>(
        &self,
        store: &ResolvedStore,
        credential: &EffectiveCredential,
        document: &'static str,
        variables: V,
    ) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&store.endpoint)
            .header("Content-Type", "application/json")
            .json(&GraphqlRequest {
                query: document,
                variables,
            });

        // Exactly one credential is forwarded per call.
        request = match credential {
            EffectiveCredential::SessionToken(token) | EffectiveCredential::Bearer(token) => {
                request.bearer_auth(token.expose_secret())
            }
            EffectiveCredential::Cookie(cookie) => {
                request.header("Cookie", cookie.expose_secret())
            }
            EffectiveCredential::None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                GatewayError::UpstreamUnavailable(e.to_string())
            } else {
                GatewayError::Http(e)
            }
        })?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                store = %store.id,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(GatewayError::Upstream(vec![UpstreamError {
                message: format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
                path: vec![],
            }]));
        }

        let envelope: GraphqlResponse<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    store = %store.id,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse backend GraphQL response"
                );
                return Err(GatewayError::Parse(e));
            }
        };

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, store = %store.id, "GraphQL errors in response");
            return Err(GatewayError::Upstream(
                errors
                    .into_iter()
                    .map(|e| UpstreamError {
                        message: e.message,
                        path: e.path.unwrap_or_default(),
                    })
                    .collect(),
            ));
        }

        envelope.data.ok_or_else(|| {
            tracing::error!(
                store = %store.id,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend GraphQL response has no data and no errors"
            );
            GatewayError::Upstream(vec![UpstreamError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }

    /// Resolve the backend region covering a country.
    async fn region_for_country(
        &self,
        store: &ResolvedStore,
        country_code: &str,
        credentials: &Credentials,
    ) -> Result<Region> {
        let regions = self.get_regions(store, credentials).await?;
        regions
            .into_iter()
            .find(|r| r.covers(country_code))
            .ok_or_else(|| GatewayError::NoRegionForCountry(country_code.to_string()))
    }
}

#[async_trait]
impl PlatformAdapter for OpenfrontAdapter {
    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn search_products(
        &self,
        store: &ResolvedStore,
        country_code: &str,
        query: Option<&str>,
        limit: i64,
        credentials: &Credentials,
    ) -> Result<Vec<Product>> {
        let data: SearchProductsData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::SEARCH_PRODUCTS,
                SearchProductsVars {
                    search: query,
                    take: limit,
                    country_code,
                },
            )
            .await?;
        Ok(data.products.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn get_product(
        &self,
        store: &ResolvedStore,
        product_id: &str,
        country_code: &str,
        credentials: &Credentials,
    ) -> Result<Product> {
        let data: GetProductData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_PRODUCT,
                GetProductVars {
                    id: product_id,
                    country_code,
                },
            )
            .await?;
        data.product
            .map(Into::into)
            .ok_or_else(|| GatewayError::NotFound(format!("Product not found: {product_id}")))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn create_cart(
        &self,
        store: &ResolvedStore,
        country_code: &str,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let region = self.region_for_country(store, country_code, credentials).await?;
        let data: CreateCartData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::CREATE_CART,
                CreateCartVars { region_id: &region.id },
            )
            .await?;
        data.create_cart
            .map(Into::into)
            .ok_or_else(|| upstream_null("createCart"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn get_cart(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let data: GetCartData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_CART,
                GetCartVars { cart_id },
            )
            .await?;
        data.cart
            .map(Into::into)
            .ok_or_else(|| GatewayError::NotFound(format!("Cart not found: {cart_id}")))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn get_cart_raw(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<serde_json::Value> {
        let mut data: serde_json::Value = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_CART,
                GetCartVars { cart_id },
            )
            .await?;
        let cart = data.get_mut("cart").map(serde_json::Value::take);
        match cart {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(GatewayError::NotFound(format!("Cart not found: {cart_id}"))),
        }
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn add_to_cart(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        variant_id: &str,
        quantity: i64,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let data: AddCartLineItemData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::ADD_CART_LINE_ITEM,
                AddCartLineItemVars {
                    cart_id,
                    variant_id,
                    quantity,
                },
            )
            .await?;
        data.add_cart_line_item
            .map(Into::into)
            .ok_or_else(|| upstream_null("addCartLineItem"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn update_cart_item_quantity(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        line_item_id: &str,
        quantity: i64,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let data: UpdateCartLineItemData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::UPDATE_CART_LINE_ITEM,
                UpdateCartLineItemVars {
                    cart_id,
                    line_id: line_item_id,
                    quantity,
                },
            )
            .await?;
        data.update_cart_line_item
            .map(Into::into)
            .ok_or_else(|| upstream_null("updateCartLineItem"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn remove_cart_item(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        line_item_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let data: RemoveCartLineItemData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::REMOVE_CART_LINE_ITEM,
                RemoveCartLineItemVars {
                    cart_id,
                    line_id: line_item_id,
                },
            )
            .await?;
        data.remove_cart_line_item
            .map(Into::into)
            .ok_or_else(|| upstream_null("removeCartLineItem"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn get_available_countries(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Vec<Country>> {
        let regions = self.get_regions(store, credentials).await?;
        let mut countries: Vec<Country> =
            regions.into_iter().flat_map(|r| r.countries).collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(countries)
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn get_regions(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Vec<Region>> {
        let data: RegionsData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_REGIONS,
                NoVars {},
            )
            .await?;
        Ok(data.regions.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn get_cart_shipping_options(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<ShippingOption>> {
        let data: CartShippingOptionsData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_CART_SHIPPING_OPTIONS,
                GetCartVars { cart_id },
            )
            .await?;
        Ok(data.cart_shipping_options.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn set_shipping_method(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        shipping_option_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let data: AddShippingMethodData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::ADD_CART_SHIPPING_METHOD,
                AddShippingMethodVars {
                    cart_id,
                    option_id: shipping_option_id,
                },
            )
            .await?;
        data.add_cart_shipping_method
            .map(Into::into)
            .ok_or_else(|| upstream_null("addCartShippingMethod"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn current_customer(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Option<CustomerIdentity>> {
        // Without a shopper-session credential there is nothing to resolve;
        // skip the backend round trip.
        if !credentials.has_user_session(&store.id) {
            return Ok(None);
        }
        let data: AuthenticatedItemData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::AUTHENTICATED_ITEM,
                NoVars {},
            )
            .await?;
        Ok(data.authenticated_item.map(|u| CustomerIdentity {
            id: u.id,
            email: u.email,
        }))
    }

    #[instrument(skip(self), fields(store = %store.id))]
    async fn customer_email_exists(&self, store: &ResolvedStore, email: &str) -> Result<bool> {
        let data: UsersCountData = self
            .execute(
                store,
                &EffectiveCredential::None,
                queries::USER_EMAIL_EXISTS,
                EmailVars { email },
            )
            .await?;
        Ok(data.users_count > 0)
    }

    #[instrument(skip(self, password), fields(store = %store.id))]
    async fn register_guest(
        &self,
        store: &ResolvedStore,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser> {
        let data: CreateUserData = self
            .execute(
                store,
                &EffectiveCredential::None,
                queries::CREATE_USER,
                AuthenticateVars { email, password },
            )
            .await?;
        data.create_user
            .ok_or_else(|| upstream_null("createUser"))?;
        self.authenticate_user(store, email, password).await
    }

    #[instrument(skip(self, password), fields(store = %store.id))]
    async fn authenticate_user(
        &self,
        store: &ResolvedStore,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser> {
        let data: AuthenticateUserData = self
            .execute(
                store,
                &EffectiveCredential::None,
                queries::AUTHENTICATE_USER,
                AuthenticateVars { email, password },
            )
            .await?;

        let result = data
            .authenticate_user_with_password
            .ok_or(GatewayError::AuthenticationFailed)?;

        match (result.session_token, result.item) {
            (Some(session_token), Some(user)) => Ok(AuthenticatedUser {
                session_token,
                customer: CustomerIdentity {
                    id: user.id,
                    email: user.email,
                },
            }),
            _ => {
                tracing::debug!(
                    message = result.message.as_deref().unwrap_or("(none)"),
                    "Backend rejected login"
                );
                Err(GatewayError::AuthenticationFailed)
            }
        }
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn connect_cart_to_user(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        user_id: &str,
        email: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let data: UpdateCartData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::UPDATE_CART,
                UpdateCartVars {
                    cart_id,
                    data: CartUpdateData {
                        email: Some(email),
                        user: Some(ConnectById::new(user_id)),
                        ..CartUpdateData::default()
                    },
                },
            )
            .await?;
        data.update_cart
            .map(|_| ())
            .ok_or_else(|| upstream_null("updateCart"))
    }

    #[instrument(skip(self, address, credentials), fields(store = %store.id))]
    async fn create_address(
        &self,
        store: &ResolvedStore,
        address: &ShippingAddress,
        customer_id: &str,
        credentials: &Credentials,
    ) -> Result<String> {
        let data: CreateAddressData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::CREATE_ADDRESS,
                CreateAddressVars {
                    data: queries::AddressCreateData::from_address(address, customer_id),
                },
            )
            .await?;
        data.create_address
            .map(|a| a.id)
            .ok_or_else(|| upstream_null("createAddress"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn set_cart_details(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        email: &str,
        address_id: &str,
        customer_id: &str,
        credentials: &Credentials,
    ) -> Result<Cart> {
        let data: UpdateCartData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::UPDATE_CART,
                UpdateCartVars {
                    cart_id,
                    data: CartUpdateData {
                        email: Some(email),
                        shipping_address: Some(ConnectById::new(address_id)),
                        billing_address: Some(ConnectById::new(address_id)),
                        user: Some(ConnectById::new(customer_id)),
                    },
                },
            )
            .await?;
        data.update_cart
            .map(Into::into)
            .ok_or_else(|| upstream_null("updateCart"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn get_available_payment_methods(
        &self,
        store: &ResolvedStore,
        region_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<PaymentMethod>> {
        let data: PaymentProvidersData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_PAYMENT_PROVIDERS,
                RegionIdVars { region_id },
            )
            .await?;
        Ok(data.payment_providers.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn initiate_payment_session(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        provider_id: &str,
        credentials: &Credentials,
    ) -> Result<PaymentSession> {
        let data: InitiatePaymentSessionData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::INITIATE_PAYMENT_SESSION,
                InitiatePaymentSessionVars {
                    cart_id,
                    provider_id,
                },
            )
            .await?;
        let session = data
            .initiate_payment_session
            .ok_or_else(|| upstream_null("initiatePaymentSession"))?;
        Ok(PaymentSession {
            id: session.id,
            provider_id: session.provider_id,
            status: session.status,
            is_selected: session.is_selected,
            amount: session.amount,
            data: session.data,
        })
    }

    #[instrument(skip(self, credentials), fields(store = %store.id, cart_id = %cart_id))]
    async fn complete_cart(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        payment_session_id: &str,
        credentials: &Credentials,
    ) -> Result<Order> {
        let data: CompleteCartData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::COMPLETE_CART,
                CompleteCartVars {
                    cart_id,
                    payment_session_id,
                },
            )
            .await?;
        data.complete_cart
            .map(Into::into)
            .ok_or_else(|| upstream_null("completeCart"))
    }

    #[instrument(skip(self, credentials), fields(store = %store.id))]
    async fn get_store_info(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<StoreInfo> {
        let data: StoreInfoData = self
            .execute(
                store,
                &credentials.effective_for(&store.id),
                queries::GET_STORE_INFO,
                NoVars {},
            )
            .await?;
        data.store
            .map(Into::into)
            .ok_or_else(|| GatewayError::NotFound("Store metadata not found".to_string()))
    }

    fn build_checkout_link(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        country_code: &str,
    ) -> String {
        url::Url::parse(&store.base_url).map_or_else(
            |_| format!("{}/{country_code}/checkout?cart={cart_id}", store.base_url),
            |mut u| {
                u.set_path(&format!("/{country_code}/checkout"));
                u.query_pairs_mut().append_pair("cart", cart_id);
                u.to_string()
            },
        )
    }
}

fn upstream_null(field: &str) -> GatewayError {
    GatewayError::Upstream(vec![UpstreamError {
        message: format!("Backend returned null for {field}"),
        path: vec![serde_json::Value::String(field.to_string())],
    }])
}

#[cfg(test)]
mod tests {
    use marketplace_core::Platform;

    use super::*;

    fn store() -> ResolvedStore {
        ResolvedStore::from_config(
            0,
            &marketplace_core::StoreConfig {
                base_url: "https://shop.example.com".to_string(),
                platform: Platform::Openfront,
            },
        )
    }

    #[test]
    fn test_checkout_link_shape() {
        let adapter = OpenfrontAdapter::new(Duration::from_secs(5));
        let link = adapter.build_checkout_link(&store(), "cart-abc", "us");
        assert_eq!(link, "https://shop.example.com/us/checkout?cart=cart-abc");
    }

    #[test]
    fn test_checkout_link_escapes_query_value() {
        let adapter = OpenfrontAdapter::new(Duration::from_secs(5));
        let link = adapter.build_checkout_link(&store(), "cart with space", "us");
        assert!(link.contains("cart=cart+with+space"));
    }
}
