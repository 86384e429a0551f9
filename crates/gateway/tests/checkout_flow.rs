//! Checkout flow tests driving the JSON-RPC dispatcher against a mock
//! platform adapter that records every backend call it receives.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use marketplace_core::{
    Cart, Country, LineItem, Order, PaymentMethod, PaymentSession, PaymentSessionStatus, Platform,
    Product, Region, ResolvedStore, ShippingAddress, ShippingMethod, ShippingOption, StoreConfig,
    StoreInfo,
};
use serde_json::json;

use marketplace_gateway::config::GatewayConfig;
use marketplace_gateway::context::{Credentials, RequestContext};
use marketplace_gateway::error::{GatewayError, Result};
use marketplace_gateway::platform::{
    AdapterRegistry, AuthenticatedUser, CustomerIdentity, PlatformAdapter,
};
use marketplace_gateway::protocol::JsonRpcRequest;
use marketplace_gateway::rpc;
use marketplace_gateway::state::AppState;

/// In-memory backend. Records the name of every call so tests can assert
/// which backend traffic a tool call caused (or avoided).
#[derive(Default)]
struct MockAdapter {
    calls: Mutex<Vec<String>>,
    carts: Mutex<HashMap<String, Cart>>,
    pending_address: Mutex<Option<ShippingAddress>>,
    existing_emails: Vec<String>,
    counter: AtomicUsize,
}

impl MockAdapter {
    fn with_existing_emails(emails: &[&str]) -> Self {
        Self {
            existing_emails: emails.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn new_cart(&self) -> Cart {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Cart {
            id: format!("cart-{n}"),
            email: None,
            items: vec![],
            subtotal: 0,
            total: 0,
            currency_code: "usd".to_string(),
            region_id: Some("region-1".to_string()),
            shipping_address: None,
            shipping_methods: vec![],
            payment_sessions: vec![],
            completed_at: None,
        }
    }

    fn seed_cart(&self, cart: Cart) {
        self.carts.lock().unwrap().insert(cart.id.clone(), cart);
    }

    fn with_cart<T>(&self, cart_id: &str, f: impl FnOnce(&mut Cart) -> T) -> Result<T> {
        let mut carts = self.carts.lock().unwrap();
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| GatewayError::NotFound(format!("Cart not found: {cart_id}")))?;
        Ok(f(cart))
    }
}

fn recompute(cart: &mut Cart) {
    cart.subtotal = cart.items.iter().map(|i| i.quantity * i.unit_price).sum();
    cart.total =
        cart.subtotal + cart.shipping_methods.iter().map(|m| m.price).sum::<i64>();
}

#[async_trait]
impl PlatformAdapter for MockAdapter {
    async fn search_products(
        &self,
        _store: &ResolvedStore,
        _country_code: &str,
        _query: Option<&str>,
        _limit: i64,
        _credentials: &Credentials,
    ) -> Result<Vec<Product>> {
        self.record("searchProducts");
        Ok(vec![])
    }

    async fn get_product(
        &self,
        _store: &ResolvedStore,
        product_id: &str,
        _country_code: &str,
        _credentials: &Credentials,
    ) -> Result<Product> {
        self.record("getProduct");
        Err(GatewayError::NotFound(format!(
            "Product not found: {product_id}"
        )))
    }

    async fn create_cart(
        &self,
        _store: &ResolvedStore,
        _country_code: &str,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("createCart");
        let cart = self.new_cart();
        self.seed_cart(cart.clone());
        Ok(cart)
    }

    async fn get_cart(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("getCart");
        self.with_cart(cart_id, |c| c.clone())
    }

    async fn get_cart_raw(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        credentials: &Credentials,
    ) -> Result<serde_json::Value> {
        let cart = self.get_cart(store, cart_id, credentials).await?;
        Ok(serde_json::to_value(cart)?)
    }

    async fn add_to_cart(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        variant_id: &str,
        quantity: i64,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("addCartLineItem");
        self.with_cart(cart_id, |cart| {
            cart.items.push(LineItem {
                id: format!("line-{}", cart.items.len() + 1),
                quantity,
                variant_id: variant_id.to_string(),
                product_title: "Mock Product".to_string(),
                unit_price: 2500,
            });
            recompute(cart);
            cart.clone()
        })
    }

    async fn update_cart_item_quantity(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        line_item_id: &str,
        quantity: i64,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("updateCartLineItem");
        self.with_cart(cart_id, |cart| {
            if let Some(item) = cart.items.iter_mut().find(|i| i.id == line_item_id) {
                item.quantity = quantity;
            }
            recompute(cart);
            cart.clone()
        })
    }

    async fn remove_cart_item(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        line_item_id: &str,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("removeCartLineItem");
        self.with_cart(cart_id, |cart| {
            cart.items.retain(|i| i.id != line_item_id);
            recompute(cart);
            cart.clone()
        })
    }

    async fn get_available_countries(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Vec<Country>> {
        let regions = self.get_regions(store, credentials).await?;
        Ok(regions.into_iter().flat_map(|r| r.countries).collect())
    }

    async fn get_regions(
        &self,
        _store: &ResolvedStore,
        _credentials: &Credentials,
    ) -> Result<Vec<Region>> {
        self.record("getRegions");
        Ok(vec![Region {
            id: "region-1".to_string(),
            name: "North America".to_string(),
            currency_code: "usd".to_string(),
            countries: vec![Country {
                code: "us".to_string(),
                name: "United States".to_string(),
                currency_code: "usd".to_string(),
            }],
        }])
    }

    async fn get_cart_shipping_options(
        &self,
        _store: &ResolvedStore,
        _cart_id: &str,
        _credentials: &Credentials,
    ) -> Result<Vec<ShippingOption>> {
        self.record("getCartShippingOptions");
        Ok(vec![ShippingOption {
            id: "so-standard".to_string(),
            name: "Standard".to_string(),
            amount: 500,
        }])
    }

    async fn set_shipping_method(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        shipping_option_id: &str,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("addCartShippingMethod");
        self.with_cart(cart_id, |cart| {
            // Re-selecting the applied option is a no-op, like the backend.
            if !cart
                .shipping_methods
                .iter()
                .any(|m| m.shipping_option_id == shipping_option_id)
            {
                cart.shipping_methods.push(ShippingMethod {
                    id: format!("sm-{}", cart.shipping_methods.len() + 1),
                    shipping_option_id: shipping_option_id.to_string(),
                    price: 500,
                });
            }
            recompute(cart);
            cart.clone()
        })
    }

    async fn current_customer(
        &self,
        store: &ResolvedStore,
        credentials: &Credentials,
    ) -> Result<Option<CustomerIdentity>> {
        self.record("authenticatedItem");
        if credentials.has_user_session(&store.id) {
            Ok(Some(CustomerIdentity {
                id: "user-1".to_string(),
                email: "ada@example.com".to_string(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn customer_email_exists(&self, _store: &ResolvedStore, email: &str) -> Result<bool> {
        self.record("usersCount");
        Ok(self.existing_emails.iter().any(|e| e == email))
    }

    async fn register_guest(
        &self,
        _store: &ResolvedStore,
        email: &str,
        _password: &str,
    ) -> Result<AuthenticatedUser> {
        self.record("createUser");
        Ok(AuthenticatedUser {
            session_token: "guest_tok".to_string(),
            customer: CustomerIdentity {
                id: "user-guest".to_string(),
                email: email.to_string(),
            },
        })
    }

    async fn authenticate_user(
        &self,
        _store: &ResolvedStore,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser> {
        self.record("authenticateUser");
        if password == "correct horse" {
            Ok(AuthenticatedUser {
                session_token: "login_tok".to_string(),
                customer: CustomerIdentity {
                    id: "user-1".to_string(),
                    email: email.to_string(),
                },
            })
        } else {
            Err(GatewayError::AuthenticationFailed)
        }
    }

    async fn connect_cart_to_user(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        _user_id: &str,
        email: &str,
        _credentials: &Credentials,
    ) -> Result<()> {
        self.record("connectCartToUser");
        self.with_cart(cart_id, |cart| {
            cart.email = Some(email.to_string());
        })
    }

    async fn create_address(
        &self,
        _store: &ResolvedStore,
        address: &ShippingAddress,
        _customer_id: &str,
        _credentials: &Credentials,
    ) -> Result<String> {
        self.record("createAddress");
        *self.pending_address.lock().unwrap() = Some(address.clone());
        Ok("addr-1".to_string())
    }

    async fn set_cart_details(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        email: &str,
        _address_id: &str,
        _customer_id: &str,
        _credentials: &Credentials,
    ) -> Result<Cart> {
        self.record("updateCart");
        let address = self.pending_address.lock().unwrap().clone();
        self.with_cart(cart_id, |cart| {
            cart.email = Some(email.to_string());
            cart.shipping_address = address;
            cart.clone()
        })
    }

    async fn get_available_payment_methods(
        &self,
        _store: &ResolvedStore,
        _region_id: &str,
        _credentials: &Credentials,
    ) -> Result<Vec<PaymentMethod>> {
        self.record("getPaymentProviders");
        Ok(vec![
            PaymentMethod {
                id: "pp_system_default".to_string(),
                name: "Manual Payment".to_string(),
            },
            PaymentMethod {
                id: "pp_stripe_stripe".to_string(),
                name: "Stripe".to_string(),
            },
        ])
    }

    async fn initiate_payment_session(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        provider_id: &str,
        _credentials: &Credentials,
    ) -> Result<PaymentSession> {
        self.record("initiatePaymentSession");
        let session = PaymentSession {
            id: "ps-1".to_string(),
            provider_id: provider_id.to_string(),
            status: PaymentSessionStatus::Pending,
            is_selected: true,
            amount: 5500,
            data: serde_json::Value::Null,
        };
        self.with_cart(cart_id, |cart| {
            cart.payment_sessions.push(session.clone());
        })?;
        Ok(session)
    }

    async fn complete_cart(
        &self,
        _store: &ResolvedStore,
        cart_id: &str,
        _payment_session_id: &str,
        _credentials: &Credentials,
    ) -> Result<Order> {
        self.record("completeCart");
        let total = self.with_cart(cart_id, |cart| {
            cart.completed_at = Some(chrono::Utc::now());
            cart.total
        })?;
        Ok(Order {
            id: "order-1".to_string(),
            status: "pending".to_string(),
            total,
            currency_code: "usd".to_string(),
            secret_key: Some("sk_guest".to_string()),
            country_code: Some("us".to_string()),
        })
    }

    async fn get_store_info(
        &self,
        _store: &ResolvedStore,
        _credentials: &Credentials,
    ) -> Result<StoreInfo> {
        self.record("getStoreInfo");
        Ok(StoreInfo {
            name: "Mock Store".to_string(),
            logo: None,
            payment_providers: vec![],
        })
    }

    fn build_checkout_link(
        &self,
        store: &ResolvedStore,
        cart_id: &str,
        country_code: &str,
    ) -> String {
        format!("{}/{country_code}/checkout?cart={cart_id}", store.base_url)
    }
}

struct Harness {
    state: AppState,
    adapter: Arc<MockAdapter>,
}

impl Harness {
    fn new(adapter: MockAdapter) -> Self {
        let adapter = Arc::new(adapter);
        let registry = AdapterRegistry::empty();
        registry.insert_instance(
            Platform::Openfront,
            Arc::clone(&adapter) as Arc<dyn PlatformAdapter>,
        );
        let config = GatewayConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            stores: vec![StoreConfig {
                base_url: "https://shop.example.com".to_string(),
                platform: Platform::Openfront,
            }],
            upstream_timeout: std::time::Duration::from_secs(5),
            sentry_dsn: None,
            sentry_environment: None,
        };
        Self {
            state: AppState::with_registry(config, registry),
            adapter,
        }
    }

    async fn call_tool_with_ctx(
        &self,
        ctx: &RequestContext,
        name: &str,
        arguments: serde_json::Value,
    ) -> (marketplace_gateway::protocol::JsonRpcResponse, bool) {
        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments },
        }))
        .unwrap();
        rpc::handle_request(&self.state, ctx, request).await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> (marketplace_gateway::protocol::JsonRpcResponse, bool) {
        self.call_tool_with_ctx(&RequestContext::default(), name, arguments)
            .await
    }
}

fn address_args() -> serde_json::Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "address1": "1 Analytical Way",
        "city": "London",
        "postalCode": "N1 9GU",
        "countryCode": "us",
    })
}

#[tokio::test]
async fn quantity_out_of_bounds_makes_no_backend_call() {
    let harness = Harness::new(MockAdapter::default());

    for quantity in [0, -5, 1001] {
        let (resp, mutated) = harness
            .call_tool(
                "addToCart",
                json!({
                    "storeId": "store-1",
                    "cartId": "cart-1",
                    "variantId": "variant-1",
                    "quantity": quantity,
                }),
            )
            .await;
        assert!(!mutated);
        let error = resp.error.expect("quantity must be rejected");
        assert_eq!(error.code, -32602);
    }

    assert!(
        harness.adapter.calls().is_empty(),
        "bounds are enforced before any backend traffic"
    );
}

#[tokio::test]
async fn email_conflict_creates_nothing_and_mutates_nothing() {
    let harness = Harness::new(MockAdapter::with_existing_emails(&["taken@example.com"]));
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-1".to_string();
        cart
    });

    let (resp, mutated) = harness
        .call_tool(
            "setShippingAddress",
            json!({
                "storeId": "store-1",
                "cartId": "cart-1",
                "email": "taken@example.com",
                "address": address_args(),
            }),
        )
        .await;

    assert!(!mutated);
    let result = resp.result.expect("conflict is an alternate success");
    assert_eq!(result["emailConflict"], true);
    assert_eq!(result["email"], "taken@example.com");

    let calls = harness.adapter.calls();
    assert!(!calls.contains(&"createUser".to_string()), "no guest account");
    assert!(!calls.contains(&"createAddress".to_string()));
    assert!(!calls.contains(&"updateCart".to_string()), "cart untouched");
}

#[tokio::test]
async fn payment_session_on_unready_cart_skips_the_provider() {
    let harness = Harness::new(MockAdapter::default());
    // Items but no address or shipping method.
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-1".to_string();
        cart.items.push(LineItem {
            id: "line-1".to_string(),
            quantity: 1,
            variant_id: "variant-1".to_string(),
            product_title: "Mock Product".to_string(),
            unit_price: 2500,
        });
        cart
    });

    let (resp, mutated) = harness
        .call_tool(
            "initiatePaymentSession",
            json!({ "storeId": "store-1", "cartId": "cart-1", "provider": "stripe" }),
        )
        .await;

    assert!(!mutated);
    let result = resp.result.expect("not-ready is a structured result");
    assert_eq!(result["ready"], false);
    let steps: Vec<&str> = result["missing"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["step"].as_str().unwrap())
        .collect();
    assert!(steps.contains(&"no_shipping_address"));
    assert!(steps.contains(&"no_shipping_method"));

    let calls = harness.adapter.calls();
    assert!(!calls.contains(&"getPaymentProviders".to_string()));
    assert!(!calls.contains(&"initiatePaymentSession".to_string()));
}

#[tokio::test]
async fn completed_cart_is_replaced_not_reused() {
    let harness = Harness::new(MockAdapter::default());
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-done".to_string();
        cart.completed_at = Some(chrono::Utc::now());
        cart
    });

    let ctx = RequestContext::new(
        Credentials::default(),
        HashMap::from([("store-1".to_string(), "cart-done".to_string())]),
        None,
    );
    let (resp, mutated) = harness
        .call_tool_with_ctx(
            &ctx,
            "getOrCreateCart",
            json!({ "storeId": "store-1", "countryCode": "us" }),
        )
        .await;

    assert!(mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["saveCartId"], true);
    assert_ne!(result["cart"]["id"], "cart-done");
}

#[tokio::test]
async fn existing_open_cart_is_reused() {
    let harness = Harness::new(MockAdapter::default());
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-open".to_string();
        cart
    });

    let ctx = RequestContext::new(
        Credentials::default(),
        HashMap::from([("store-1".to_string(), "cart-open".to_string())]),
        None,
    );
    let (resp, mutated) = harness
        .call_tool_with_ctx(&ctx, "getOrCreateCart", json!({ "storeId": "store-1" }))
        .await;

    assert!(!mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["saveCartId"], false);
    assert_eq!(result["cart"]["id"], "cart-open");
    assert!(!harness.adapter.calls().contains(&"createCart".to_string()));
}

#[tokio::test]
async fn new_cart_reads_back_empty_with_created_currency() {
    let harness = Harness::new(MockAdapter::default());

    let (resp, _) = harness
        .call_tool(
            "createCart",
            json!({ "storeId": "store-1", "countryCode": "us" }),
        )
        .await;
    let cart_id = resp.result.unwrap()["cart"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (resp, mutated) = harness
        .call_tool("getCart", json!({ "storeId": "store-1", "cartId": cart_id }))
        .await;
    assert!(!mutated);
    let cart = &resp.result.unwrap()["cart"];
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
    assert_eq!(cart["currencyCode"], "usd");
}

#[tokio::test]
async fn reselecting_the_same_shipping_option_adds_no_duplicate() {
    let harness = Harness::new(MockAdapter::default());
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-1".to_string();
        cart
    });

    let args = json!({
        "storeId": "store-1",
        "cartId": "cart-1",
        "shippingOptionId": "so-standard",
    });
    let (first, _) = harness.call_tool("setShippingMethod", args.clone()).await;
    let (second, _) = harness.call_tool("setShippingMethod", args).await;

    let first = first.result.unwrap();
    let second = second.result.unwrap();
    let methods = second["cart"]["shippingMethods"].as_array().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(first["cart"]["shippingMethods"], second["cart"]["shippingMethods"]);
}

#[tokio::test]
async fn cookie_authenticated_shopper_is_resolved_not_conflicted() {
    let harness = Harness::new(MockAdapter::with_existing_emails(&["ada@example.com"]));
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-1".to_string();
        cart
    });

    let ctx = RequestContext::new(
        Credentials::new(Some("session=abc".to_string()), None, HashMap::new()),
        HashMap::new(),
        None,
    );
    let (resp, mutated) = harness
        .call_tool_with_ctx(
            &ctx,
            "setShippingAddress",
            json!({
                "storeId": "store-1",
                "cartId": "cart-1",
                "email": "ada@example.com",
                "address": address_args(),
            }),
        )
        .await;

    assert!(mutated);
    let result = resp.result.unwrap();
    assert!(result.get("emailConflict").is_none());
    assert_eq!(result["cart"]["email"], "ada@example.com");

    // The identity came from the cookie session, not a fresh guest account.
    let calls = harness.adapter.calls();
    assert!(calls.contains(&"authenticatedItem".to_string()));
    assert!(!calls.contains(&"usersCount".to_string()));
    assert!(!calls.contains(&"createUser".to_string()));
}

#[tokio::test]
async fn open_payment_session_is_reused_not_duplicated() {
    let harness = Harness::new(MockAdapter::default());
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-ready".to_string();
        cart.items.push(LineItem {
            id: "line-1".to_string(),
            quantity: 1,
            variant_id: "variant-1".to_string(),
            product_title: "Mock Product".to_string(),
            unit_price: 2500,
        });
        cart.shipping_address = Some(ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address_1: "1 Analytical Way".to_string(),
            address_2: None,
            city: "London".to_string(),
            province: None,
            postal_code: "N1 9GU".to_string(),
            country_code: "us".to_string(),
            phone: None,
        });
        cart.shipping_methods.push(ShippingMethod {
            id: "sm-1".to_string(),
            shipping_option_id: "so-standard".to_string(),
            price: 500,
        });
        cart.payment_sessions.push(PaymentSession {
            id: "ps-open".to_string(),
            provider_id: "pp_stripe_stripe".to_string(),
            status: PaymentSessionStatus::Pending,
            is_selected: true,
            amount: 3000,
            data: serde_json::Value::Null,
        });
        cart
    });

    let (resp, mutated) = harness
        .call_tool(
            "initiatePaymentSession",
            json!({ "storeId": "store-1", "cartId": "cart-ready", "provider": "stripe" }),
        )
        .await;

    assert!(!mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["reused"], true);
    assert_eq!(result["paymentSession"]["id"], "ps-open");
    assert!(
        !harness
            .adapter
            .calls()
            .contains(&"initiatePaymentSession".to_string()),
        "no duplicate session opened with the provider"
    );
}

#[tokio::test]
async fn login_links_cart_and_echoes_pending_address() {
    let harness = Harness::new(MockAdapter::default());
    harness.adapter.seed_cart({
        let mut cart = harness.adapter.new_cart();
        cart.id = "cart-1".to_string();
        cart
    });

    let (resp, mutated) = harness
        .call_tool(
            "loginUser",
            json!({
                "storeId": "store-1",
                "email": "ada@example.com",
                "password": "correct horse",
                "cartId": "cart-1",
                "pendingAddress": address_args(),
            }),
        )
        .await;

    assert!(mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["sessionToken"], "login_tok");
    assert_eq!(result["saveSessionToken"], true);
    assert_eq!(result["cartLinked"], true);
    assert_eq!(result["pendingAddress"]["firstName"], "Ada");
}

#[tokio::test]
async fn login_with_bad_password_is_invalid_params() {
    let harness = Harness::new(MockAdapter::default());
    let (resp, _) = harness
        .call_tool(
            "loginUser",
            json!({
                "storeId": "store-1",
                "email": "ada@example.com",
                "password": "wrong",
            }),
        )
        .await;
    assert_eq!(resp.error.unwrap().code, -32602);
}

#[tokio::test]
async fn unknown_store_enumerates_valid_ids() {
    let harness = Harness::new(MockAdapter::default());
    let (resp, _) = harness
        .call_tool("getCart", json!({ "storeId": "store-9", "cartId": "cart-1" }))
        .await;
    let error = resp.error.unwrap();
    assert_eq!(error.code, -32602);
    assert!(error.message.contains("store-1"));
}

#[tokio::test]
async fn end_to_end_guest_checkout() {
    let harness = Harness::new(MockAdapter::default());

    // New cart, caller told to persist the id.
    let (resp, mutated) = harness
        .call_tool(
            "getOrCreateCart",
            json!({ "storeId": "store-1", "countryCode": "us" }),
        )
        .await;
    assert!(mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["saveCartId"], true);
    let cart_id = result["cart"]["id"].as_str().unwrap().to_string();
    assert_eq!(result["cart"]["items"].as_array().unwrap().len(), 0);

    // Add two units of a variant.
    let (resp, mutated) = harness
        .call_tool(
            "addToCart",
            json!({
                "storeId": "store-1",
                "cartId": cart_id,
                "variantId": "variant-1",
                "quantity": 2,
            }),
        )
        .await;
    assert!(mutated);
    let cart = &resp.result.unwrap()["cart"];
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 2);

    // Fresh email: guest bootstrap, caller told to persist the token.
    let (resp, mutated) = harness
        .call_tool(
            "setShippingAddress",
            json!({
                "storeId": "store-1",
                "cartId": cart_id,
                "email": "fresh@example.com",
                "address": address_args(),
            }),
        )
        .await;
    assert!(mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["saveSessionToken"], true);
    assert_eq!(result["sessionToken"], "guest_tok");
    assert_eq!(result["cart"]["email"], "fresh@example.com");
    assert!(result["cart"]["shippingAddress"].is_object());
    let calls = harness.adapter.calls();
    assert!(calls.contains(&"createUser".to_string()));

    // Payment without a shipping method: structured validation failure.
    let (resp, mutated) = harness
        .call_tool(
            "initiatePaymentSession",
            json!({ "storeId": "store-1", "cartId": cart_id, "provider": "stripe" }),
        )
        .await;
    assert!(!mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["ready"], false);
    let steps: Vec<&str> = result["missing"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["step"].as_str().unwrap())
        .collect();
    assert_eq!(steps, vec!["no_shipping_method"]);

    // Select shipping, open the session, complete the order.
    let (_, mutated) = harness
        .call_tool(
            "setShippingMethod",
            json!({
                "storeId": "store-1",
                "cartId": cart_id,
                "shippingOptionId": "so-standard",
            }),
        )
        .await;
    assert!(mutated);

    let (resp, mutated) = harness
        .call_tool(
            "initiatePaymentSession",
            json!({ "storeId": "store-1", "cartId": cart_id, "provider": "stripe" }),
        )
        .await;
    assert!(mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["ready"], true);
    assert_eq!(result["reused"], false);
    let session_id = result["paymentSession"]["id"].as_str().unwrap().to_string();

    let (resp, mutated) = harness
        .call_tool(
            "completeCart",
            json!({
                "storeId": "store-1",
                "cartId": cart_id,
                "paymentSessionId": session_id,
            }),
        )
        .await;
    assert!(mutated);
    let result = resp.result.unwrap();
    assert_eq!(result["order"]["id"], "order-1");
    assert_eq!(
        result["redirectUrl"],
        "https://shop.example.com/us/order/confirmed/order-1?secret_key=sk_guest"
    );
}
