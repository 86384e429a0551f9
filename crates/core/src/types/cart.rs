//! Cart model and checkout-readiness validation.
//!
//! Carts are owned by the backend store; the gateway only holds this
//! projection for the duration of one request/response cycle. Checkout state
//! is derived from which fields are present on the cart, not from an explicit
//! status field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::checkout::ShippingAddress;

/// Maximum quantity accepted for a single line item.
///
/// Enforced by the gateway before any backend call so an agent typo cannot
/// place a warehouse-sized order.
pub const MAX_LINE_QUANTITY: i64 = 1000;

/// Error for a line-item quantity outside the accepted bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Quantity must be at least 1 (got {0})")]
    TooSmall(i64),
    #[error("Quantity must not exceed {MAX_LINE_QUANTITY} (got {0})")]
    TooLarge(i64),
}

/// Validate a line-item quantity against the gateway bounds.
///
/// # Errors
///
/// Returns a `QuantityError` if the quantity is non-positive or exceeds
/// [`MAX_LINE_QUANTITY`].
pub const fn validate_quantity(quantity: i64) -> Result<(), QuantityError> {
    if quantity < 1 {
        return Err(QuantityError::TooSmall(quantity));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(QuantityError::TooLarge(quantity));
    }
    Ok(())
}

/// A cart as exposed to the calling agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub items: Vec<LineItem>,
    /// Subtotal in minor units, before shipping and tax.
    pub subtotal: i64,
    /// Total in minor units.
    pub total: i64,
    pub currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_sessions: Vec<PaymentSession>,
    /// Set once the cart has been completed into an order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A line item belonging to exactly one cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub quantity: i64,
    pub variant_id: String,
    pub product_title: String,
    /// Unit price in minor units.
    pub unit_price: i64,
}

/// A shipping method already applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub id: String,
    pub shipping_option_id: String,
    /// Price in minor units.
    pub price: i64,
}

/// Lifecycle state of a payment session as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSessionStatus {
    Pending,
    Authorized,
    RequiresMore,
    Error,
    Canceled,
}

/// A payment-provider session attached to a cart.
///
/// Ephemeral: exists only for the duration of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub id: String,
    pub provider_id: String,
    pub status: PaymentSessionStatus,
    pub is_selected: bool,
    /// Amount in minor units.
    pub amount: i64,
    /// Opaque provider payload (e.g. a Stripe client secret envelope).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// A checkout step the cart has not completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutGap {
    NoItems,
    NoShippingAddress,
    NoShippingMethod,
}

impl CheckoutGap {
    /// Human-readable fix-it message for the calling agent.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoItems => "Cart has no items",
            Self::NoShippingAddress => "No shipping address has been set",
            Self::NoShippingMethod => "No shipping method has been selected",
        }
    }
}

impl Cart {
    /// Whether the backend has already turned this cart into an order.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Checkout steps still missing before a payment session may be opened.
    ///
    /// Empty means the cart is ready for payment.
    #[must_use]
    pub fn checkout_gaps(&self) -> Vec<CheckoutGap> {
        let mut gaps = Vec::new();
        if self.items.is_empty() {
            gaps.push(CheckoutGap::NoItems);
        }
        if self.shipping_address.is_none() {
            gaps.push(CheckoutGap::NoShippingAddress);
        }
        if self.shipping_methods.is_empty() {
            gaps.push(CheckoutGap::NoShippingMethod);
        }
        gaps
    }

    /// Find an existing selected, non-errored session for a provider.
    ///
    /// Used to keep `initiatePaymentSession` idempotent: re-requesting the
    /// same provider reuses the open session instead of opening a duplicate
    /// with the payment provider.
    #[must_use]
    pub fn reusable_session(&self, provider_id: &str) -> Option<&PaymentSession> {
        self.payment_sessions.iter().find(|s| {
            s.is_selected
                && s.provider_id == provider_id
                && !matches!(
                    s.status,
                    PaymentSessionStatus::Error | PaymentSessionStatus::Canceled
                )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cart() -> Cart {
        Cart {
            id: "cart-1".to_string(),
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

    fn line_item() -> LineItem {
        LineItem {
            id: "line-1".to_string(),
            quantity: 2,
            variant_id: "variant-1".to_string(),
            product_title: "Pineapple Tee".to_string(),
            unit_price: 2500,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address_1: "1 Analytical Way".to_string(),
            address_2: None,
            city: "London".to_string(),
            province: None,
            postal_code: "N1 9GU".to_string(),
            country_code: "gb".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert_eq!(validate_quantity(0), Err(QuantityError::TooSmall(0)));
        assert_eq!(validate_quantity(-3), Err(QuantityError::TooSmall(-3)));
        assert_eq!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(QuantityError::TooLarge(MAX_LINE_QUANTITY + 1))
        );
    }

    #[test]
    fn test_checkout_gaps_empty_cart() {
        let gaps = empty_cart().checkout_gaps();
        assert_eq!(
            gaps,
            vec![
                CheckoutGap::NoItems,
                CheckoutGap::NoShippingAddress,
                CheckoutGap::NoShippingMethod
            ]
        );
    }

    #[test]
    fn test_checkout_gaps_missing_method_only() {
        let mut cart = empty_cart();
        cart.items.push(line_item());
        cart.shipping_address = Some(address());
        assert_eq!(cart.checkout_gaps(), vec![CheckoutGap::NoShippingMethod]);
    }

    #[test]
    fn test_checkout_gaps_ready() {
        let mut cart = empty_cart();
        cart.items.push(line_item());
        cart.shipping_address = Some(address());
        cart.shipping_methods.push(ShippingMethod {
            id: "sm-1".to_string(),
            shipping_option_id: "so-1".to_string(),
            price: 500,
        });
        assert!(cart.checkout_gaps().is_empty());
    }

    #[test]
    fn test_reusable_session_skips_errored() {
        let mut cart = empty_cart();
        cart.payment_sessions.push(PaymentSession {
            id: "ps-1".to_string(),
            provider_id: "pp_stripe".to_string(),
            status: PaymentSessionStatus::Error,
            is_selected: true,
            amount: 5500,
            data: serde_json::Value::Null,
        });
        assert!(cart.reusable_session("pp_stripe").is_none());

        cart.payment_sessions.push(PaymentSession {
            id: "ps-2".to_string(),
            provider_id: "pp_stripe".to_string(),
            status: PaymentSessionStatus::Pending,
            is_selected: true,
            amount: 5500,
            data: serde_json::Value::Null,
        });
        assert_eq!(
            cart.reusable_session("pp_stripe").map(|s| s.id.as_str()),
            Some("ps-2")
        );
    }

    #[test]
    fn test_reusable_session_requires_selected() {
        let mut cart = empty_cart();
        cart.payment_sessions.push(PaymentSession {
            id: "ps-1".to_string(),
            provider_id: "pp_stripe".to_string(),
            status: PaymentSessionStatus::Pending,
            is_selected: false,
            amount: 5500,
            data: serde_json::Value::Null,
        });
        assert!(cart.reusable_session("pp_stripe").is_none());
    }

    #[test]
    fn test_is_completed() {
        let mut cart = empty_cart();
        assert!(!cart.is_completed());
        cart.completed_at = Some(Utc::now());
        assert!(cart.is_completed());
    }
}
