//! Normalized commerce types shared across the gateway.
//!
//! All monetary amounts are integer minor units (e.g. cents for USD) paired
//! with an ISO 4217 currency code, matching what the backend stores return.

pub mod cart;
pub mod checkout;
pub mod product;
pub mod region;
pub mod store;

pub use cart::{
    Cart, CheckoutGap, LineItem, MAX_LINE_QUANTITY, PaymentSession, PaymentSessionStatus,
    QuantityError, ShippingMethod, validate_quantity,
};
pub use checkout::{Order, PaymentMethod, ShippingAddress, ShippingOption, StoreInfo};
pub use product::{Product, ProductVariant, VariantOption};
pub use region::{Country, Region};
pub use store::{Platform, PlatformError, ResolvedStore, StoreConfig};
