//! GraphQL documents and variable types for the openfront backend.
//!
//! Documents are fixed strings; all caller data travels through GraphQL
//! variables, never through string interpolation into the query text. Each
//! document pairs with a `Serialize` variables struct and a `Deserialize`
//! data struct in [`super::types`].

use marketplace_core::ShippingAddress;
use serde::Serialize;

/// The cart selection shared by every cart-returning operation.
macro_rules! cart_selection {
    () => {
        "{ id email completedAt subtotal total currencyCode region { id } \
lineItems { id quantity title unitPrice productVariant { id } } \
shippingAddress { firstName lastName address1 address2 city province postalCode countryCode phone } \
shippingMethods { id shippingOptionId price } \
paymentSessions { id providerId status isSelected amount data } }"
    };
}

/// The product selection shared by search and single-product lookup.
macro_rules! product_selection {
    () => {
        "{ id title handle thumbnail description \
productVariants { id title sku price(countryCode: $countryCode) currencyCode(countryCode: $countryCode) \
inventoryQuantity allowBackorder options { name value } } }"
    };
}

// =============================================================================
// Catalogue
// =============================================================================

pub const SEARCH_PRODUCTS: &str = concat!(
    "query SearchProducts($search: String, $take: Int!, $countryCode: String!) \
{ products(search: $search, take: $take) ",
    product_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductsVars<'a> {
    pub search: Option<&'a str>,
    pub take: i64,
    pub country_code: &'a str,
}

pub const GET_PRODUCT: &str = concat!(
    "query GetProduct($id: ID!, $countryCode: String!) { product(where: { id: $id }) ",
    product_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductVars<'a> {
    pub id: &'a str,
    pub country_code: &'a str,
}

// =============================================================================
// Regions
// =============================================================================

pub const GET_REGIONS: &str = "query GetRegions \
{ regions { id name currencyCode countries { iso2 displayName } } }";

#[derive(Debug, Serialize)]
pub struct NoVars {}

// =============================================================================
// Cart lifecycle
// =============================================================================

pub const CREATE_CART: &str = concat!(
    "mutation CreateCart($regionId: ID!) \
{ createCart(data: { region: { connect: { id: $regionId } } }) ",
    cart_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartVars<'a> {
    pub region_id: &'a str,
}

pub const GET_CART: &str = concat!(
    "query GetCart($cartId: ID!) { cart(where: { id: $cartId }) ",
    cart_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCartVars<'a> {
    pub cart_id: &'a str,
}

pub const ADD_CART_LINE_ITEM: &str = concat!(
    "mutation AddCartLineItem($cartId: ID!, $variantId: ID!, $quantity: Int!) \
{ addCartLineItem(cartId: $cartId, productVariantId: $variantId, quantity: $quantity) ",
    cart_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartLineItemVars<'a> {
    pub cart_id: &'a str,
    pub variant_id: &'a str,
    pub quantity: i64,
}

pub const UPDATE_CART_LINE_ITEM: &str = concat!(
    "mutation UpdateCartLineItem($cartId: ID!, $lineId: ID!, $quantity: Int!) \
{ updateCartLineItem(cartId: $cartId, lineId: $lineId, quantity: $quantity) ",
    cart_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLineItemVars<'a> {
    pub cart_id: &'a str,
    pub line_id: &'a str,
    pub quantity: i64,
}

pub const REMOVE_CART_LINE_ITEM: &str = concat!(
    "mutation RemoveCartLineItem($cartId: ID!, $lineId: ID!) \
{ removeCartLineItem(cartId: $cartId, lineId: $lineId) ",
    cart_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartLineItemVars<'a> {
    pub cart_id: &'a str,
    pub line_id: &'a str,
}

pub const UPDATE_CART: &str = concat!(
    "mutation UpdateCart($cartId: ID!, $data: CartUpdateInput!) \
{ updateCart(where: { id: $cartId }, data: $data) ",
    cart_selection!(),
    " }"
);

/// Partial cart update; only the present fields change.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ConnectById<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<ConnectById<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ConnectById<'a>>,
}

#[derive(Debug, Serialize)]
pub struct UpdateCartVars<'a> {
    #[serde(rename = "cartId")]
    pub cart_id: &'a str,
    pub data: CartUpdateData<'a>,
}

/// Keystone-style relationship connect input.
#[derive(Debug, Serialize)]
pub struct ConnectById<'a> {
    pub connect: IdRef<'a>,
}

#[derive(Debug, Serialize)]
pub struct IdRef<'a> {
    pub id: &'a str,
}

impl<'a> ConnectById<'a> {
    #[must_use]
    pub const fn new(id: &'a str) -> Self {
        Self {
            connect: IdRef { id },
        }
    }
}

// =============================================================================
// Shipping
// =============================================================================

pub const GET_CART_SHIPPING_OPTIONS: &str = "query GetCartShippingOptions($cartId: ID!) \
{ cartShippingOptions(cartId: $cartId) { id name amount } }";

pub const ADD_CART_SHIPPING_METHOD: &str = concat!(
    "mutation AddCartShippingMethod($cartId: ID!, $optionId: ID!) \
{ addCartShippingMethod(cartId: $cartId, shippingOptionId: $optionId) ",
    cart_selection!(),
    " }"
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddShippingMethodVars<'a> {
    pub cart_id: &'a str,
    pub option_id: &'a str,
}

// =============================================================================
// Identity
// =============================================================================

pub const AUTHENTICATED_ITEM: &str = "query AuthenticatedItem \
{ authenticatedItem { ... on User { id email } } }";

pub const USER_EMAIL_EXISTS: &str = "query UserEmailExists($email: String!) \
{ usersCount(where: { email: { equals: $email, mode: insensitive } }) }";

#[derive(Debug, Serialize)]
pub struct EmailVars<'a> {
    pub email: &'a str,
}

pub const CREATE_USER: &str = "mutation CreateUser($email: String!, $password: String!) \
{ createUser(data: { email: $email, password: $password }) { id email } }";

pub const AUTHENTICATE_USER: &str =
    "mutation AuthenticateUser($email: String!, $password: String!) \
{ authenticateUserWithPassword(email: $email, password: $password) \
{ ... on UserAuthenticationWithPasswordSuccess { sessionToken item { id email } } \
... on UserAuthenticationWithPasswordFailure { message } } }";

#[derive(Debug, Serialize)]
pub struct AuthenticateVars<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

pub const CREATE_ADDRESS: &str = "mutation CreateAddress($data: AddressCreateInput!) \
{ createAddress(data: $data) { id } }";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCreateData<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub address_1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_2: Option<&'a str>,
    pub city: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<&'a str>,
    pub postal_code: &'a str,
    pub country_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    pub user: ConnectById<'a>,
}

impl<'a> AddressCreateData<'a> {
    #[must_use]
    pub fn from_address(address: &'a ShippingAddress, customer_id: &'a str) -> Self {
        Self {
            first_name: &address.first_name,
            last_name: &address.last_name,
            address_1: &address.address_1,
            address_2: address.address_2.as_deref(),
            city: &address.city,
            province: address.province.as_deref(),
            postal_code: &address.postal_code,
            country_code: &address.country_code,
            phone: address.phone.as_deref(),
            user: ConnectById::new(customer_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateAddressVars<'a> {
    pub data: AddressCreateData<'a>,
}

// =============================================================================
// Payment and completion
// =============================================================================

pub const GET_PAYMENT_PROVIDERS: &str = "query GetPaymentProviders($regionId: ID!) \
{ paymentProviders(regionId: $regionId) { id name } }";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionIdVars<'a> {
    pub region_id: &'a str,
}

pub const INITIATE_PAYMENT_SESSION: &str =
    "mutation InitiatePaymentSession($cartId: ID!, $providerId: ID!) \
{ initiatePaymentSession(cartId: $cartId, paymentProviderId: $providerId) \
{ id providerId status isSelected amount data } }";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentSessionVars<'a> {
    pub cart_id: &'a str,
    pub provider_id: &'a str,
}

pub const COMPLETE_CART: &str =
    "mutation CompleteCart($cartId: ID!, $paymentSessionId: ID!) \
{ completeCart(cartId: $cartId, paymentSessionId: $paymentSessionId) \
{ id status total currencyCode secretKey shippingAddress { countryCode } } }";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCartVars<'a> {
    pub cart_id: &'a str,
    pub payment_session_id: &'a str,
}

// =============================================================================
// Store metadata
// =============================================================================

pub const GET_STORE_INFO: &str = "query GetStoreInfo \
{ store { name logo paymentProviders { id name } } }";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_use_variables_not_interpolation() {
        // Every caller-supplied value must arrive via $variables.
        for doc in [
            SEARCH_PRODUCTS,
            GET_PRODUCT,
            CREATE_CART,
            GET_CART,
            ADD_CART_LINE_ITEM,
            UPDATE_CART,
            AUTHENTICATE_USER,
            COMPLETE_CART,
        ] {
            assert!(!doc.contains("{}"), "format placeholder in document: {doc}");
        }
        assert!(GET_CART.contains("$cartId"));
        assert!(AUTHENTICATE_USER.contains("$password"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_cart_update_data_omits_absent_fields() {
        let data = CartUpdateData {
            email: Some("ada@example.com"),
            ..CartUpdateData::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "ada@example.com" }));
    }
}
