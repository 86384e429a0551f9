//! Product catalogue tools.

use futures::future::join_all;
use serde_json::{Value, json};
use tracing::instrument;

use super::{ToolOutcome, optional_i64, optional_str, required_str};
use crate::context::RequestContext;
use crate::error::{GatewayError, Result};
use crate::state::AppState;

pub const TOOL_NAMES: &[&str] = &["searchProducts", "getProduct", "discoverProducts"];

const DEFAULT_COUNTRY: &str = "us";
const DEFAULT_LIMIT: i64 = 10;

#[must_use]
pub fn descriptors() -> Vec<Value> {
    vec![
        json!({
            "name": "searchProducts",
            "description": "Search one store's product catalogue. Returns normalized products with variants and minor-unit prices.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "storeId": { "type": "string", "description": "Store id from getAvailableStores" },
                    "query": { "type": "string", "description": "Free-text search; omit to list products" },
                    "countryCode": { "type": "string", "description": "Lowercase ISO country code for pricing (default: us)" },
                    "limit": { "type": "number", "description": "Maximum number of products (default: 10)" }
                },
                "required": ["storeId"]
            }
        }),
        json!({
            "name": "getProduct",
            "description": "Get one product by id, including all variants and their prices.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "storeId": { "type": "string" },
                    "productId": { "type": "string" },
                    "countryCode": { "type": "string", "description": "Lowercase ISO country code for pricing (default: us)" }
                },
                "required": ["storeId", "productId"]
            }
        }),
        json!({
            "name": "discoverProducts",
            "description": "Search every configured store at once. Stores that fail or time out are omitted from the result.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Free-text search; omit to sample each catalogue" },
                    "countryCode": { "type": "string", "description": "Lowercase ISO country code for pricing (default: us)" },
                    "limit": { "type": "number", "description": "Maximum products per store (default: 10)" }
                },
                "required": []
            }
        }),
    ]
}

#[instrument(skip(state, ctx, arguments))]
pub async fn call(
    state: &AppState,
    ctx: &RequestContext,
    name: &str,
    arguments: &Value,
) -> Result<ToolOutcome> {
    match name {
        "searchProducts" => search_products(state, ctx, arguments).await,
        "getProduct" => get_product(state, ctx, arguments).await,
        "discoverProducts" => discover_products(state, ctx, arguments).await,
        other => Err(GatewayError::UnknownTool(other.to_string())),
    }
}

async fn search_products(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let store_id = required_str(arguments, "storeId")?;
    let query = optional_str(arguments, "query");
    let country = optional_str(arguments, "countryCode").unwrap_or(DEFAULT_COUNTRY);
    let limit = optional_i64(arguments, "limit").unwrap_or(DEFAULT_LIMIT);

    let (store, adapter) = super::resolve_store(state, ctx, store_id)?;
    let products = adapter
        .search_products(&store, country, query, limit, &ctx.credentials)
        .await?;
    Ok(ToolOutcome::read(json!({ "products": products })))
}

async fn get_product(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let store_id = required_str(arguments, "storeId")?;
    let product_id = required_str(arguments, "productId")?;
    let country = optional_str(arguments, "countryCode").unwrap_or(DEFAULT_COUNTRY);

    let (store, adapter) = super::resolve_store(state, ctx, store_id)?;
    let product = adapter
        .get_product(&store, product_id, country, &ctx.credentials)
        .await?;
    Ok(ToolOutcome::read(serde_json::to_value(product)?))
}

/// Fan out the search to every store concurrently. A store that errors is
/// logged and dropped; one unreachable backend must not empty the aggregate.
async fn discover_products(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let query = optional_str(arguments, "query");
    let country = optional_str(arguments, "countryCode").unwrap_or(DEFAULT_COUNTRY);
    let limit = optional_i64(arguments, "limit").unwrap_or(DEFAULT_LIMIT);

    let registry = super::registry(state, ctx);
    let searches = registry.all().iter().map(|store| async {
        let adapter = state.adapters().get(store.platform)?;
        let products = adapter
            .search_products(store, country, query, limit, &ctx.credentials)
            .await?;
        Ok::<_, GatewayError>((store.id.clone(), products))
    });

    let mut results = Vec::new();
    for (store, outcome) in registry.all().iter().zip(join_all(searches).await) {
        match outcome {
            Ok((store_id, products)) => {
                results.push(json!({ "storeId": store_id, "products": products }));
            }
            Err(error) => {
                tracing::warn!(store = %store.id, %error, "Store omitted from discovery");
            }
        }
    }

    Ok(ToolOutcome::read(json!({ "results": results })))
}
