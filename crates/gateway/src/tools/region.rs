//! Region, country, and payment-method lookup tools.

use serde_json::{Value, json};
use tracing::instrument;

use super::{ToolOutcome, optional_str, required_str};
use crate::context::RequestContext;
use crate::error::{GatewayError, Result};
use crate::state::AppState;

pub const TOOL_NAMES: &[&str] = &[
    "getAvailableCountries",
    "getAvailableRegions",
    "getAvailablePaymentMethods",
];

#[must_use]
pub fn descriptors() -> Vec<Value> {
    vec![
        json!({
            "name": "getAvailableCountries",
            "description": "List the countries a store ships to, sorted by name, with their currencies.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "storeId": { "type": "string" }
                },
                "required": ["storeId"]
            }
        }),
        json!({
            "name": "getAvailableRegions",
            "description": "List a store's backend regions and the countries each covers.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "storeId": { "type": "string" }
                },
                "required": ["storeId"]
            }
        }),
        json!({
            "name": "getAvailablePaymentMethods",
            "description": "List the payment providers available for a country's region in a store.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "storeId": { "type": "string" },
                    "countryCode": { "type": "string", "description": "Lowercase ISO country code (default: us)" }
                },
                "required": ["storeId"]
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
        "getAvailableCountries" => get_available_countries(state, ctx, arguments).await,
        "getAvailableRegions" => get_available_regions(state, ctx, arguments).await,
        "getAvailablePaymentMethods" => get_available_payment_methods(state, ctx, arguments).await,
        other => Err(GatewayError::UnknownTool(other.to_string())),
    }
}

async fn get_available_countries(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let store_id = required_str(arguments, "storeId")?;
    let (store, adapter) = super::resolve_store(state, ctx, store_id)?;
    let countries = adapter
        .get_available_countries(&store, &ctx.credentials)
        .await?;
    Ok(ToolOutcome::read(json!({ "countries": countries })))
}

async fn get_available_regions(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let store_id = required_str(arguments, "storeId")?;
    let (store, adapter) = super::resolve_store(state, ctx, store_id)?;
    let regions = adapter.get_regions(&store, &ctx.credentials).await?;
    Ok(ToolOutcome::read(json!({ "regions": regions })))
}

async fn get_available_payment_methods(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let store_id = required_str(arguments, "storeId")?;
    let country = optional_str(arguments, "countryCode").unwrap_or("us");

    let (store, adapter) = super::resolve_store(state, ctx, store_id)?;
    let regions = adapter.get_regions(&store, &ctx.credentials).await?;
    let region = regions
        .iter()
        .find(|r| r.covers(country))
        .ok_or_else(|| GatewayError::NoRegionForCountry(country.to_string()))?;

    let methods = adapter
        .get_available_payment_methods(&store, &region.id, &ctx.credentials)
        .await?;
    Ok(ToolOutcome::read(json!({ "paymentMethods": methods })))
}
