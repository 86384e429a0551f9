//! Store discovery tools.

use serde_json::{Value, json};
use tracing::instrument;

use super::{ToolOutcome, required_str};
use crate::context::RequestContext;
use crate::error::{GatewayError, Result};
use crate::state::AppState;

pub const TOOL_NAMES: &[&str] = &["getAvailableStores", "getStoreInfo"];

#[must_use]
pub fn descriptors() -> Vec<Value> {
    vec![
        json!({
            "name": "getAvailableStores",
            "description": "List the stores available in this marketplace with their ids and platforms. Store ids are required by every other tool.",
            "inputSchema": {
                "type": "object",
                "properties": {},
                "required": []
            }
        }),
        json!({
            "name": "getStoreInfo",
            "description": "Get display metadata for one store: name, logo, and the payment providers it supports.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "storeId": { "type": "string", "description": "Store id from getAvailableStores" }
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
        "getAvailableStores" => get_available_stores(state, ctx),
        "getStoreInfo" => get_store_info(state, ctx, arguments).await,
        other => Err(GatewayError::UnknownTool(other.to_string())),
    }
}

fn get_available_stores(state: &AppState, ctx: &RequestContext) -> Result<ToolOutcome> {
    let registry = super::registry(state, ctx);
    let stores: Vec<Value> = registry
        .all()
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "platform": s.platform.as_str(),
                "baseUrl": s.base_url,
            })
        })
        .collect();
    Ok(ToolOutcome::read(json!({ "stores": stores })))
}

async fn get_store_info(
    state: &AppState,
    ctx: &RequestContext,
    arguments: &Value,
) -> Result<ToolOutcome> {
    let store_id = required_str(arguments, "storeId")?;
    let (store, adapter) = super::resolve_store(state, ctx, store_id)?;
    let info = adapter.get_store_info(&store, &ctx.credentials).await?;
    Ok(ToolOutcome::read(serde_json::to_value(info)?))
}
