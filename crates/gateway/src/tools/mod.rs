//! Tool catalogue and dispatch.
//!
//! Tools are grouped by concern (store, product, cart, region). Each group
//! owns its catalogue descriptors and a handler for every tool it declares;
//! dispatch resolves a tool name to exactly one group by catalogue
//! membership. Handlers return a bare result plus a mutation flag; envelope
//! construction belongs to the JSON-RPC layer alone.

pub mod cart;
pub mod product;
pub mod region;
pub mod store;

use std::sync::Arc;

use marketplace_core::ResolvedStore;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::{GatewayError, Result};
use crate::platform::PlatformAdapter;
use crate::state::AppState;
use crate::stores::StoreRegistry;

/// The outcome of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// Bare result payload; the dispatcher wraps it into the envelope.
    pub result: Value,
    /// Whether backend state changed. Surfaces as `X-Data-Changed: true`.
    pub mutated: bool,
}

impl ToolOutcome {
    #[must_use]
    pub const fn read(result: Value) -> Self {
        Self {
            result,
            mutated: false,
        }
    }

    #[must_use]
    pub const fn mutation(result: Value) -> Self {
        Self {
            result,
            mutated: true,
        }
    }
}

/// All tool descriptors, in catalogue order, for `tools/list`.
#[must_use]
pub fn catalogue() -> Vec<Value> {
    let mut tools = store::descriptors();
    tools.extend(product::descriptors());
    tools.extend(cart::descriptors());
    tools.extend(region::descriptors());
    tools
}

/// Dispatch a tool call to the group that declares it.
///
/// # Errors
///
/// Returns `UnknownTool` if no group declares the name, or whatever the
/// handler itself fails with.
pub async fn call(
    state: &AppState,
    ctx: &RequestContext,
    name: &str,
    arguments: &Value,
) -> Result<ToolOutcome> {
    if store::TOOL_NAMES.contains(&name) {
        store::call(state, ctx, name, arguments).await
    } else if product::TOOL_NAMES.contains(&name) {
        product::call(state, ctx, name, arguments).await
    } else if cart::TOOL_NAMES.contains(&name) {
        cart::call(state, ctx, name, arguments).await
    } else if region::TOOL_NAMES.contains(&name) {
        region::call(state, ctx, name, arguments).await
    } else {
        Err(GatewayError::UnknownTool(name.to_string()))
    }
}

/// The effective store registry for one request.
pub(crate) fn registry(state: &AppState, ctx: &RequestContext) -> StoreRegistry {
    StoreRegistry::new(&state.config().stores, ctx.store_override.as_deref())
}

/// Resolve a store id to its record and platform adapter.
pub(crate) fn resolve_store(
    state: &AppState,
    ctx: &RequestContext,
    store_id: &str,
) -> Result<(ResolvedStore, Arc<dyn PlatformAdapter>)> {
    let registry = registry(state, ctx);
    let store = registry.resolve(store_id)?.clone();
    let adapter = state.adapters().get(store.platform)?;
    Ok((store, adapter))
}

// Argument extraction. Tool arguments arrive as loose JSON; these helpers
// turn a missing or mistyped argument into a Validation error naming it.

pub(crate) fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::Validation(format!("Missing required argument: {key}")))
}

pub(crate) fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

pub(crate) fn required_i64(arguments: &Value, key: &str) -> Result<i64> {
    arguments
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| GatewayError::Validation(format!("Missing required argument: {key}")))
}

pub(crate) fn optional_i64(arguments: &Value, key: &str) -> Option<i64> {
    arguments.get(key).and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_has_no_duplicate_names() {
        let tools = catalogue();
        let mut names: Vec<&str> = tools
            .iter()
            .filter_map(|t| t.get("name").and_then(Value::as_str))
            .collect();
        let total = names.len();
        assert_eq!(total, tools.len(), "every descriptor carries a name");
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "tool names are unique");
    }

    #[test]
    fn test_catalogue_covers_every_dispatchable_tool() {
        let tools = catalogue();
        let names: Vec<&str> = tools
            .iter()
            .filter_map(|t| t.get("name").and_then(Value::as_str))
            .collect();
        for group in [
            store::TOOL_NAMES,
            product::TOOL_NAMES,
            cart::TOOL_NAMES,
            region::TOOL_NAMES,
        ] {
            for name in group {
                assert!(names.contains(name), "missing descriptor for {name}");
            }
        }
    }

    #[test]
    fn test_required_str_rejects_missing_and_empty() {
        let args = serde_json::json!({ "storeId": "", "other": 3 });
        assert!(required_str(&args, "storeId").is_err());
        assert!(required_str(&args, "absent").is_err());
        assert!(required_str(&args, "other").is_err());
    }
}
