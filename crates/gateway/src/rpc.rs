//! JSON-RPC dispatch and the HTTP transport endpoint.
//!
//! Protocol errors are payload content: the endpoint answers 200 OK with a
//! JSON-RPC error member for everything the calling agent can recover from.
//! Only a request body that does not parse as JSON-RPC at all produces a
//! non-200 status.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use tracing::instrument;

use crate::context::RequestContext;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use crate::state::AppState;
use crate::tools;

/// Response header set when a tool call mutated backend state. Callers use
/// it to invalidate caches of carts they rendered earlier.
pub const DATA_CHANGED_HEADER: &str = "x-data-changed";

const PROTOCOL_VERSION: &str = "2025-03-26";

/// Handle one parsed JSON-RPC request. Returns the response envelope and
/// whether backend state was mutated.
#[instrument(skip(state, ctx, request), fields(method = %request.method))]
pub async fn handle_request(
    state: &AppState,
    ctx: &RequestContext,
    request: JsonRpcRequest,
) -> (JsonRpcResponse, bool) {
    if request.jsonrpc != "2.0" {
        return (
            JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported JSON-RPC version: {}",
                    request.jsonrpc
                )),
            ),
            false,
        );
    }

    match request.method.as_str() {
        "initialize" => (
            JsonRpcResponse::success(
                request.id,
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            false,
        ),
        "notifications/initialized" | "ping" => (
            JsonRpcResponse::success(request.id, serde_json::json!({})),
            false,
        ),
        "tools/list" => (
            JsonRpcResponse::success(
                request.id,
                serde_json::json!({ "tools": tools::catalogue() }),
            ),
            false,
        ),
        "tools/call" => {
            let params: ToolCallParams = match request
                .params
                .ok_or_else(|| "missing params".to_string())
                .and_then(|p| serde_json::from_value(p).map_err(|e| e.to_string()))
            {
                Ok(params) => params,
                Err(detail) => {
                    return (
                        JsonRpcResponse::error(
                            request.id,
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {detail}"
                            )),
                        ),
                        false,
                    );
                }
            };

            let arguments = params.arguments.unwrap_or(serde_json::Value::Null);
            match tools::call(state, ctx, &params.name, &arguments).await {
                Ok(outcome) => (
                    JsonRpcResponse::success(request.id, outcome.result),
                    outcome.mutated,
                ),
                Err(error) => {
                    tracing::warn!(tool = %params.name, %error, "Tool call failed");
                    (
                        JsonRpcResponse::error(request.id, error.into_rpc_error()),
                        false,
                    )
                }
            }
        }
        other => (
            JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(other)),
            false,
        ),
    }
}

/// HTTP POST endpoint. The transport path segment only routes; every
/// transport variant behaves identically today.
pub async fn rpc_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(%error, "Unparseable request body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::error(None, JsonRpcError::parse_error())),
            )
                .into_response();
        }
    };

    let ctx = match RequestContext::from_headers(&headers) {
        Ok(ctx) => ctx,
        Err(error) => {
            let response = JsonRpcResponse::error(request.id, error.into_rpc_error());
            return Json(response).into_response();
        }
    };

    let (response, mutated) = handle_request(&state, &ctx, request).await;
    let mut http = Json(response).into_response();
    if mutated {
        http.headers_mut().insert(
            DATA_CHANGED_HEADER,
            axum::http::HeaderValue::from_static("true"),
        );
    }
    http
}
