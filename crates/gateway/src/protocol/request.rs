//! JSON-RPC request-side types.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 id - may be a number or string per spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_string_and_number_ids() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#).unwrap();
        assert_eq!(req.id, Some(RpcId::Number(7)));

        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc","method":"tools/list"}"#).unwrap();
        assert_eq!(req.id, Some(RpcId::Str("abc".to_string())));
    }

    #[test]
    fn test_tool_call_params() {
        let params: ToolCallParams = serde_json::from_str(
            r#"{"name": "addToCart", "arguments": {"storeId": "store-1"}}"#,
        )
        .unwrap();
        assert_eq!(params.name, "addToCart");
        assert!(params.arguments.is_some());
    }
}
