//! JSON-RPC 2.0 protocol envelopes.
//!
//! The gateway speaks JSON-RPC 2.0 over HTTP POST. Handler results and
//! handler failures are both payload-level: the transport answers 200 OK for
//! everything except a request body that cannot be parsed at all.

mod request;
mod response;

pub use request::{JsonRpcRequest, RpcId, ToolCallParams};
pub use response::{JsonRpcError, JsonRpcResponse};
