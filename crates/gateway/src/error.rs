//! Gateway error taxonomy and its mapping onto JSON-RPC error objects.
//!
//! Protocol-level errors (JSON-RPC `error` members) stay inside a 200 OK
//! response; only a malformed request body produces a non-200 status. Every
//! variant here therefore ends up as payload content the calling agent can
//! narrate a recovery path from.

use marketplace_core::{Platform, PlatformError, QuantityError};
use thiserror::Error;

use crate::protocol::JsonRpcError;

/// Errors that can occur while handling a tool call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Tool name not present in any catalogue.
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// Store id not in the active store list.
    #[error("Store not found: {id} (valid ids: {})", valid.join(", "))]
    UnknownStore { id: String, valid: Vec<String> },

    /// Configured platform string has no implementation.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Platform is known but no adapter is registered for it.
    #[error("Adapter not implemented for platform: {0}")]
    AdapterUnavailable(Platform),

    /// Line-item quantity outside gateway bounds.
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// Caller-supplied input failed validation.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A forwarded header could not be parsed.
    #[error("Invalid header {name}: {detail}")]
    InvalidHeader { name: &'static str, detail: String },

    /// Backend query returned GraphQL errors.
    #[error("Upstream errors: {}", format_upstream_errors(.0))]
    Upstream(Vec<UpstreamError>),

    /// Backend did not answer within the configured timeout or the
    /// connection failed outright.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// HTTP request to the backend failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the supplied login credentials.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// No backend region covers the requested country.
    #[error("No region configured for country: {0}")]
    NoRegionForCountry(String),

    /// The completed order carries no shipping country, so a redirect URL
    /// cannot be built.
    #[error("Completed order has no country code on its shipping address")]
    NoCountryCode,

    /// Requested payment provider matched none of the region's providers.
    #[error("No payment provider matching '{requested}' (available: {})", available.join(", "))]
    NoMatchingProvider {
        requested: String,
        available: Vec<String>,
    },
}

/// One error entry from a backend GraphQL response.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub message: String,
    pub path: Vec<serde_json::Value>,
}

fn format_upstream_errors(errors: &[UpstreamError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                let path = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                format!("{} (path: {path})", e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl GatewayError {
    /// Map this error onto a JSON-RPC 2.0 error code.
    ///
    /// Caller-input problems map to -32602 (Invalid params); upstream and
    /// internal failures, including unknown tool names, map to -32603.
    #[must_use]
    pub const fn json_rpc_code(&self) -> i32 {
        match self {
            Self::UnknownStore { .. }
            | Self::Platform(_)
            | Self::Quantity(_)
            | Self::Validation(_)
            | Self::InvalidHeader { .. }
            | Self::AuthenticationFailed
            | Self::NoRegionForCountry(_)
            | Self::NoMatchingProvider { .. } => -32602,
            Self::UnknownTool(_)
            | Self::AdapterUnavailable(_)
            | Self::Upstream(_)
            | Self::UpstreamUnavailable(_)
            | Self::Http(_)
            | Self::Parse(_)
            | Self::NotFound(_)
            | Self::NoCountryCode => -32603,
        }
    }

    /// Convert into a JSON-RPC error object, preserving the raw detail in
    /// the `data` member.
    #[must_use]
    pub fn into_rpc_error(self) -> JsonRpcError {
        let code = self.json_rpc_code();
        JsonRpcError {
            code,
            message: self.to_string(),
            data: Some(serde_json::json!({ "detail": format!("{self:?}") })),
        }
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
