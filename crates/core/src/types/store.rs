//! Store configuration and the supported platform set.
//!
//! A marketplace is an ordered list of stores. Each store names the platform
//! its backend speaks and the public base URL; everything else (stable id,
//! API endpoint) is derived per request and never persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error resolving a platform type string.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The configured platform string has no registered implementation.
    #[error("Unsupported platform: {0} (supported: {supported})", supported = Platform::SUPPORTED.join(", "))]
    Unsupported(String),
}

/// Backend e-commerce platforms the gateway can talk to.
///
/// Adding a platform means adding a variant here and registering an adapter
/// factory for it; stores are matched to adapters by this type, never by
/// string comparison at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Openfront,
}

impl Platform {
    /// Platform strings accepted in store configuration.
    pub const SUPPORTED: &'static [&'static str] = &["openfront"];

    /// Canonical lowercase name used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Openfront => "openfront",
        }
    }

    /// Path appended to a store's base URL to reach its query API.
    #[must_use]
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Openfront => "/api/graphql",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openfront" => Ok(Self::Openfront),
            other => Err(PlatformError::Unsupported(other.to_string())),
        }
    }
}

/// A configured store: platform type plus public base URL.
///
/// Supplied by static configuration or by a per-request override; immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub base_url: String,
    pub platform: Platform,
}

/// A store resolved for the current request.
///
/// Ids are assigned positionally (`store-1`, `store-2`, ...) from the active
/// store list, so they are stable for a given configuration but change if the
/// list is reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStore {
    /// Stable per-list ordinal id, e.g. `store-1`.
    pub id: String,
    pub base_url: String,
    pub platform: Platform,
    /// Full URL of the backend query API for this store.
    pub endpoint: String,
}

impl ResolvedStore {
    /// Resolve a configured store at a given position (zero-based).
    #[must_use]
    pub fn from_config(index: usize, config: &StoreConfig) -> Self {
        let base = config.base_url.trim_end_matches('/');
        Self {
            id: format!("store-{}", index + 1),
            base_url: base.to_string(),
            platform: config.platform,
            endpoint: format!("{base}{}", config.platform.api_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("openfront".parse::<Platform>().ok(), Some(Platform::Openfront));
    }

    #[test]
    fn test_platform_from_str_unsupported() {
        let err = "shopware".parse::<Platform>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported platform: shopware (supported: openfront)"
        );
    }

    #[test]
    fn test_resolved_store_endpoint() {
        let config = StoreConfig {
            base_url: "https://shop.example.com/".to_string(),
            platform: Platform::Openfront,
        };
        let store = ResolvedStore::from_config(0, &config);
        assert_eq!(store.id, "store-1");
        assert_eq!(store.base_url, "https://shop.example.com");
        assert_eq!(store.endpoint, "https://shop.example.com/api/graphql");
    }

    #[test]
    fn test_store_ids_are_positional() {
        let config = StoreConfig {
            base_url: "https://a.example.com".to_string(),
            platform: Platform::Openfront,
        };
        assert_eq!(ResolvedStore::from_config(2, &config).id, "store-3");
    }

    #[test]
    fn test_store_config_deserializes_camel_case() {
        let config: StoreConfig = serde_json::from_str(
            r#"{"baseUrl": "https://shop.example.com", "platform": "openfront"}"#,
        )
        .unwrap();
        assert_eq!(config.platform, Platform::Openfront);
    }
}
