//! Store registry: the effective store list for one request.
//!
//! Built fresh per request from either the static default configuration or
//! the caller's `X-Marketplace-Config` override. Pure function of its input;
//! nothing is persisted.

use marketplace_core::{ResolvedStore, StoreConfig};

use crate::error::GatewayError;

/// The resolved store list for the current request.
#[derive(Debug, Clone)]
pub struct StoreRegistry {
    stores: Vec<ResolvedStore>,
}

impl StoreRegistry {
    /// Build the effective registry: the caller override if supplied,
    /// otherwise the static default list.
    #[must_use]
    pub fn new(defaults: &[StoreConfig], overrides: Option<&[StoreConfig]>) -> Self {
        let active = overrides.unwrap_or(defaults);
        Self {
            stores: active
                .iter()
                .enumerate()
                .map(|(i, config)| ResolvedStore::from_config(i, config))
                .collect(),
        }
    }

    /// All resolved stores, in configuration order.
    #[must_use]
    pub fn all(&self) -> &[ResolvedStore] {
        &self.stores
    }

    /// Resolve a store by id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStore` enumerating the valid ids if no store matches.
    pub fn resolve(&self, store_id: &str) -> Result<&ResolvedStore, GatewayError> {
        self.stores
            .iter()
            .find(|s| s.id == store_id)
            .ok_or_else(|| GatewayError::UnknownStore {
                id: store_id.to_string(),
                valid: self.stores.iter().map(|s| s.id.clone()).collect(),
            })
    }
}
