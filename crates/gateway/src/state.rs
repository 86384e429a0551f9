//! Shared application state.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::platform::AdapterRegistry;

/// Process-wide state handed to every request handler.
///
/// Cheap to clone; everything request-scoped lives in
/// [`crate::context::RequestContext`] instead.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: GatewayConfig,
    adapters: AdapterRegistry,
}

impl AppState {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let adapters = AdapterRegistry::new(config.upstream_timeout);
        Self::with_registry(config, adapters)
    }

    /// Build state around a caller-supplied adapter registry. Tests use this
    /// to run the dispatcher against mock adapters.
    #[must_use]
    pub fn with_registry(config: GatewayConfig, adapters: AdapterRegistry) -> Self {
        Self {
            inner: Arc::new(Inner { config, adapters }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn adapters(&self) -> &AdapterRegistry {
        &self.inner.adapters
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("stores", &self.inner.config.stores.len())
            .field("adapters", &self.inner.adapters)
            .finish()
    }
}
