//! Platform adapter registry.
//!
//! Maps a [`Platform`] to its adapter implementation, constructing each
//! adapter lazily on first use and caching the instance for the process
//! lifetime. The cache key is the platform type, not the store id - multiple
//! stores share one adapter. Check-then-insert happens under one lock so
//! concurrent requests never observe a partially-constructed entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marketplace_core::Platform;

use super::PlatformAdapter;
use super::openfront::OpenfrontAdapter;
use crate::error::{GatewayError, Result};

type AdapterFactory = Box<dyn Fn() -> Arc<dyn PlatformAdapter> + Send + Sync>;

/// Process-lifetime registry of platform adapter singletons.
pub struct AdapterRegistry {
    factories: HashMap<Platform, AdapterFactory>,
    instances: Mutex<HashMap<Platform, Arc<dyn PlatformAdapter>>>,
}

impl AdapterRegistry {
    /// Registry with all built-in adapters registered.
    #[must_use]
    pub fn new(upstream_timeout: Duration) -> Self {
        let mut registry = Self::empty();
        registry.register(
            Platform::Openfront,
            Box::new(move || Arc::new(OpenfrontAdapter::new(upstream_timeout))),
        );
        registry
    }

    /// Registry with no adapters. Used by tests and as the base for
    /// [`register`](Self::register).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Register a factory for a platform, replacing any existing one.
    pub fn register(&mut self, platform: Platform, factory: AdapterFactory) {
        self.factories.insert(platform, factory);
    }

    /// Pre-populate the instance cache. Tests use this to inject mock
    /// adapters without going through a factory.
    pub fn insert_instance(&self, platform: Platform, adapter: Arc<dyn PlatformAdapter>) {
        if let Ok(mut instances) = self.instances.lock() {
            instances.insert(platform, adapter);
        }
    }

    /// Get the adapter for a platform, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns `AdapterUnavailable` if no factory is registered for the
    /// platform.
    pub fn get(&self, platform: Platform) -> Result<Arc<dyn PlatformAdapter>> {
        let mut instances = self
            .instances
            .lock()
            .map_err(|_| GatewayError::AdapterUnavailable(platform))?;

        if let Some(adapter) = instances.get(&platform) {
            return Ok(Arc::clone(adapter));
        }

        let factory = self
            .factories
            .get(&platform)
            .ok_or(GatewayError::AdapterUnavailable(platform))?;

        let adapter = factory();
        instances.insert(platform, Arc::clone(&adapter));
        Ok(adapter)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("platforms", &self.factories.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_same_instance() {
        let registry = AdapterRegistry::new(Duration::from_secs(5));
        let a = registry.get(Platform::Openfront).unwrap();
        let b = registry.get(Platform::Openfront).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_empty_registry_reports_adapter_unavailable() {
        let registry = AdapterRegistry::empty();
        let err = registry.get(Platform::Openfront).unwrap_err();
        assert!(matches!(err, GatewayError::AdapterUnavailable(Platform::Openfront)));
        assert_eq!(
            err.to_string(),
            "Adapter not implemented for platform: openfront"
        );
    }

    #[test]
    fn test_injected_instance_wins_over_factory() {
        let registry = AdapterRegistry::new(Duration::from_secs(5));
        let injected: Arc<dyn PlatformAdapter> =
            Arc::new(OpenfrontAdapter::new(Duration::from_secs(1)));
        registry.insert_instance(Platform::Openfront, Arc::clone(&injected));
        let got = registry.get(Platform::Openfront).unwrap();
        assert!(Arc::ptr_eq(&injected, &got));
    }
}
