//! Endpoint registry

use crate::endpoint::{Endpoint, EndpointInfo};
use dashmap::DashMap;
use faultline_core::EndpointKey;
use std::sync::Arc;

/// Owns all registered endpoints and resolves inbound requests to them.
///
/// Keys are unique at any instant; registering an existing key
/// overwrites the earlier endpoint (last-write-wins).
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: DashMap<EndpointKey, Arc<Endpoint>>,
}

impl EndpointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint under its key.
    pub fn register(&self, endpoint: Endpoint) {
        let key = endpoint.key.clone();
        if self.endpoints.insert(key.clone(), Arc::new(endpoint)).is_some() {
            tracing::debug!(key = %key, "Endpoint overwritten");
        } else {
            tracing::debug!(key = %key, "Endpoint registered");
        }
    }

    /// Resolve a key to its endpoint.
    pub fn lookup(&self, key: &EndpointKey) -> Option<Arc<Endpoint>> {
        self.endpoints.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Whether a key is registered.
    pub fn contains(&self, key: &EndpointKey) -> bool {
        self.endpoints.contains_key(key)
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Machine-readable catalog of every endpoint, sorted by route then
    /// method for stable output.
    pub fn catalog(&self) -> Vec<EndpointInfo> {
        let mut infos: Vec<EndpointInfo> = self
            .endpoints
            .iter()
            .map(|entry| entry.value().describe())
            .collect();

        infos.sort_by(|a, b| (&a.route, &a.method).cmp(&(&b.route, &b.method)));

        infos
    }
}
