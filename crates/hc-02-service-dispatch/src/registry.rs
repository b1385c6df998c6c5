//! # Service Registry
//!
//! Discriminator to factory mapping. The [`Dispatcher`](crate::Dispatcher)
//! owns one behind a lock; the registry itself is a plain map so it can be
//! assembled up front and handed over.

use std::collections::HashMap;
use std::sync::Arc;

use shared_types::ServiceId;
use tracing::{info, warn};

use crate::domain::ServiceFactory;

/// Registered service factories, keyed by discriminator.
#[derive(Default)]
pub struct ServiceRegistry {
    factories: HashMap<ServiceId, Arc<dyn ServiceFactory>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a discriminator to a factory. A later registration for the same
    /// discriminator replaces the earlier one.
    pub fn insert(&mut self, service: ServiceId, factory: Arc<dyn ServiceFactory>) {
        if self.factories.insert(service.clone(), factory).is_some() {
            warn!("[Registry] Replacing factory for service: {}", service);
        } else {
            info!("[Registry] Registering service: {}", service);
        }
    }

    /// Factory for a discriminator, if any.
    #[must_use]
    pub fn get(&self, service: &ServiceId) -> Option<Arc<dyn ServiceFactory>> {
        self.factories.get(service).cloned()
    }

    #[must_use]
    pub fn contains(&self, service: &ServiceId) -> bool {
        self.factories.contains_key(service)
    }

    /// Registered discriminators, sorted.
    #[must_use]
    pub fn services(&self) -> Vec<ServiceId> {
        let mut services: Vec<_> = self.factories.keys().cloned().collect();
        services.sort();
        services
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services())
            .finish()
    }
}
