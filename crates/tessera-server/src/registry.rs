//! Multi-service registry: `serviceName -> Service`. Registering a second
//! service under an existing name is rejected rather than silently replacing
//! the first one.

use std::{collections::HashMap, sync::Arc};

use tessera_core::Service;

use crate::errors::{Result, ServerError};

/// Services hosted by one server, keyed by name.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<Service>>,
}

impl ServiceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { services: HashMap::new() }
    }

    /// Register `service`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::DuplicateService`] if a service with this name
    /// is already registered.
    pub fn register(&mut self, service: Service) -> Result<()> {
        let name = service.name().to_owned();
        if self.services.contains_key(&name) {
            return Err(ServerError::DuplicateService(name));
        }
        self.services.insert(name, Arc::new(service));
        Ok(())
    }

    /// Look up a service by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Service>> {
        self.services.get(name)
    }

    /// Names of every registered service, in arbitrary order.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}
