//! Service discovery: resolvers turn a service name into a list of
//! [`Node`]s, balancers pick one. A [`Selector`] pairs the two and is
//! looked up by name from [`SELECTORS`].

mod balancer;
mod errors;
mod node;
mod resolver;
mod round_robin;
mod selector;

use std::sync::{Arc, OnceLock, RwLock};

pub use balancer::{Balancer, ConsistentHashBalancer, RandomBalancer, WeightedRoundRobinBalancer};
pub use errors::{Result, SelectorError};
pub use node::Node;
pub use resolver::Resolver;
pub use round_robin::RoundRobinBalancer;
pub use selector::Selector;

/// Global, name-keyed selector registry. Written once at startup (as each
/// resolver plugin is wired up to a balancer), read thereafter by
/// `ClientOptions::selector_name` lookups.
pub struct SelectorRegistry {
    entries: OnceLock<RwLock<std::collections::HashMap<String, Arc<Selector>>>>,
}

impl SelectorRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: OnceLock::new() }
    }

    fn map(&self) -> &RwLock<std::collections::HashMap<String, Arc<Selector>>> {
        self.entries.get_or_init(|| RwLock::new(std::collections::HashMap::new()))
    }

    /// Register a selector under `name`.
    pub fn register(&self, name: impl Into<String>, selector: Selector) {
        self.map().write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(name.into(), Arc::new(selector));
    }

    /// Look up a selector by name.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::UnknownName`] if nothing is registered under
    /// `name`.
    pub fn get(&self, name: &str) -> Result<Arc<Selector>> {
        self.map()
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SelectorError::UnknownName { kind: "selector", name: name.to_owned() })
    }
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide selector registry.
pub static SELECTORS: SelectorRegistry = SelectorRegistry::new();
