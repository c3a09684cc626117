//! A named selector: a resolver paired with a balancer, registered once at
//! startup and looked up by `ClientOptions::selector_name` thereafter.

use std::sync::Arc;

use crate::{
    balancer::Balancer,
    errors::{Result, SelectorError},
    node::Node,
    resolver::Resolver,
};

/// Resolves a service name to `[Node]`, then balances down to one.
pub struct Selector {
    resolver: Arc<dyn Resolver>,
    balancer: Arc<dyn Balancer>,
}

impl Selector {
    /// Pair a resolver with a balancer.
    #[must_use]
    pub fn new(resolver: Arc<dyn Resolver>, balancer: Arc<dyn Balancer>) -> Self {
        Self { resolver, balancer }
    }

    /// Resolve `service_name` to its nodes, then balance to a single address.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::NoNodes`] if the resolver returns an empty
    /// list — the client must not attempt a connection in that case.
    pub async fn select(&self, service_name: &str) -> Result<Node> {
        let nodes = self.resolver.resolve(service_name).await?;
        if nodes.is_empty() {
            return Err(SelectorError::NoNodes(service_name.to_owned()));
        }
        self.balancer.balance(service_name, &nodes).await
    }
}
