//! In-memory resolver plugin: stands in for the external service registry
//! (etcd, a distributed KV store, ...) the original always treated as an
//! external collaborator. Same `Init`/shutdown/`Resolve` shape, backed by a
//! process-local map instead of a network round trip.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use tessera_selector::{Node, Resolver};

use crate::{
    errors::Result,
    plugin::{ResolverInitOpts, ResolverPlugin},
};

/// A resolver plugin backed by an in-process `HashMap<service, [Node]>`.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    entries: RwLock<HashMap<String, Vec<Node>>>,
}

impl MemoryResolver {
    /// An empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }
}

#[async_trait]
impl ResolverPlugin for MemoryResolver {
    async fn init(&self, opts: &ResolverInitOpts) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        for service in &opts.services {
            let node = Node::new(format!("/{service}/svr/{}", opts.svr_addr), Vec::new());
            entries.entry(service.clone()).or_default().push(node);
        }
        Ok(())
    }

    async fn shutdown(&self, opts: &ResolverInitOpts) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        for service in &opts.services {
            if let Some(nodes) = entries.get_mut(service) {
                nodes.retain(|n| n.addr() != opts.svr_addr);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Resolver for MemoryResolver {
    async fn resolve(&self, service_name: &str) -> tessera_selector::Result<Vec<Node>> {
        let entries = self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(service_name).cloned().unwrap_or_default())
    }
}
