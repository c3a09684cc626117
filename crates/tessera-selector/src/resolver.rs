//! Service name → node-list resolution, backed by a pluggable resolver.

use async_trait::async_trait;

use crate::{errors::Result, node::Node};

/// Resolves a service name to its currently registered nodes. The concrete
/// backend (etcd, a service registry, an in-memory map) is external to this
/// crate; see `tessera-plugin::memory_resolver` for the shipped in-process
/// implementation.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// List the nodes currently registered for `service_name`.
    async fn resolve(&self, service_name: &str) -> Result<Vec<Node>>;
}
