//! Plugin contracts glued to the client/server lifecycle: resolver plugins
//! register this server's address under each of its services at startup
//! (and remove those entries at shutdown); tracing plugins hand back a
//! server interceptor bound to a span name, plus a matching client
//! interceptor so a call's trace id actually crosses the wire.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{ClientInterceptor, ServerInterceptor};

use crate::errors::Result;

/// Arguments passed to a [`ResolverPlugin`] at server startup/shutdown.
#[derive(Debug, Clone)]
pub struct ResolverInitOpts {
    /// The address the resolver backend itself listens on (etcd endpoint,
    /// registry address, ...).
    pub selector_svr_addr: String,
    /// This server's own advertised address.
    pub svr_addr: String,
    /// Service names this server hosts.
    pub services: Vec<String>,
}

/// Registers/deregisters `serviceName/svrAddr → svrAddr` entries in an
/// external (or in-memory) service registry, and resolves them back on the
/// client side via [`tessera_selector::Resolver`].
#[async_trait]
pub trait ResolverPlugin: Send + Sync {
    /// Register this server's address under each of `opts.services`.
    async fn init(&self, opts: &ResolverInitOpts) -> Result<()>;

    /// Remove the entries registered by `init`. Called from the server's
    /// graceful-shutdown path, closing the leak the original left open.
    async fn shutdown(&self, opts: &ResolverInitOpts) -> Result<()>;
}

/// Arguments passed to a [`TracingPlugin`] at server startup.
#[derive(Debug, Clone)]
pub struct TracingInitOpts {
    /// Address of the tracing backend (collector, agent, ...), if any.
    pub tracing_svr_addr: Option<String>,
    /// Span name attached to every call the resulting interceptor wraps.
    pub span_name: String,
}

/// Initializes tracing, producing a server interceptor that wraps every
/// dispatched call in a span and propagates a correlation id through
/// envelope metadata, and a client interceptor that originates/forwards that
/// same id on the way out.
#[async_trait]
pub trait TracingPlugin: Send + Sync {
    /// Build the server interceptor for `opts`.
    async fn init(&self, opts: &TracingInitOpts) -> Result<Arc<dyn ServerInterceptor>>;

    /// Build the client-side counterpart: a [`ClientInterceptor`] that
    /// attaches a `traceparent` to the outbound request's metadata so the
    /// server interceptor above has something to pick up.
    async fn init_client(&self, opts: &TracingInitOpts) -> Result<Arc<dyn ClientInterceptor>>;
}
