//! Resolver and tracing plugins glued to the server lifecycle: both are
//! looked up by name from a process-wide registry, mirroring the envelope
//! and payload codec registries in `tessera-codec`.

mod errors;
mod memory_resolver;
mod plugin;
mod tracing_plugin;

use std::sync::Arc;

pub use errors::PluginError;
pub use memory_resolver::MemoryResolver;
pub use plugin::{ResolverInitOpts, ResolverPlugin, TracingInitOpts, TracingPlugin};
pub use tracing_plugin::{SpanTracingPlugin, TRACEPARENT_KEY};

use tessera_codec::CodecRegistry;

/// Resolver plugins keyed by name (e.g. `"memory"`, `"etcd"`).
pub static RESOLVER_PLUGINS: CodecRegistry<dyn ResolverPlugin> = CodecRegistry::new();

/// Tracing plugins keyed by name (e.g. `"span"`).
pub static TRACING_PLUGINS: CodecRegistry<dyn TracingPlugin> = CodecRegistry::new();

/// Register the built-in plugins (`"memory"` resolver, `"span"` tracing).
/// Idempotent: a second call is a no-op.
pub fn register_defaults() {
    let resolver: Arc<dyn ResolverPlugin> = Arc::new(MemoryResolver::new());
    let _ = RESOLVER_PLUGINS.register("memory", resolver);

    let tracing: Arc<dyn TracingPlugin> = Arc::new(SpanTracingPlugin);
    let _ = TRACING_PLUGINS.register("span", tracing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_defaults_is_idempotent() {
        register_defaults();
        register_defaults();
        assert!(RESOLVER_PLUGINS.tags().contains(&"memory".to_owned()));
        assert!(TRACING_PLUGINS.tags().contains(&"span".to_owned()));
    }
}
