//! Client/server configuration surfaces. Registered before `serve`/the
//! first `invoke` and treated as immutable afterward.

use std::{sync::Arc, time::Duration};

use crate::{
    auth::PerRpcAuth,
    interceptor::{ClientInterceptor, ServerInterceptor},
};

/// Which byte-stream transport a call or server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Stream-oriented, connection-pooled.
    #[default]
    Tcp,
    /// Datagram-oriented.
    Udp,
}

impl Network {
    /// Parse the `"tcp"`/`"udp"` config value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            _ => None,
        }
    }
}

/// Per-call client configuration, built once per [`Invoke`](crate) and
/// applied before the client interceptor chain runs.
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Overrides selector-resolved address when set.
    pub target: Option<String>,
    /// Transport to dial.
    pub network: Network,
    /// `0` means no deadline.
    pub timeout: Duration,
    /// Payload serializer registry tag (registry B). Default `"proto"`.
    pub serialization_type: String,
    /// Envelope codec registry tag (registry A). Default `"proto"`.
    pub protocol: String,
    /// Selector name used to resolve `service_name` when `target` is unset.
    pub selector_name: Option<String>,
    /// Client interceptor chain, outermost first.
    pub interceptors: Vec<Arc<dyn ClientInterceptor>>,
    /// Per-call auth providers, applied in order (later overrides earlier).
    pub per_rpc_auth: Vec<Arc<dyn PerRpcAuth>>,
    /// Tracing backend address, if a tracing plugin is configured.
    pub tracing_svr_addr: Option<String>,
    /// Span name the tracing interceptor attaches to this call, if set.
    pub tracing_span_name: Option<String>,
}

impl ClientOptions {
    /// Defaults matching the wire defaults (`proto`/`proto`, tcp, no timeout).
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: None,
            network: Network::Tcp,
            timeout: Duration::ZERO,
            serialization_type: "proto".to_owned(),
            protocol: "proto".to_owned(),
            selector_name: None,
            interceptors: Vec::new(),
            per_rpc_auth: Vec::new(),
            tracing_svr_addr: None,
            tracing_span_name: None,
        }
    }

    /// Override the resolved address.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the transport network.
    #[must_use]
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the payload serializer tag.
    #[must_use]
    pub fn with_serialization_type(mut self, tag: impl Into<String>) -> Self {
        self.serialization_type = tag.into();
        self
    }

    /// Set the envelope codec tag.
    #[must_use]
    pub fn with_protocol(mut self, tag: impl Into<String>) -> Self {
        self.protocol = tag.into();
        self
    }

    /// Name the selector used when `target` is unset.
    #[must_use]
    pub fn with_selector_name(mut self, name: impl Into<String>) -> Self {
        self.selector_name = Some(name.into());
        self
    }

    /// Append a client interceptor to the chain.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn ClientInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Append a `perRPCAuth` provider.
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<dyn PerRpcAuth>) -> Self {
        self.per_rpc_auth.push(auth);
        self
    }

    /// Name the span a tracing interceptor should attach to this call,
    /// optionally pointing it at a tracing backend address.
    #[must_use]
    pub fn with_tracing(mut self, span_name: impl Into<String>, tracing_svr_addr: Option<String>) -> Self {
        self.tracing_span_name = Some(span_name.into());
        self.tracing_svr_addr = tracing_svr_addr;
        self
    }
}

/// Server-wide configuration, fixed at `serve` time.
#[derive(Clone)]
pub struct ServerOptions {
    /// Bind address, e.g. `"0.0.0.0:9090"`.
    pub address: String,
    /// Transport to listen on.
    pub network: Network,
    /// Per-connection idle/read timeout; `0` means none.
    pub timeout: Duration,
    /// Payload serializer registry tag. Default `"proto"`.
    pub serialization_type: String,
    /// Envelope codec registry tag. Default `"proto"`.
    pub protocol: String,
    /// Server interceptor chain, outermost first.
    pub interceptors: Vec<Arc<dyn ServerInterceptor>>,
    /// Address this server's resolver plugin registers under.
    pub selector_svr_addr: Option<String>,
    /// Resolver/tracing plugin names to initialize at startup.
    pub plugin_names: Vec<String>,
    /// Tracing backend address, if a tracing plugin is configured.
    pub tracing_svr_addr: Option<String>,
    /// Span name tracing interceptors create for each call.
    pub tracing_span_name: Option<String>,
}

impl ServerOptions {
    /// A server bound to `address` with otherwise-default configuration.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            network: Network::Tcp,
            timeout: Duration::ZERO,
            serialization_type: "proto".to_owned(),
            protocol: "proto".to_owned(),
            interceptors: Vec::new(),
            selector_svr_addr: None,
            plugin_names: Vec::new(),
            tracing_svr_addr: None,
            tracing_span_name: None,
        }
    }

    /// Set the transport network.
    #[must_use]
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the per-connection timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append a server interceptor to the chain.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn ServerInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Set the address this server registers in its resolver plugin.
    #[must_use]
    pub fn with_selector_svr_addr(mut self, addr: impl Into<String>) -> Self {
        self.selector_svr_addr = Some(addr.into());
        self
    }

    /// Name a plugin to initialize at startup.
    #[must_use]
    pub fn with_plugin(mut self, name: impl Into<String>) -> Self {
        self.plugin_names.push(name.into());
        self
    }

    /// Name the span every dispatched call is wrapped in, optionally pointing
    /// the tracing plugin at a backend address.
    #[must_use]
    pub fn with_tracing(mut self, span_name: impl Into<String>, tracing_svr_addr: Option<String>) -> Self {
        self.tracing_span_name = Some(span_name.into());
        self.tracing_svr_addr = tracing_svr_addr;
        self
    }
}
