//! Call context, metadata, interceptor chains, typed service dispatch, auth,
//! and framework error codes shared by `tessera-client` and `tessera-server`.

mod auth;
mod codes;
mod context;
mod interceptor;
mod metadata;
mod options;
mod service;

pub use auth::{BearerTokenAuth, PerRpcAuth, RequireAuthClientInterceptor, RequireBearerServerInterceptor, verify_bearer};
pub use codes::FrameworkError;
pub use context::CallContext;
pub use interceptor::{
    ClientInterceptor, ClientNext, ClientTerminal, ServerInterceptor, ServerNext, ServerTerminal,
    run_client_chain, run_server_chain,
};
pub use metadata::{AUTHORIZATION_KEY, Metadata, merge};
pub use options::{ClientOptions, Network, ServerOptions};
pub use service::{BoxFuture, MethodHandler, Service, ServiceBuilder};
