//! End-to-end scenarios against a real `Client`/`Server` pair over TCP.

use std::{sync::Arc, time::Duration};

use calculator_demo::{CalculateReply, CalculateRequest, SERVICE_NAME, build_service};
use tessera_client::Client;
use tessera_core::{
    BearerTokenAuth, CallContext, ClientOptions, FrameworkError, RequireBearerServerInterceptor, ServerOptions,
};
use tessera_plugin::{MemoryResolver, ResolverInitOpts, ResolverPlugin};
use tessera_selector::{Resolver, RoundRobinBalancer, SELECTORS, Selector};
use tessera_server::{Server, ServiceRegistry};
use tokio::net::TcpListener;

async fn free_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

fn registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry.register(build_service().unwrap()).unwrap();
    registry
}

async fn spawn_server(options: ServerOptions) -> tokio::task::JoinHandle<Result<(), tessera_server::ServerError>> {
    let server = Server::new(options, registry());
    let handle = tokio::spawn(server.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle
}

async fn calculate(
    client: &Client,
    opts: ClientOptions,
    operation: &str,
    num1: f64,
    num2: f64,
) -> Result<CalculateReply, FrameworkError> {
    let req = CalculateRequest { operation: operation.to_owned(), num1, num2 };
    client.invoke(&format!("/{SERVICE_NAME}/Calculate"), &req, opts).await
}

#[tokio::test]
async fn scenario_multiply_returns_exact_result() {
    let addr = free_addr().await;
    let handle = spawn_server(ServerOptions::new(addr.clone())).await;

    let client = Client::new();
    let opts = ClientOptions::new().with_target(addr);
    let reply = calculate(&client, opts, "multiply", 3.5, 6.0).await.unwrap();
    assert_eq!(reply.result, 21.0);

    handle.abort();
}

#[tokio::test]
async fn scenario_divide_by_zero_is_a_user_error() {
    let addr = free_addr().await;
    let handle = spawn_server(ServerOptions::new(addr.clone())).await;

    let client = Client::new();
    let opts = ClientOptions::new().with_target(addr);
    let err = calculate(&client, opts, "divide", 1.0, 0.0).await.unwrap_err();
    assert!(err.is_handler_error());
    assert_eq!(err.message, "division by zero");

    handle.abort();
}

#[tokio::test]
async fn scenario_invalid_operation_is_a_user_error() {
    let addr = free_addr().await;
    let handle = spawn_server(ServerOptions::new(addr.clone())).await;

    let client = Client::new();
    let opts = ClientOptions::new().with_target(addr);
    let err = calculate(&client, opts, "xor", 1.0, 2.0).await.unwrap_err();
    assert!(err.is_handler_error());

    handle.abort();
}

#[tokio::test]
async fn scenario_auth_mismatch_is_client_cert_fail() {
    let addr = free_addr().await;
    let options = ServerOptions::new(addr.clone())
        .with_interceptor(Arc::new(RequireBearerServerInterceptor::new("token")));
    let handle = spawn_server(options).await;

    let client = Client::new();
    // Client sends the bare token; the server wants "Bearer token".
    let opts = ClientOptions::new().with_target(addr).with_auth(Arc::new(PlainTokenAuth));
    let err = calculate(&client, opts, "add", 1.0, 2.0).await.unwrap_err();
    assert_eq!(err.code, FrameworkError::CLIENT_CERT_FAIL);

    handle.abort();
}

struct PlainTokenAuth;

#[async_trait::async_trait]
impl tessera_core::PerRpcAuth for PlainTokenAuth {
    async fn get_metadata(&self, _ctx: &CallContext) -> Result<tessera_core::Metadata, FrameworkError> {
        let mut md = tessera_core::Metadata::new();
        md.insert(tessera_core::AUTHORIZATION_KEY.to_owned(), bytes::Bytes::from_static(b"token"));
        Ok(md)
    }
}

#[tokio::test]
async fn scenario_auth_match_succeeds() {
    let addr = free_addr().await;
    let options = ServerOptions::new(addr.clone())
        .with_interceptor(Arc::new(RequireBearerServerInterceptor::new("token")));
    let handle = spawn_server(options).await;

    let client = Client::new();
    let opts = ClientOptions::new().with_target(addr).with_auth(Arc::new(BearerTokenAuth::new("token")));
    let reply = calculate(&client, opts, "add", 1.0, 2.0).await.unwrap();
    assert_eq!(reply.result, 3.0);

    handle.abort();
}

/// A handler that sleeps well past a 1ms client deadline, so the call must
/// be cancelled before any reply arrives.
mod slow {
    use super::{CallContext, FrameworkError};

    pub async fn sleep_then_ok(_ctx: CallContext, _req: ()) -> Result<(), FrameworkError> {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        Ok(())
    }
}

#[tokio::test]
async fn scenario_deadline_exceeded_cancels_before_reply() {
    let addr = free_addr().await;
    let mut registry = ServiceRegistry::new();
    registry.register(tessera_core::ServiceBuilder::new("Slow").method("Wait", slow::sleep_then_ok).unwrap().build()).unwrap();
    let server = Server::new(ServerOptions::new(addr.clone()), registry);
    let handle = tokio::spawn(server.run());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = Client::new();
    let opts = ClientOptions::new().with_target(addr).with_timeout(Duration::from_millis(1));
    let err = client.invoke::<(), ()>("/Slow/Wait", &(), opts).await.unwrap_err();
    assert_eq!(err.code, FrameworkError::CLIENT_MSG_ERROR);

    handle.abort();
}

/// A backend whose only method reports back its own bind address, so a test
/// can tell which of several round-robin targets actually answered a call.
async fn spawn_whoami_backend(addr: String) -> tokio::task::JoinHandle<Result<(), tessera_server::ServerError>> {
    let mut registry = ServiceRegistry::new();
    let reply_addr = addr.clone();
    registry
        .register(
            tessera_core::ServiceBuilder::new("Whoami")
                .method("Addr", move |_ctx: CallContext, _req: ()| {
                    let reply_addr = reply_addr.clone();
                    async move { Ok::<String, FrameworkError>(reply_addr) }
                })
                .unwrap()
                .build(),
        )
        .unwrap();
    let server = Server::new(ServerOptions::new(addr.clone()), registry);
    let handle = tokio::spawn(server.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle
}

#[tokio::test]
async fn scenario_round_robin_reaches_both_backends() {
    let addr_a = free_addr().await;
    let addr_b = free_addr().await;
    let handle_a = spawn_whoami_backend(addr_a.clone()).await;
    let handle_b = spawn_whoami_backend(addr_b.clone()).await;

    let resolver = Arc::new(MemoryResolver::new());
    for addr in [&addr_a, &addr_b] {
        resolver
            .init(&ResolverInitOpts {
                selector_svr_addr: String::new(),
                svr_addr: addr.clone(),
                services: vec!["Whoami".to_owned()],
            })
            .await
            .unwrap();
    }

    let resolver_dyn: Arc<dyn Resolver> = resolver;
    SELECTORS.register("whoami-rr", Selector::new(resolver_dyn, Arc::new(RoundRobinBalancer::new())));

    let client = Client::new();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..4 {
        let opts = ClientOptions::new().with_selector_name("whoami-rr");
        let reply: String = client.invoke("/Whoami/Addr", &(), opts).await.unwrap();
        seen.insert(reply);
    }

    assert_eq!(seen, std::collections::HashSet::from([addr_a, addr_b]));

    handle_a.abort();
    handle_b.abort();
}
