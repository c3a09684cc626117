//! Routes a decoded request envelope to its service/method and runs the
//! server interceptor chain around the typed handler.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_codec::{Request, Response, Serializer};
use tessera_core::{CallContext, FrameworkError, ServerTerminal};

use crate::registry::ServiceRegistry;

/// The innermost server step: look up `(servicePath)` in the registry and
/// invoke the matched handler with the configured payload serializer.
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    serializer: Serializer,
}

impl Dispatcher {
    /// Build a dispatcher over `registry`, decoding payloads with `serializer`.
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>, serializer: Serializer) -> Self {
        Self { registry, serializer }
    }
}

#[async_trait]
impl ServerTerminal for Dispatcher {
    async fn call(&self, ctx: &mut CallContext, req: &Request) -> Result<Response, FrameworkError> {
        let service = self
            .registry
            .get(&ctx.service_name)
            .ok_or_else(|| FrameworkError::unknown_service(ctx.service_name.clone()))?;

        let method = service
            .method(&ctx.method)
            .ok_or_else(|| FrameworkError::unknown_method(ctx.service_name.clone(), ctx.method.clone()))?;

        let payload = method.call(ctx.clone(), req.payload.clone(), self.serializer).await?;
        Ok(Response::ok(payload))
    }
}

/// Decode a request envelope, run it through `interceptors` around
/// `dispatcher`, and re-encode the response. This is the per-frame entry
/// point the listener calls after reading a frame body off the wire.
pub async fn handle_request(
    dispatcher: &Dispatcher,
    interceptors: &[Arc<dyn tessera_core::ServerInterceptor>],
    req: Request,
) -> Response {
    let mut ctx = match CallContext::from_path(&req.service_path) {
        Ok(ctx) => ctx,
        Err(msg) => return error_response(FrameworkError::client_msg(msg)),
    };
    ctx.server_metadata = req.metadata.clone();

    match tessera_core::run_server_chain(interceptors, dispatcher, &mut ctx, &req).await {
        Ok(resp) => resp,
        Err(err) => error_response(err),
    }
}

fn error_response(err: FrameworkError) -> Response {
    Response::error(err.code, err.message)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use std::collections::HashMap;
    use tessera_core::ServiceBuilder;

    use super::*;

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Args {
        a: i64,
        b: i64,
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
    struct Sum {
        total: i64,
    }

    async fn add(_ctx: CallContext, args: Args) -> Result<Sum, FrameworkError> {
        Ok(Sum { total: args.a + args.b })
    }

    fn build_registry() -> Arc<ServiceRegistry> {
        let mut registry = ServiceRegistry::new();
        registry.register(ServiceBuilder::new("Calculator").method("Add", add).unwrap().build()).unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn dispatches_to_registered_method() {
        let registry = build_registry();
        let dispatcher = Dispatcher::new(registry, Serializer::Binary);
        let payload = Serializer::Binary.serialize(&Args { a: 2, b: 40 }).unwrap();
        let req = Request {
            service_path: "/Calculator/Add".to_owned(),
            payload,
            metadata: HashMap::new(),
        };

        let resp = handle_request(&dispatcher, &[], req).await;
        assert!(resp.is_ok());
        let sum: Sum = Serializer::Binary.deserialize(&resp.payload).unwrap();
        assert_eq!(sum, Sum { total: 42 });
    }

    #[tokio::test]
    async fn unknown_service_yields_framework_error() {
        let registry = build_registry();
        let dispatcher = Dispatcher::new(registry, Serializer::Binary);
        let req = Request {
            service_path: "/Nonexistent/Add".to_owned(),
            payload: Bytes::new(),
            metadata: HashMap::new(),
        };

        let resp = handle_request(&dispatcher, &[], req).await;
        assert_eq!(resp.ret_code, FrameworkError::UNKNOWN_SERVICE);
    }

    #[tokio::test]
    async fn unknown_method_yields_framework_error() {
        let registry = build_registry();
        let dispatcher = Dispatcher::new(registry, Serializer::Binary);
        let req = Request {
            service_path: "/Calculator/Subtract".to_owned(),
            payload: Bytes::new(),
            metadata: HashMap::new(),
        };

        let resp = handle_request(&dispatcher, &[], req).await;
        assert_eq!(resp.ret_code, FrameworkError::UNKNOWN_METHOD);
    }

    #[tokio::test]
    async fn malformed_service_path_yields_client_msg_error() {
        let registry = build_registry();
        let dispatcher = Dispatcher::new(registry, Serializer::Binary);
        let req =
            Request { service_path: "NoSlash".to_owned(), payload: Bytes::new(), metadata: HashMap::new() };

        let resp = handle_request(&dispatcher, &[], req).await;
        assert_eq!(resp.ret_code, FrameworkError::CLIENT_MSG_ERROR);
    }
}
