//! The `Invoke` engine: parse the call path, apply per-call options, run the
//! client interceptor chain around a transport-sending terminal, and
//! marshal/unmarshal the user payload with the configured serializer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tessera_codec::{Request, Response, Serializer};
use tessera_core::{
    CallContext, ClientInterceptor, ClientOptions, ClientTerminal, FrameworkError, Network, merge, run_client_chain,
};
use tessera_pool::Pool;
use tessera_plugin::{TRACING_PLUGINS, TracingInitOpts};

use crate::{
    errors::ClientError,
    transport::{TcpDialer, UdpDialer, send_tcp, send_udp},
};

/// A Tessera client: shared connection pools reused across every `invoke`.
/// Stateless otherwise — routing, serialization, and interceptors are all
/// supplied per call via [`ClientOptions`].
pub struct Client {
    tcp_pool: Arc<Pool<TcpDialer>>,
    udp_pool: Arc<Pool<UdpDialer>>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// A client with empty connection pools.
    #[must_use]
    pub fn new() -> Self {
        Self { tcp_pool: Arc::new(Pool::new(TcpDialer)), udp_pool: Arc::new(Pool::new(UdpDialer)) }
    }

    /// Call `path` (`/service/method`) with `req`, applying `opts`.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameworkError`] if `path` is malformed, marshalling
    /// fails, no target can be resolved, the transport send fails, or the
    /// server returned a non-zero `ret_code`.
    pub async fn invoke<Req, Rep>(
        &self,
        path: &str,
        req: &Req,
        opts: ClientOptions,
    ) -> Result<Rep, FrameworkError>
    where
        Req: Serialize + Sync,
        Rep: DeserializeOwned,
    {
        tessera_codec::register_defaults();
        tessera_plugin::register_defaults();

        let mut ctx = CallContext::from_path(path).map_err(FrameworkError::client_msg)?;
        ctx = ctx.with_timeout(opts.timeout);

        for auth in &opts.per_rpc_auth {
            let provided = auth.get_metadata(&ctx).await?;
            merge(&mut ctx.client_metadata, provided);
        }

        let serializer = Serializer::by_tag(&opts.serialization_type)
            .ok_or_else(|| FrameworkError::client_msg(format!("unknown serializer tag {:?}", opts.serialization_type)))?;
        let payload = serializer.serialize(req).map_err(|e| FrameworkError::client_msg(e.to_string()))?;

        let envelope_req =
            Request { service_path: ctx.service_path(), payload, metadata: ctx.client_metadata.clone() };

        let interceptors = self.build_interceptors(&opts).await.map_err(FrameworkError::from)?;
        let terminal = TransportTerminal { client: self, opts: &opts };
        let resp = run_client_chain(&interceptors, &terminal, &mut ctx, &envelope_req).await?;

        if resp.ret_code != FrameworkError::OK {
            return Err(FrameworkError::new(resp.ret_code, resp.ret_msg));
        }
        serializer.deserialize(&resp.payload).map_err(|e| FrameworkError::client_msg(e.to_string()))
    }

    async fn build_interceptors(&self, opts: &ClientOptions) -> crate::errors::Result<Vec<Arc<dyn ClientInterceptor>>> {
        let mut interceptors = opts.interceptors.clone();
        if let Some(span_name) = &opts.tracing_span_name {
            let plugin = TRACING_PLUGINS.get("span")?;
            let interceptor = plugin
                .init_client(&TracingInitOpts {
                    tracing_svr_addr: opts.tracing_svr_addr.clone(),
                    span_name: span_name.clone(),
                })
                .await?;
            interceptors.insert(0, interceptor);
        }
        Ok(interceptors)
    }
}

struct TransportTerminal<'a> {
    client: &'a Client,
    opts: &'a ClientOptions,
}

#[async_trait]
impl ClientTerminal for TransportTerminal<'_> {
    async fn call(&self, ctx: &mut CallContext, req: &Request) -> Result<Response, FrameworkError> {
        self.send(ctx, req).await.map_err(FrameworkError::from)
    }
}

impl TransportTerminal<'_> {
    async fn send(&self, ctx: &CallContext, req: &Request) -> crate::errors::Result<Response> {
        let envelope_codec = tessera_codec::ENVELOPE_CODECS.get(&self.opts.protocol)?;
        let encoded = envelope_codec.encode_request(req)?;

        let addr = self.resolve_target(ctx).await?;
        tracing::debug!(service = %ctx.service_name, method = %ctx.method, %addr, "sending call");

        let response_bytes = match self.opts.network {
            Network::Tcp => send_tcp(&self.client.tcp_pool, &addr, encoded, ctx.deadline).await?,
            Network::Udp => send_udp(&self.client.udp_pool, &addr, encoded, ctx.deadline).await?,
        };

        Ok(envelope_codec.decode_response(&response_bytes)?)
    }

    async fn resolve_target(&self, ctx: &CallContext) -> crate::errors::Result<String> {
        if let Some(target) = &self.opts.target {
            return Ok(target.clone());
        }
        let selector_name = self
            .opts
            .selector_name
            .as_deref()
            .ok_or_else(|| ClientError::ClientMsg("no target or selector_name configured".to_owned()))?;
        let selector = tessera_selector::SELECTORS.get(selector_name)?;
        let node = selector.select(&ctx.service_name).await?;
        Ok(node.addr().to_owned())
    }
}
