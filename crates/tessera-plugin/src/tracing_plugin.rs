//! Tracing plugin: wraps each dispatched call in a [`tracing::Span`] and
//! propagates a correlation id through envelope metadata under
//! [`TRACEPARENT_KEY`]. Ships no exporter (OTLP/Jaeger client); wiring a
//! `tracing-subscriber` layer that forwards to one is an application concern.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use rand::RngCore;
use tessera_codec::{Request, Response};
use tessera_core::{CallContext, ClientInterceptor, ClientNext, FrameworkError, ServerInterceptor, ServerNext};
use tracing::{Instrument, info_span};

use crate::{
    errors::Result as PluginResult,
    plugin::{TracingInitOpts, TracingPlugin},
};

/// Metadata key carrying the call's correlation id.
pub const TRACEPARENT_KEY: &str = "traceparent";

fn new_trace_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Tracing plugin whose interceptor opens an `info_span!` per call, named
/// `opts.span_name`, and ensures every call carries a `traceparent`.
#[derive(Debug, Default)]
pub struct SpanTracingPlugin;

#[async_trait]
impl TracingPlugin for SpanTracingPlugin {
    async fn init(&self, opts: &TracingInitOpts) -> PluginResult<Arc<dyn ServerInterceptor>> {
        Ok(Arc::new(SpanTracingInterceptor { span_name: opts.span_name.clone() }))
    }

    async fn init_client(&self, opts: &TracingInitOpts) -> PluginResult<Arc<dyn ClientInterceptor>> {
        Ok(Arc::new(SpanTracingClientInterceptor { span_name: opts.span_name.clone() }))
    }
}

struct SpanTracingInterceptor {
    span_name: String,
}

#[async_trait]
impl ServerInterceptor for SpanTracingInterceptor {
    async fn intercept(
        &self,
        ctx: &mut CallContext,
        req: &Request,
        next: ServerNext<'_>,
    ) -> Result<Response, FrameworkError> {
        let trace_id = req
            .metadata
            .get(TRACEPARENT_KEY)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_else(new_trace_id);

        ctx.server_metadata.insert(TRACEPARENT_KEY.to_owned(), Bytes::from(trace_id.clone()));

        let span = info_span!("rpc.call", name = %self.span_name, service = %ctx.service_name, method = %ctx.method, trace_id = %trace_id);
        next.call(ctx, req).instrument(span).await
    }
}

/// Originates a `traceparent` for the outbound call (or forwards one already
/// present in `ctx.client_metadata`, e.g. set by an upstream call this
/// process is itself handling) and attaches it to the request passed
/// downstream. `req` itself can't be mutated in place, so this clones it with
/// the extra metadata key set before continuing the chain.
struct SpanTracingClientInterceptor {
    span_name: String,
}

#[async_trait]
impl ClientInterceptor for SpanTracingClientInterceptor {
    async fn intercept(
        &self,
        ctx: &mut CallContext,
        req: &Request,
        next: ClientNext<'_>,
    ) -> Result<Response, FrameworkError> {
        let trace_id = req
            .metadata
            .get(TRACEPARENT_KEY)
            .or_else(|| ctx.client_metadata.get(TRACEPARENT_KEY))
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_else(new_trace_id);

        let span = info_span!("rpc.call", name = %self.span_name, service = %ctx.service_name, method = %ctx.method, trace_id = %trace_id);

        if req.metadata.contains_key(TRACEPARENT_KEY) {
            next.call(ctx, req).instrument(span).await
        } else {
            let mut outbound = req.clone();
            outbound.metadata.insert(TRACEPARENT_KEY.to_owned(), Bytes::from(trace_id));
            next.call(ctx, &outbound).instrument(span).await
        }
    }
}
