//! Accept loop: binds `ServerOptions::address` on the configured network,
//! frame-reads each request, dispatches it, and frame-writes the reply.
//! Shuts down cleanly on `SIGINT`/`SIGTERM` — unlike the original, `SIGSEGV`
//! is not treated as a shutdown trigger.

use std::sync::Arc;

use tessera_codec::{ENVELOPE_CODECS, EnvelopeCodec, Serializer};
use tessera_core::{Network, ServerInterceptor, ServerOptions};
use tessera_plugin::{ResolverInitOpts, TRACING_PLUGINS, TracingInitOpts};
use tessera_proto::{Frame, FrameReader, ProtocolError};
use tokio::net::{TcpListener, TcpStream, UdpSocket};

use crate::{
    dispatch::{Dispatcher, handle_request},
    errors::{Result, ServerError},
    registry::ServiceRegistry,
};

/// A bound, not-yet-running Tessera server.
pub struct Server {
    options: ServerOptions,
    registry: Arc<ServiceRegistry>,
}

impl Server {
    /// Build a server that will listen per `options` and dispatch to `registry`.
    #[must_use]
    pub fn new(options: ServerOptions, registry: ServiceRegistry) -> Self {
        Self { options, registry: Arc::new(registry) }
    }

    /// Run the accept loop until `SIGINT`/`SIGTERM`, then tear down plugins
    /// and return.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is unparseable, a named
    /// codec/serializer tag is unknown, or a resolver plugin fails to
    /// initialize.
    pub async fn run(self) -> Result<()> {
        tessera_codec::register_defaults();
        tessera_plugin::register_defaults();

        let envelope_codec = ENVELOPE_CODECS.get(&self.options.protocol)?;
        let serializer = Serializer::by_tag(&self.options.serialization_type)
            .ok_or_else(|| ServerError::UnknownSerializer(self.options.serialization_type.clone()))?;

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&self.registry), serializer));
        let interceptors = self.build_interceptors().await?;

        let resolver_opts = ResolverInitOpts {
            selector_svr_addr: self.options.selector_svr_addr.clone().unwrap_or_default(),
            svr_addr: self.options.address.clone(),
            services: self.registry.service_names(),
        };
        self.init_resolvers(&resolver_opts).await?;

        let result = match self.options.network {
            Network::Tcp => self.run_tcp(dispatcher, interceptors, envelope_codec).await,
            Network::Udp => self.run_udp(dispatcher, interceptors, envelope_codec).await,
        };

        self.shutdown_resolvers(&resolver_opts).await?;
        result
    }

    async fn build_interceptors(&self) -> Result<Vec<Arc<dyn ServerInterceptor>>> {
        let mut interceptors = self.options.interceptors.clone();
        if let Some(span_name) = &self.options.tracing_span_name {
            let plugin = TRACING_PLUGINS.get("span")?;
            let interceptor = plugin
                .init(&TracingInitOpts {
                    tracing_svr_addr: self.options.tracing_svr_addr.clone(),
                    span_name: span_name.clone(),
                })
                .await?;
            interceptors.insert(0, interceptor);
        }
        Ok(interceptors)
    }

    async fn init_resolvers(&self, opts: &ResolverInitOpts) -> Result<()> {
        for name in &self.options.plugin_names {
            let plugin = tessera_plugin::RESOLVER_PLUGINS.get(name)?;
            plugin.init(opts).await?;
        }
        Ok(())
    }

    async fn shutdown_resolvers(&self, opts: &ResolverInitOpts) -> Result<()> {
        for name in &self.options.plugin_names {
            let plugin = tessera_plugin::RESOLVER_PLUGINS.get(name)?;
            plugin.shutdown(opts).await?;
        }
        Ok(())
    }

    async fn run_tcp(
        &self,
        dispatcher: Arc<Dispatcher>,
        interceptors: Vec<Arc<dyn ServerInterceptor>>,
        envelope_codec: Arc<dyn EnvelopeCodec>,
    ) -> Result<()> {
        let listener = TcpListener::bind(&self.options.address).await.map_err(ServerError::Bind)?;
        tracing::info!(address = %self.options.address, "tessera server listening (tcp)");

        let mut shutdown = Box::pin(shutdown_signal());
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            tracing::warn!(%err, "accept failed");
                            continue;
                        }
                    };
                    let dispatcher = Arc::clone(&dispatcher);
                    let interceptors = interceptors.clone();
                    let envelope_codec = Arc::clone(&envelope_codec);
                    tokio::spawn(async move {
                        tracing::debug!(%peer, "connection accepted");
                        if let Err(err) = serve_tcp_connection(stream, &dispatcher, &interceptors, envelope_codec.as_ref()).await {
                            tracing::debug!(%peer, %err, "connection closed");
                        }
                    });
                }
                () = &mut shutdown => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn run_udp(
        &self,
        dispatcher: Arc<Dispatcher>,
        interceptors: Vec<Arc<dyn ServerInterceptor>>,
        envelope_codec: Arc<dyn EnvelopeCodec>,
    ) -> Result<()> {
        let socket = UdpSocket::bind(&self.options.address).await.map_err(ServerError::Bind)?;
        tracing::info!(address = %self.options.address, "tessera server listening (udp)");

        let mut shutdown = Box::pin(shutdown_signal());
        let mut buf = vec![0u8; tessera_proto::MAX_PAYLOAD_LENGTH as usize + tessera_proto::FRAME_HEAD_LEN];
        loop {
            tokio::select! {
                received = socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(pair) => pair,
                        Err(err) => {
                            tracing::warn!(%err, "recv_from failed");
                            continue;
                        }
                    };
                    let response = process_datagram(&buf[..len], &dispatcher, &interceptors, envelope_codec.as_ref()).await;
                    if let Some(response) = response {
                        if let Err(err) = socket.send_to(&response, peer).await {
                            tracing::warn!(%peer, %err, "send_to failed");
                        }
                    }
                }
                () = &mut shutdown => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Bind address this server was configured with.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.options.address
    }
}

async fn serve_tcp_connection(
    mut stream: TcpStream,
    dispatcher: &Dispatcher,
    interceptors: &[Arc<dyn ServerInterceptor>],
    envelope_codec: &dyn EnvelopeCodec,
) -> Result<()> {
    let mut reader = FrameReader::new();
    loop {
        let frame = match reader.read_frame(&mut stream).await {
            Ok(frame) => frame,
            Err(ProtocolError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let req = envelope_codec.decode_request(&frame.payload)?;
        let resp = handle_request(dispatcher, interceptors, req).await;
        let encoded = envelope_codec.encode_response(&resp)?;

        Frame::new(encoded).write_to(&mut stream).await?;
    }
}

async fn process_datagram(
    datagram: &[u8],
    dispatcher: &Dispatcher,
    interceptors: &[Arc<dyn ServerInterceptor>],
    envelope_codec: &dyn EnvelopeCodec,
) -> Option<Vec<u8>> {
    let header = tessera_proto::FrameHeader::from_bytes(datagram).ok()?;
    let body_start = tessera_proto::FRAME_HEAD_LEN;
    let body_end = body_start + header.payload_len() as usize;
    let body = datagram.get(body_start..body_end)?;

    let req = envelope_codec.decode_request(body).ok()?;
    let resp = handle_request(dispatcher, interceptors, req).await;
    let encoded = envelope_codec.encode_response(&resp).ok()?;

    let frame = Frame::new(encoded);
    let mut out = Vec::with_capacity(tessera_proto::FRAME_HEAD_LEN + frame.payload.len());
    out.extend_from_slice(&frame.header.to_bytes());
    out.extend_from_slice(&frame.payload);
    Some(out)
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let sigterm = signal(SignalKind::terminate());
    match sigterm {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGTERM handler, watching SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
