//! Calculator server binary.
//!
//! # Usage
//!
//! ```bash
//! calculator-server --addr 0.0.0.0:9090
//! calculator-server --addr 0.0.0.0:9090 --network udp --token secret
//! ```

use calculator_demo::build_service;
use clap::Parser;
use tessera_core::{FrameworkError, Network, RequireBearerServerInterceptor, ServerOptions};
use tessera_server::{Server, ServiceRegistry};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Calculator RPC server
#[derive(Parser, Debug)]
#[command(name = "calculator-server")]
#[command(about = "Tessera calculator demo server")]
#[command(version)]
struct Args {
    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0:9090")]
    addr: String,

    /// Transport network (`tcp` or `udp`).
    #[arg(long, default_value = "tcp")]
    network: String,

    /// Name this server registers its address under via the `memory`
    /// resolver plugin. Only meaningful to clients running in the same
    /// process (the in-memory resolver isn't networked).
    #[arg(long)]
    selector: Option<String>,

    /// If set, require `Bearer <token>` on every call.
    #[arg(long)]
    token: Option<String>,

    /// Span name to wrap every dispatched call in, via the tracing plugin.
    #[arg(long)]
    tracing_span_name: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let network = Network::parse(&args.network)
        .ok_or_else(|| FrameworkError::network_not_supported(args.network.clone()))?;

    let mut registry = ServiceRegistry::new();
    registry.register(build_service()?).map_err(|err| err.to_string())?;

    let mut options = ServerOptions::new(args.addr.clone()).with_network(network);
    if let Some(token) = &args.token {
        options = options.with_interceptor(std::sync::Arc::new(RequireBearerServerInterceptor::new(token)));
    }
    if let Some(selector) = &args.selector {
        options = options.with_selector_svr_addr(args.addr.clone()).with_plugin("memory");
        tracing::info!(%selector, "registering under memory resolver plugin");
    }
    if let Some(span_name) = &args.tracing_span_name {
        options = options.with_tracing(span_name.clone(), None);
    }

    tracing::info!(addr = %args.addr, network = %args.network, "calculator server starting");
    let server = Server::new(options, registry);
    server.run().await?;

    Ok(())
}
