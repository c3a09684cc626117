//! Calculator client binary.
//!
//! # Usage
//!
//! ```bash
//! calculator-client --addr 127.0.0.1:9090 --op multiply --num1 3.5 --num2 6
//! calculator-client --addr 127.0.0.1:9090 --op divide --num1 1 --num2 0
//! ```

use std::{sync::Arc, time::Duration};

use calculator_demo::{CalculateReply, CalculateRequest, SERVICE_NAME};
use clap::Parser;
use tessera_client::Client;
use tessera_core::{BearerTokenAuth, ClientOptions, FrameworkError, Network};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Calculator RPC client
#[derive(Parser, Debug)]
#[command(name = "calculator-client")]
#[command(about = "Tessera calculator demo client")]
#[command(version)]
struct Args {
    /// Server address to dial directly. Mutually exclusive with `--selector`.
    #[arg(long)]
    addr: Option<String>,

    /// Selector name to resolve the target through instead of `--addr`.
    /// Only resolves nodes registered in this same process.
    #[arg(long)]
    selector: Option<String>,

    /// Transport network (`tcp` or `udp`).
    #[arg(long, default_value = "tcp")]
    network: String,

    /// Operation: `add`, `subtract`, `multiply`, `divide`.
    #[arg(long, default_value = "add")]
    op: String,

    /// First operand.
    #[arg(long, default_value_t = 0.0)]
    num1: f64,

    /// Second operand.
    #[arg(long, default_value_t = 0.0)]
    num2: f64,

    /// Bearer token to attach, if the server requires one.
    #[arg(long)]
    token: Option<String>,

    /// Span name to trace this call under. When set, attaches a
    /// `traceparent` to the call's metadata via the tracing plugin.
    #[arg(long)]
    tracing_span_name: Option<String>,

    /// Call deadline in milliseconds. `0` means no deadline.
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,

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

    let mut options = ClientOptions::new().with_network(network).with_timeout(Duration::from_millis(args.timeout_ms));
    match (&args.addr, &args.selector) {
        (Some(addr), _) => options = options.with_target(addr.clone()),
        (None, Some(selector)) => options = options.with_selector_name(selector.clone()),
        (None, None) => return Err("one of --addr or --selector is required".into()),
    }
    if let Some(token) = &args.token {
        options = options.with_auth(Arc::new(BearerTokenAuth::new(token.clone())));
    }
    if let Some(span_name) = &args.tracing_span_name {
        options = options.with_tracing(span_name.clone(), None);
    }

    let req = CalculateRequest { operation: args.op.clone(), num1: args.num1, num2: args.num2 };
    tracing::info!(?req, "calling Calculate");

    let client = Client::new();
    let path = format!("/{SERVICE_NAME}/Calculate");
    match client.invoke::<CalculateRequest, CalculateReply>(&path, &req, options).await {
        Ok(reply) => tracing::info!(result = reply.result, "call succeeded"),
        Err(err) => {
            tracing::error!(code = err.code, message = %err.message, "call failed");
            return Err(err.into());
        }
    }

    Ok(())
}
