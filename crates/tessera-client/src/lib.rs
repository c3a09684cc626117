//! Client-side `Invoke` engine: parses the call path, applies
//! [`tessera_core::ClientOptions`], runs the client interceptor chain, and
//! sends the marshaled request over a pooled TCP/UDP connection resolved via
//! [`tessera_selector`].

mod client;
mod errors;
mod transport;

pub use client::Client;
pub use errors::{ClientError, Result};
pub use transport::{TcpDialer, UdpDialer};
