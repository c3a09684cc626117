//! Connection pool keyed by `(network, addr)`.
//!
//! A borrowed connection is closed on return rather than kept alive for
//! reuse — this implementation does not multiplex a connection across calls
//! (see the module's invariants). The per-key idle stack therefore stays
//! empty in practice, but keeping the data structure in place (rather than
//! dialing unconditionally) means upgrading to keep-alive pooling later is a
//! one-line change to [`PoolGuard`]'s `Drop` instead of a redesign.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use tessera_core::Network;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::Result;

/// Dials a fresh connection of type `Conn` for a given `(network, addr)`.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// The connection type this dialer produces (e.g. `tokio::net::TcpStream`).
    type Conn: Send;

    /// Dial `addr` over `network`.
    async fn dial(&self, network: Network, addr: &str) -> Result<Self::Conn>;
}

type Key = (Network, String);

/// A pool of connections, generic over how a fresh one is dialed.
pub struct Pool<D: Dialer> {
    dialer: D,
    idle: Mutex<HashMap<Key, VecDeque<D::Conn>>>,
}

impl<D: Dialer> Pool<D> {
    /// Build a pool backed by `dialer`.
    #[must_use]
    pub fn new(dialer: D) -> Self {
        Self { dialer, idle: Mutex::new(HashMap::new()) }
    }

    /// Acquire a connection for `(network, addr)`: reuse an idle one if the
    /// pool happens to hold one, otherwise dial fresh.
    pub async fn get(self: &Arc<Self>, network: Network, addr: &str) -> Result<PoolGuard<D>> {
        let key = (network, addr.to_owned());
        let existing = {
            let mut idle = self.idle.lock().await;
            idle.get_mut(&key).and_then(VecDeque::pop_front)
        };
        let conn = match existing {
            Some(conn) => conn,
            None => {
                debug!(?network, addr, "dialing fresh connection");
                self.dialer.dial(network, addr).await?
            }
        };
        Ok(PoolGuard { _pool: Arc::clone(self), _key: key, conn })
    }
}

/// A leased connection. Closed (dropped, not returned to the idle stack) when
/// it goes out of scope, matching the close-after-call semantics documented
/// on [`Pool`]. `_pool`/`_key` are kept (unused today) so a future
/// keep-alive upgrade can push `conn` back onto `self.pool.idle[self.key]`
/// from a real `Drop` impl instead of relying on the default one.
pub struct PoolGuard<D: Dialer> {
    _pool: Arc<Pool<D>>,
    _key: Key,
    conn: D::Conn,
}

impl<D: Dialer> std::ops::Deref for PoolGuard<D> {
    type Target = D::Conn;
    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<D: Dialer> std::ops::DerefMut for PoolGuard<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
