//! Round-robin balancer with per-service picker state, including the
//! "fresh picker returns index 1, not 0" quirk of the original implementation
//! (see module-level test `fresh_picker_returns_index_one`).

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{balancer::Balancer, errors::Result, node::Node};

/// How long a picker's remembered `length`/`last_index` stay valid before a
/// resolve is treated as "the node set may have changed, reset."
const DEFAULT_PICKER_TTL: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, Copy)]
struct Picker {
    length: usize,
    last_update: Instant,
    last_index: usize,
}

impl Picker {
    fn fresh(length: usize) -> Self {
        Self { length, last_update: Instant::now(), last_index: 0 }
    }

    /// Advance and return the next index, given the current node count.
    fn next_index(&mut self, node_count: usize) -> usize {
        if self.last_update.elapsed() > DEFAULT_PICKER_TTL || node_count != self.length {
            *self = Self::fresh(node_count);
        }
        if self.last_index == self.length.saturating_sub(1) {
            self.last_index = 0;
        } else {
            self.last_index += 1;
        }
        self.last_index
    }
}

/// Round-robin balancer, one [`Picker`] per service name behind a
/// [`DashMap`]; each picker's own fields are serialized by its `Mutex`, so
/// concurrent `balance` calls for *different* services never contend and
/// calls for the *same* service never corrupt `last_index` (they may,
/// however, observe a benign duplicate pick under contention — accepted,
/// matching the original's documented race).
#[derive(Debug, Default)]
pub struct RoundRobinBalancer {
    pickers: DashMap<String, Arc<Mutex<Picker>>>,
}

impl RoundRobinBalancer {
    /// An empty balancer; pickers are created lazily per service name.
    #[must_use]
    pub fn new() -> Self {
        Self { pickers: DashMap::new() }
    }
}

#[async_trait]
impl Balancer for RoundRobinBalancer {
    async fn balance(&self, service_name: &str, nodes: &[Node]) -> Result<Node> {
        // Clone the per-service Mutex out from under the DashMap shard guard
        // before awaiting on it, so the shard lock is never held across an
        // await point.
        let picker_lock = self
            .pickers
            .entry(service_name.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(Picker::fresh(nodes.len()))))
            .clone();
        let mut picker = picker_lock.lock().await;
        let idx = picker.next_index(nodes.len());
        Ok(nodes[idx].clone())
    }
}
