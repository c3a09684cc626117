//! Balancing policies: pick one [`Node`] out of a resolved list.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::Rng;

use crate::{
    errors::{Result, SelectorError},
    node::Node,
};

/// Picks one node out of a resolved list for a given service name. Stateless
/// balancers (`random`, `weighted_round_robin`, `consistent_hash`) need no
/// per-call state; `round_robin` (see [`crate::round_robin::RoundRobinBalancer`])
/// keeps a picker per service name.
#[async_trait]
pub trait Balancer: Send + Sync {
    /// Choose a node for `service_name` from `nodes`, which is never empty
    /// (callers filter the empty case before calling `balance`).
    async fn balance(&self, service_name: &str, nodes: &[Node]) -> Result<Node>;
}

/// Picks uniformly at random.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomBalancer;

#[async_trait]
impl Balancer for RandomBalancer {
    async fn balance(&self, _service_name: &str, nodes: &[Node]) -> Result<Node> {
        let idx = rand::thread_rng().gen_range(0..nodes.len());
        Ok(nodes[idx].clone())
    }
}

/// Picks with probability proportional to each node's [`Node::weight`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRoundRobinBalancer;

#[async_trait]
impl Balancer for WeightedRoundRobinBalancer {
    async fn balance(&self, _service_name: &str, nodes: &[Node]) -> Result<Node> {
        let total: u32 = nodes.iter().map(Node::weight).sum();
        let mut pick = rand::thread_rng().gen_range(0..total.max(1));
        for node in nodes {
            let w = node.weight();
            if pick < w {
                return Ok(node.clone());
            }
            pick -= w;
        }
        // total == 0 (every weight parsed to 0) falls through; fall back to
        // the first node rather than panicking.
        Ok(nodes[0].clone())
    }
}

/// Consistent-hash ring keyed by [`Node::key`], with a configurable replica
/// count per node to smooth distribution.
#[derive(Debug, Clone)]
pub struct ConsistentHashBalancer {
    replicas: u32,
}

impl ConsistentHashBalancer {
    /// Build a ring with `replicas` virtual nodes per real node.
    #[must_use]
    pub fn new(replicas: u32) -> Self {
        Self { replicas: replicas.max(1) }
    }
}

impl Default for ConsistentHashBalancer {
    fn default() -> Self {
        Self::new(100)
    }
}

fn hash(s: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[async_trait]
impl Balancer for ConsistentHashBalancer {
    async fn balance(&self, service_name: &str, nodes: &[Node]) -> Result<Node> {
        let mut ring: BTreeMap<u64, usize> = BTreeMap::new();
        for (i, node) in nodes.iter().enumerate() {
            for replica in 0..self.replicas {
                ring.insert(hash(&format!("{}#{replica}", node.key)), i);
            }
        }
        let key = hash(service_name);
        let idx = ring
            .range(key..)
            .next()
            .or_else(|| ring.iter().next())
            .map(|(_, &i)| i)
            .ok_or_else(|| SelectorError::NoNodes(service_name.to_owned()))?;
        Ok(nodes[idx].clone())
    }
}
