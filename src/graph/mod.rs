//! The graph root: owns the shard workers and exposes the peered surface.
//!
//! Peered operations are callable from any thread and return futures. Each
//! one routes to the owning shard through its mailbox and, where an
//! operation's endpoints span shards, runs the multi-shard protocol from
//! this side: the orchestration suspends only on sending to a shard,
//! awaiting one reply, or awaiting a fan-out join. Shard workers themselves
//! never wait on each other.

mod nodes;
mod properties;
mod relationships;
mod scan;
mod traversal;
mod types;

use std::thread::JoinHandle;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::{GraphError, Result};
use crate::ids::{shard_for_key, shard_of_id};
use crate::runtime::{spawn_shard, ShardHandle};
use crate::types::{NodeSelector, ShardId, TypeId};

/// Engine-wide totals, aggregated across shards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub shards: ShardId,
    pub nodes: u64,
    pub relationships: u64,
    pub node_types: TypeId,
    pub relationship_types: TypeId,
}

pub struct Graph {
    name: String,
    shard_count: ShardId,
    shards: Vec<ShardHandle>,
    workers: Vec<JoinHandle<()>>,
    /// Single-writer locks for the type-id broadcast; held across the whole
    /// assign-and-broadcast sequence, never across the data operation that
    /// follows it.
    node_type_lock: Mutex<()>,
    relationship_type_lock: Mutex<()>,
}

impl Graph {
    /// An engine with one shard per available core (capped by the 8-bit
    /// shard byte of the id layout).
    pub fn new(name: impl Into<String>) -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(256);
        Self::with_shards(name, cores as ShardId)
    }

    pub fn with_shards(name: impl Into<String>, shard_count: ShardId) -> Self {
        assert!(
            shard_count > 0 && shard_count <= 256,
            "shard count must be in 1..=256"
        );
        Self {
            name: name.into(),
            shard_count,
            shards: Vec::new(),
            workers: Vec::new(),
            node_type_lock: Mutex::new(()),
            relationship_type_lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shard_count(&self) -> ShardId {
        self.shard_count
    }

    /// Materializes the shard workers. Returns once every mailbox is live.
    pub fn start(&mut self) {
        if !self.shards.is_empty() {
            return;
        }
        for shard_id in 0..self.shard_count {
            let (handle, worker) = spawn_shard(shard_id, self.shard_count);
            self.shards.push(handle);
            self.workers.push(worker);
        }
        info!(name = %self.name, shards = self.shard_count, "graph started");
    }

    /// Shuts the shards down in reverse start order and joins their
    /// threads.
    pub fn stop(&mut self) {
        if self.shards.is_empty() && self.workers.is_empty() {
            return;
        }
        self.shards.clear();
        while let Some(worker) = self.workers.pop() {
            let _ = worker.join();
        }
        info!(name = %self.name, "graph stopped");
    }

    /// Resets every shard to its initial state.
    pub async fn clear(&self) -> Result<()> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| handle.invoke(|shard| shard.clear()))
            .collect();
        for future in futures {
            future.await?;
        }
        Ok(())
    }

    /// Divides the hint across shards and pre-sizes their record vectors.
    pub async fn reserve(&self, nodes: u64, relationships: u64) -> Result<()> {
        let per_shard_nodes = nodes / u64::from(self.shard_count);
        let per_shard_rels = relationships / u64::from(self.shard_count);
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| {
                handle.invoke(move |shard| shard.reserve(per_shard_nodes, per_shard_rels))
            })
            .collect();
        for future in futures {
            future.await?;
        }
        Ok(())
    }

    /// The ids of the running shards, in start order.
    pub fn shard_ids(&self) -> Vec<ShardId> {
        (0..self.shard_count).collect()
    }

    /// Engine-wide counts. Types are read from shard 0, the interner
    /// leader; entity counts are summed across shards.
    pub async fn stats(&self) -> Result<GraphStats> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| {
                handle.invoke(|shard| (shard.node_count(), shard.relationship_count()))
            })
            .collect();
        let mut stats = GraphStats {
            shards: self.shard_count,
            ..GraphStats::default()
        };
        for future in futures {
            let (nodes, relationships) = future.await?;
            stats.nodes += nodes;
            stats.relationships += relationships;
        }
        let (node_types, relationship_types) = self
            .shard(0)?
            .invoke(|shard| (shard.node_types_count(), shard.relationship_types_count()))
            .await?;
        stats.node_types = node_types;
        stats.relationship_types = relationship_types;
        Ok(stats)
    }

    pub(crate) fn shards(&self) -> Result<&[ShardHandle]> {
        if self.shards.is_empty() {
            return Err(GraphError::InvalidArgument(
                "graph is not started".to_string(),
            ));
        }
        Ok(&self.shards)
    }

    pub(crate) fn shard(&self, shard_id: ShardId) -> Result<&ShardHandle> {
        self.shards()?
            .get(shard_id as usize)
            .ok_or(GraphError::ShardUnavailable(shard_id))
    }

    /// The shard a selector routes to: the id's shard byte, or the
    /// `(type, key)` hash bucket. `None` when the shard byte is out of
    /// range, which every read maps to the zero entity.
    pub(crate) fn route(&self, selector: &NodeSelector) -> Option<ShardId> {
        let shard_id = match selector {
            NodeSelector::Id(id) => shard_of_id(*id),
            NodeSelector::Key { type_name, key } => {
                shard_for_key(self.shard_count, type_name, key)
            }
        };
        (shard_id < self.shard_count).then_some(shard_id)
    }

    pub(crate) fn route_id(&self, id: u64) -> Option<ShardId> {
        let shard_id = shard_of_id(id);
        (id != 0 && shard_id < self.shard_count).then_some(shard_id)
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        self.stop();
    }
}
