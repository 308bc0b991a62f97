//! Peered degree and traversal fan-out.
//!
//! A node's links (both directions) live on its own shard, so degree and
//! id-level traversal are single messages. Fetching the far records fans
//! out: the owning shard partitions the work by peer shard, every involved
//! shard is messaged once, and the replies are concatenated in shard order.

use crate::adjacency::Link;
use crate::error::Result;
use crate::records::{Node, Relationship};
use crate::types::{Direction, NodeSelector};

use super::Graph;

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Graph {
    /// Link count for the selected node. An empty `rel_types` filter counts
    /// every type.
    pub async fn node_degree(
        &self,
        selector: impl Into<NodeSelector>,
        direction: Direction,
        rel_types: &[&str],
    ) -> Result<u64> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(0),
        };
        let names = owned(rel_types);
        handle
            .invoke(move |s| s.node_degree(&selector, direction, &names))
            .await
    }

    /// `(peer, relationship)` id pairs for the selected node.
    pub async fn relationship_ids(
        &self,
        selector: impl Into<NodeSelector>,
        direction: Direction,
        rel_types: &[&str],
    ) -> Result<Vec<Link>> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(Vec::new()),
        };
        let names = owned(rel_types);
        handle
            .invoke(move |s| s.node_links(&selector, direction, &names))
            .await
    }

    /// The relationship records around the selected node, fetched from the
    /// shards that store them.
    pub async fn relationships(
        &self,
        selector: impl Into<NodeSelector>,
        direction: Direction,
        rel_types: &[&str],
    ) -> Result<Vec<Relationship>> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(Vec::new()),
        };
        let names = owned(rel_types);
        let mut sharded = handle
            .invoke(move |s| s.sharded_relationship_ids(&selector, direction, &names))
            .await?;

        let mut legs = Vec::new();
        for shard_id in 0..self.shard_count {
            if let Some(ids) = sharded.remove(&shard_id) {
                let leg = self
                    .shard(shard_id)?
                    .invoke(move |s| s.relationships_by_ids(&ids));
                legs.push(leg);
            }
        }
        let mut records = Vec::new();
        for leg in legs {
            records.extend(leg.await?);
        }
        Ok(records)
    }

    /// The far-side node records around the selected node.
    pub async fn neighbors(
        &self,
        selector: impl Into<NodeSelector>,
        direction: Direction,
        rel_types: &[&str],
    ) -> Result<Vec<Node>> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(Vec::new()),
        };
        let names = owned(rel_types);
        let mut sharded = handle
            .invoke(move |s| s.sharded_node_ids(&selector, direction, &names))
            .await?;

        let mut legs = Vec::new();
        for shard_id in 0..self.shard_count {
            if let Some(ids) = sharded.remove(&shard_id) {
                let leg = self.shard(shard_id)?.invoke(move |s| s.nodes_by_ids(&ids));
                legs.push(leg);
            }
        }
        let mut records = Vec::new();
        for leg in legs {
            records.extend(leg.await?);
        }
        Ok(records)
    }
}
