//! Peered node surface, including the cross-shard removal protocol.

use std::collections::HashMap;
use std::pin::Pin;

use tracing::warn;

use crate::error::Result;
use crate::properties::PropertyBag;
use crate::records::Node;
use crate::shard::CleanupPlan;
use crate::types::{NodeId, NodeSelector, ShardId, TypeId};

use super::Graph;

impl Graph {
    /// Adds a node with no properties. Returns 0 for a duplicate
    /// `(type, key)` tuple.
    pub async fn node_add_empty(&self, type_name: &str, key: &str) -> Result<NodeId> {
        self.node_add_with(type_name, key, PropertyBag::new()).await
    }

    /// Adds a node with a JSON-object property payload. Returns 0 for a
    /// duplicate tuple or a rejected payload.
    pub async fn node_add(&self, type_name: &str, key: &str, properties: &str) -> Result<NodeId> {
        let map = match crate::json::parse_properties(properties) {
            Some(map) => map,
            None => return Ok(0),
        };
        self.node_add_with(type_name, key, PropertyBag::from_map(map))
            .await
    }

    pub(crate) async fn node_add_with(
        &self,
        type_name: &str,
        key: &str,
        properties: PropertyBag,
    ) -> Result<NodeId> {
        let type_id = self.node_type_insert(type_name).await?;
        let target = crate::ids::shard_for_key(self.shard_count, type_name, key);
        let key = key.to_string();
        self.shard(target)?
            .invoke(move |s| s.node_add(type_id, &key, properties))
            .await
    }

    /// O(1) id lookup by `(type, key)`. 0 if absent.
    pub async fn node_get_id(&self, type_name: &str, key: &str) -> Result<NodeId> {
        let selector = NodeSelector::key(type_name, key);
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(0),
        };
        handle.invoke(move |s| s.resolve_node(&selector)).await
    }

    /// The record for the selector, or the zero entity.
    pub async fn node_get(&self, selector: impl Into<NodeSelector>) -> Result<Node> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(Node::default()),
        };
        handle
            .invoke(move |s| s.node_get_by_id(s.resolve_node(&selector)))
            .await
    }

    pub async fn node_type_id_of(&self, id: NodeId) -> Result<TypeId> {
        match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?.invoke(move |s| s.node_type_of(id)).await,
            None => Ok(0),
        }
    }

    pub async fn node_type_of(&self, id: NodeId) -> Result<String> {
        match self.route_id(id) {
            Some(shard_id) => {
                self.shard(shard_id)?
                    .invoke(move |s| {
                        let type_id = s.node_type_of(id);
                        s.node_type_name(type_id)
                    })
                    .await
            }
            None => Ok(String::new()),
        }
    }

    pub async fn node_key_of(&self, id: NodeId) -> Result<String> {
        match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?.invoke(move |s| s.node_key_of(id)).await,
            None => Ok(String::new()),
        }
    }

    /// Batch fetch preserving input order. Ids that resolve nowhere come
    /// back as zero entities.
    pub async fn nodes_get(&self, ids: &[NodeId]) -> Result<Vec<Node>> {
        let mut by_shard: HashMap<ShardId, Vec<NodeId>> = HashMap::new();
        for &id in ids {
            if let Some(shard_id) = self.route_id(id) {
                by_shard.entry(shard_id).or_default().push(id);
            }
        }
        let mut legs = Vec::new();
        for (shard_id, wanted) in by_shard {
            let leg = self
                .shard(shard_id)?
                .invoke(move |s| s.nodes_by_ids(&wanted));
            legs.push(leg);
        }
        let mut found: HashMap<NodeId, Node> = HashMap::new();
        for leg in legs {
            for node in leg.await? {
                if !node.is_zero() {
                    found.insert(node.id, node);
                }
            }
        }
        Ok(ids
            .iter()
            .map(|id| found.remove(id).unwrap_or_default())
            .collect())
    }

    /// Removes a node wherever its relationships reach.
    ///
    /// The owning shard first computes the per-shard cleanup owed to remote
    /// peers; the fan-out runs before the local remove so the counterpart
    /// entries disappear first. A failed fan-out leg returns false and is
    /// not undone; the local slot is only freed on complete success.
    pub async fn node_remove(&self, selector: impl Into<NodeSelector>) -> Result<bool> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };

        let probe = selector.clone();
        let (id, incoming_plan, outgoing_plan) = handle
            .invoke(move |s| {
                let id = s.resolve_node(&probe);
                if id == 0 {
                    (0, CleanupPlan::new(), CleanupPlan::new())
                } else {
                    (id, s.incoming_cleanup_plan(id), s.outgoing_cleanup_plan(id))
                }
            })
            .await?;
        if id == 0 {
            return Ok(false);
        }

        let mut legs: Vec<Pin<Box<dyn std::future::Future<Output = Result<bool>> + Send>>> =
            Vec::new();
        for (shard_id, groups) in incoming_plan {
            let leg = self
                .shard(shard_id)?
                .invoke(move |s| s.apply_incoming_cleanup(groups));
            legs.push(Box::pin(leg));
        }
        for (shard_id, groups) in outgoing_plan {
            let leg = self
                .shard(shard_id)?
                .invoke(move |s| s.apply_outgoing_cleanup(groups));
            legs.push(Box::pin(leg));
        }

        let mut all_ok = true;
        for leg in legs {
            if !matches!(leg.await, Ok(true)) {
                all_ok = false;
            }
        }
        if !all_ok {
            warn!(node = id, "node removal fan-out failed; dangling adjacency entries remain");
            return Ok(false);
        }

        handle.invoke(move |s| s.node_remove(id)).await
    }
}
