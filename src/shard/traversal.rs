//! Single-shard traversal primitives and the shard-grouping maps that feed
//! every peered fan-out.

use std::collections::HashMap;

use crate::adjacency::Link;
use crate::ids::shard_of_id;
use crate::records::{Node, Relationship};
use crate::types::{Direction, NodeId, NodeSelector, RelationshipId, ShardId};

use super::Shard;

impl Shard {
    /// `(peer, relationship)` pairs for the selected node, outgoing first.
    pub fn node_links(
        &self,
        selector: &NodeSelector,
        direction: Direction,
        rel_types: &[String],
    ) -> Vec<Link> {
        let index = match self.node_index(selector) {
            Some(index) => index,
            None => return Vec::new(),
        };
        let filter = self.relationship_type_filter(rel_types);
        let mut links = Vec::new();
        if direction.includes_out() {
            links.extend(self.outgoing[index].links(&filter));
        }
        if direction.includes_in() {
            links.extend(self.incoming[index].links(&filter));
        }
        links
    }

    /// The node's relationship ids partitioned by the shard that stores the
    /// record. Outgoing records are always local; an incoming entry's
    /// relationship lives with its remote starting node.
    pub fn sharded_relationship_ids(
        &self,
        selector: &NodeSelector,
        direction: Direction,
        rel_types: &[String],
    ) -> HashMap<ShardId, Vec<RelationshipId>> {
        let mut map: HashMap<ShardId, Vec<RelationshipId>> = HashMap::new();
        for link in self.node_links(selector, direction, rel_types) {
            map.entry(shard_of_id(link.rel_id)).or_default().push(link.rel_id);
        }
        map
    }

    /// The node's peer node ids partitioned by owning shard.
    pub fn sharded_node_ids(
        &self,
        selector: &NodeSelector,
        direction: Direction,
        rel_types: &[String],
    ) -> HashMap<ShardId, Vec<NodeId>> {
        let mut map: HashMap<ShardId, Vec<NodeId>> = HashMap::new();
        for link in self.node_links(selector, direction, rel_types) {
            map.entry(shard_of_id(link.node_id))
                .or_default()
                .push(link.node_id);
        }
        map
    }

    /// Batch record fetch; unknown ids come back as zero entities.
    pub fn relationships_by_ids(&self, ids: &[RelationshipId]) -> Vec<Relationship> {
        ids.iter().map(|&id| self.relationship_get(id)).collect()
    }

    pub fn nodes_by_ids(&self, ids: &[NodeId]) -> Vec<Node> {
        ids.iter().map(|&id| self.node_get_by_id(id)).collect()
    }
}
