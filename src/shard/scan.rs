//! Per-type counts and paginated local scans.
//!
//! Local scans emit ids type-id-major, then in bitmap order within a type,
//! which is the order the peered global scans stitch together shard by
//! shard.

use roaring::RoaringTreemap;

use crate::records::{Node, Relationship};
use crate::types::{NodeId, RelationshipId, TypeId};

use super::Shard;

fn paginate<'a>(maps: impl Iterator<Item = &'a RoaringTreemap>, skip: u64, limit: u64) -> Vec<u64> {
    let mut out = Vec::new();
    let mut skip = skip;
    let mut remaining = limit;
    for map in maps {
        if remaining == 0 {
            break;
        }
        let len = map.len();
        if skip >= len {
            skip -= len;
            continue;
        }
        let take = (len - skip).min(remaining);
        out.extend(map.iter().skip(skip as usize).take(take as usize));
        remaining -= take;
        skip = 0;
    }
    out
}

impl Shard {
    pub fn node_count(&self) -> u64 {
        self.node_type_counts().values().sum()
    }

    pub fn relationship_count(&self) -> u64 {
        self.relationship_type_counts().values().sum()
    }

    pub fn all_node_ids(&self, skip: u64, limit: u64) -> Vec<NodeId> {
        let maps = (1..=self.node_types.len()).map(|id| self.node_types.ids_of(id));
        paginate(maps, skip, limit)
    }

    pub fn all_node_ids_of_type(&self, type_id: TypeId, skip: u64, limit: u64) -> Vec<NodeId> {
        paginate(std::iter::once(self.node_types.ids_of(type_id)), skip, limit)
    }

    pub fn all_nodes(&self, skip: u64, limit: u64) -> Vec<Node> {
        self.nodes_by_ids(&self.all_node_ids(skip, limit))
    }

    pub fn all_nodes_of_type(&self, type_id: TypeId, skip: u64, limit: u64) -> Vec<Node> {
        self.nodes_by_ids(&self.all_node_ids_of_type(type_id, skip, limit))
    }

    pub fn all_relationship_ids(&self, skip: u64, limit: u64) -> Vec<RelationshipId> {
        let maps = (1..=self.relationship_types.len()).map(|id| self.relationship_types.ids_of(id));
        paginate(maps, skip, limit)
    }

    pub fn all_relationship_ids_of_type(
        &self,
        type_id: TypeId,
        skip: u64,
        limit: u64,
    ) -> Vec<RelationshipId> {
        paginate(
            std::iter::once(self.relationship_types.ids_of(type_id)),
            skip,
            limit,
        )
    }

    pub fn all_relationships(&self, skip: u64, limit: u64) -> Vec<Relationship> {
        self.relationships_by_ids(&self.all_relationship_ids(skip, limit))
    }

    pub fn all_relationships_of_type(
        &self,
        type_id: TypeId,
        skip: u64,
        limit: u64,
    ) -> Vec<Relationship> {
        self.relationships_by_ids(&self.all_relationship_ids_of_type(type_id, skip, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard() -> Shard {
        let mut shard = Shard::new(0, 1);
        shard.node_type_install("Node", 1);
        shard.node_type_install("User", 2);
        for key in ["a", "b", "c"] {
            shard.node_add_empty(1, key);
        }
        for key in ["d", "e"] {
            shard.node_add_empty(2, key);
        }
        shard
    }

    #[test]
    fn ids_come_out_type_major() {
        let shard = shard();
        let all = shard.all_node_ids(0, 100);
        assert_eq!(all.len(), 5);
        // Type 1 members precede type 2 members.
        let split = shard.node_type_count(1) as usize;
        for id in &all[..split] {
            assert_eq!(shard.node_type_of(*id), 1);
        }
        for id in &all[split..] {
            assert_eq!(shard.node_type_of(*id), 2);
        }
    }

    #[test]
    fn skip_and_limit_window_the_scan() {
        let shard = shard();
        let all = shard.all_node_ids(0, 100);
        assert_eq!(shard.all_node_ids(1, 2), all[1..3].to_vec());
        assert_eq!(shard.all_node_ids(4, 10), all[4..].to_vec());
        assert!(shard.all_node_ids(5, 10).is_empty());
        assert!(shard.all_node_ids(0, 0).is_empty());
    }

    #[test]
    fn typed_scans_only_see_their_type() {
        let shard = shard();
        assert_eq!(shard.all_node_ids_of_type(2, 0, 100).len(), 2);
        assert_eq!(shard.all_node_ids_of_type(1, 2, 100).len(), 1);
        assert!(shard.all_node_ids_of_type(9, 0, 100).is_empty());
        for node in shard.all_nodes_of_type(2, 0, 100) {
            assert_eq!(node.type_id, 2);
        }
    }

    #[test]
    fn counts_sum_types() {
        let shard = shard();
        assert_eq!(shard.node_count(), 5);
        assert_eq!(shard.relationship_count(), 0);
    }
}
