//! Node lifecycle on one shard.

use crate::ids::{external_to_internal, shard_of_id};
use crate::properties::PropertyBag;
use crate::records::Node;
use crate::types::{NodeId, TypeId};

use super::{CleanupPlan, Shard};

impl Shard {
    /// Adds a node with no properties. Returns 0 on a duplicate `(type,
    /// key)` tuple or an invalid type id.
    pub fn node_add_empty(&mut self, type_id: TypeId, key: &str) -> NodeId {
        self.node_add(type_id, key, PropertyBag::new())
    }

    /// Adds a node. The `(type, key)` tuple must have no live entry; the
    /// freed slot with the smallest index is reused first, keeping external
    /// ids stable in their shard assignment.
    pub fn node_add(&mut self, type_id: TypeId, key: &str, properties: PropertyBag) -> NodeId {
        if !self.node_types.valid_type_id(type_id) {
            return 0;
        }
        let type_name = self.node_types.type_name(type_id).to_string();
        if let Some(keys) = self.node_keys.get(&type_name) {
            if keys.contains_key(key) {
                return 0;
            }
        }

        let internal = self.allocate_node_slot();
        let external = self.to_external(internal);
        self.nodes[internal as usize] = Node::with_properties(external, type_id, key, properties);
        self.node_keys
            .entry(type_name)
            .or_default()
            .insert(key.to_string(), external);
        self.node_types.add_id(type_id, external);
        external
    }

    /// O(1) id lookup through the per-type key index. 0 if absent.
    pub fn node_get_id(&self, type_name: &str, key: &str) -> NodeId {
        self.node_keys
            .get(type_name)
            .and_then(|keys| keys.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// The record for `id`, or the zero entity.
    pub fn node_get_by_id(&self, id: NodeId) -> Node {
        if self.valid_node_id(id) {
            self.nodes[external_to_internal(id) as usize].clone()
        } else {
            Node::default()
        }
    }

    pub fn node_get(&self, type_name: &str, key: &str) -> Node {
        self.node_get_by_id(self.node_get_id(type_name, key))
    }

    pub fn node_type_of(&self, id: NodeId) -> TypeId {
        if self.valid_node_id(id) {
            self.nodes[external_to_internal(id) as usize].type_id
        } else {
            0
        }
    }

    pub fn node_key_of(&self, id: NodeId) -> String {
        if self.valid_node_id(id) {
            self.nodes[external_to_internal(id) as usize].key.clone()
        } else {
            String::new()
        }
    }

    /// Removes a node and every relationship touching it whose counterpart
    /// lives on this shard. Counterparts on other shards must have been
    /// cleaned up first through the plans below.
    pub fn node_remove(&mut self, id: NodeId) -> bool {
        if !self.node_alive(id) {
            return false;
        }
        let internal = external_to_internal(id) as usize;
        let node = std::mem::take(&mut self.nodes[internal]);
        let outgoing = std::mem::take(&mut self.outgoing[internal]);
        let incoming = std::mem::take(&mut self.incoming[internal]);

        // Every outgoing relationship record is stored here (a relationship
        // belongs to the shard of its starting node).
        for group in outgoing.groups() {
            for link in &group.links {
                self.recycle_relationship(link.rel_id);
                if shard_of_id(link.node_id) == self.shard_id && link.node_id != id {
                    let peer = external_to_internal(link.node_id) as usize;
                    self.incoming[peer].remove(group.rel_type_id, link.rel_id);
                }
            }
        }

        for group in incoming.groups() {
            for link in &group.links {
                if shard_of_id(link.node_id) != self.shard_id {
                    // The record lives with the remote starting node.
                    continue;
                }
                if link.node_id != id {
                    let peer = external_to_internal(link.node_id) as usize;
                    self.outgoing[peer].remove(group.rel_type_id, link.rel_id);
                }
                self.recycle_relationship(link.rel_id);
            }
        }

        let type_name = self.node_types.type_name(node.type_id).to_string();
        if let Some(keys) = self.node_keys.get_mut(&type_name) {
            keys.remove(&node.key);
        }
        self.node_types.remove_id(node.type_id, id);
        self.deleted_nodes.insert(internal as u64);
        true
    }

    /// Incoming-side cleanup owed to other shards when `id` is removed:
    /// for each remote peer reached by an outgoing relationship, the peer's
    /// shard must drop the matching incoming entry.
    pub fn incoming_cleanup_plan(&self, id: NodeId) -> CleanupPlan {
        let mut plan = CleanupPlan::new();
        if !self.node_alive(id) {
            return plan;
        }
        let internal = external_to_internal(id) as usize;
        for group in self.outgoing[internal].groups() {
            for link in &group.links {
                let peer_shard = shard_of_id(link.node_id);
                if peer_shard != self.shard_id {
                    plan.entry(peer_shard)
                        .or_default()
                        .entry(group.rel_type_id)
                        .or_default()
                        .push(*link);
                }
            }
        }
        plan
    }

    /// Outgoing-side cleanup owed to other shards: for each remote starting
    /// node of an incoming relationship, that shard must drop its outgoing
    /// entry and recycle the relationship record it stores.
    pub fn outgoing_cleanup_plan(&self, id: NodeId) -> CleanupPlan {
        let mut plan = CleanupPlan::new();
        if !self.node_alive(id) {
            return plan;
        }
        let internal = external_to_internal(id) as usize;
        for group in self.incoming[internal].groups() {
            for link in &group.links {
                let peer_shard = shard_of_id(link.node_id);
                if peer_shard != self.shard_id {
                    plan.entry(peer_shard)
                        .or_default()
                        .entry(group.rel_type_id)
                        .or_default()
                        .push(*link);
                }
            }
        }
        plan
    }

    /// Applies another shard's incoming-side cleanup: drops the incoming
    /// entries that pointed at the removed node.
    pub fn apply_incoming_cleanup(
        &mut self,
        groups: std::collections::HashMap<TypeId, Vec<crate::adjacency::Link>>,
    ) -> bool {
        for (rel_type_id, links) in groups {
            for link in links {
                if !self.valid_node_id(link.node_id) {
                    continue;
                }
                let internal = external_to_internal(link.node_id) as usize;
                self.incoming[internal].remove(rel_type_id, link.rel_id);
            }
        }
        true
    }

    /// Applies another shard's outgoing-side cleanup: drops the outgoing
    /// entries that pointed at the removed node and recycles the
    /// relationship records stored here.
    pub fn apply_outgoing_cleanup(
        &mut self,
        groups: std::collections::HashMap<TypeId, Vec<crate::adjacency::Link>>,
    ) -> bool {
        for (rel_type_id, links) in groups {
            for link in links {
                if self.valid_node_id(link.node_id) {
                    let internal = external_to_internal(link.node_id) as usize;
                    self.outgoing[internal].remove(rel_type_id, link.rel_id);
                }
                self.recycle_relationship(link.rel_id);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::internal_to_external;

    fn shard() -> Shard {
        let mut shard = Shard::new(0, 1);
        shard.node_type_install("Node", 1);
        shard.node_type_install("User", 2);
        shard
    }

    #[test]
    fn add_assigns_dense_external_ids() {
        let mut shard = shard();
        assert_eq!(shard.node_add_empty(1, "one"), internal_to_external(0, 1));
        assert_eq!(shard.node_add_empty(1, "two"), internal_to_external(0, 2));
        assert_eq!(shard.node_add_empty(2, "one"), internal_to_external(0, 3));
    }

    #[test]
    fn duplicate_key_and_bad_type_return_zero() {
        let mut shard = shard();
        assert_ne!(shard.node_add_empty(1, "one"), 0);
        assert_eq!(shard.node_add_empty(1, "one"), 0);
        assert_eq!(shard.node_add_empty(0, "x"), 0);
        assert_eq!(shard.node_add_empty(9, "x"), 0);
    }

    #[test]
    fn empty_key_is_a_valid_key() {
        let mut shard = shard();
        let id = shard.node_add_empty(1, "");
        assert_ne!(id, 0);
        assert_eq!(shard.node_get_id("Node", ""), id);
        assert_ne!(shard.node_add_empty(1, "other"), 0);
        assert_eq!(shard.node_add_empty(1, ""), 0);
    }

    #[test]
    fn get_by_id_and_by_key_agree() {
        let mut shard = shard();
        let id = shard.node_add_empty(1, "one");
        assert_eq!(shard.node_get("Node", "one"), shard.node_get_by_id(id));
        assert_eq!(shard.node_type_of(id), 1);
        assert_eq!(shard.node_key_of(id), "one");
        assert!(shard.node_get_by_id(0).is_zero());
        assert!(shard.node_get("Node", "absent").is_zero());
    }

    #[test]
    fn remove_frees_the_tuple_and_reuses_the_slot() {
        let mut shard = shard();
        let first = shard.node_add_empty(1, "one");
        assert!(shard.node_remove(first));
        assert!(!shard.node_remove(first));
        assert!(shard.node_get_by_id(first).is_zero());
        assert_eq!(shard.node_get_id("Node", "one"), 0);

        // Same tuple, same slot, same external id.
        let again = shard.node_add_empty(1, "one");
        assert_eq!(again, first);
    }

    #[test]
    fn repeated_add_remove_does_not_grow_the_vector() {
        let mut shard = shard();
        let first = shard.node_add_empty(1, "one");
        for _ in 0..1000 {
            assert!(shard.node_remove(first));
            assert_eq!(shard.node_add_empty(1, "one"), first);
        }
        assert_eq!(external_to_internal(first), 1);
        assert_eq!(shard.nodes.len(), 2);
    }

    #[test]
    fn remove_cascades_through_local_relationships() {
        let mut shard = shard();
        shard.relationship_type_install("LOVES", 1);
        let a = shard.node_add_empty(1, "a");
        let b = shard.node_add_empty(1, "b");
        let c = shard.node_add_empty(1, "c");
        let ab = shard.relationship_add_same_shard(1, a, b, PropertyBag::new());
        let cb = shard.relationship_add_same_shard(1, c, b, PropertyBag::new());
        assert_ne!(ab, 0);
        assert_ne!(cb, 0);

        assert!(shard.node_remove(b));
        assert!(shard.relationship_get(ab).is_zero());
        assert!(shard.relationship_get(cb).is_zero());
        assert_eq!(shard.node_degree(&a.into(), crate::Direction::Both, &[]), 0);
        assert_eq!(shard.node_degree(&c.into(), crate::Direction::Both, &[]), 0);
        assert_eq!(shard.relationship_type_count(1), 0);
    }

    #[test]
    fn self_loops_are_removed_once() {
        let mut shard = shard();
        shard.relationship_type_install("LOVES", 1);
        let a = shard.node_add_empty(1, "a");
        let aa = shard.relationship_add_same_shard(1, a, a, PropertyBag::new());
        assert_ne!(aa, 0);
        assert!(shard.node_remove(a));
        assert!(shard.relationship_get(aa).is_zero());

        // The freed relationship slot is reusable exactly once.
        let b = shard.node_add_empty(1, "b");
        let c = shard.node_add_empty(1, "c");
        let bc = shard.relationship_add_same_shard(1, b, c, PropertyBag::new());
        assert_eq!(external_to_internal(bc), external_to_internal(aa));
    }
}
