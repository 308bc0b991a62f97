//! Relationship lifecycle on one shard.
//!
//! A relationship record is stored on the shard of its starting node. When
//! the ending node lives elsewhere, insertion and removal split into an
//! outgoing half (here) and an incoming half (on the ending node's shard);
//! the halves are sequenced by the peered protocols on [`crate::Graph`].

use crate::adjacency::Link;
use crate::ids::external_to_internal;
use crate::properties::PropertyBag;
use crate::records::Relationship;
use crate::types::{NodeId, RelationshipId, TypeId};

use super::Shard;

impl Shard {
    /// Adds a relationship whose endpoints both live on this shard.
    /// Returns 0 for an invalid type or a dead endpoint.
    pub fn relationship_add_same_shard(
        &mut self,
        rel_type_id: TypeId,
        from: NodeId,
        to: NodeId,
        properties: PropertyBag,
    ) -> RelationshipId {
        if !self.relationship_types.valid_type_id(rel_type_id)
            || !self.node_alive(from)
            || !self.node_alive(to)
        {
            return 0;
        }
        let rel_id = self.install_relationship(rel_type_id, from, to, properties);
        let from_idx = external_to_internal(from) as usize;
        let to_idx = external_to_internal(to) as usize;
        self.outgoing[from_idx].add(rel_type_id, Link { node_id: to, rel_id });
        self.incoming[to_idx].add(rel_type_id, Link { node_id: from, rel_id });
        rel_id
    }

    /// Outgoing half of a cross-shard insert, invoked on the starting
    /// node's shard: allocates the record and the outgoing entry. Does not
    /// touch incoming.
    pub fn relationship_add_outgoing(
        &mut self,
        rel_type_id: TypeId,
        from: NodeId,
        to: NodeId,
        properties: PropertyBag,
    ) -> RelationshipId {
        if !self.relationship_types.valid_type_id(rel_type_id) || !self.node_alive(from) {
            return 0;
        }
        let rel_id = self.install_relationship(rel_type_id, from, to, properties);
        let from_idx = external_to_internal(from) as usize;
        self.outgoing[from_idx].add(rel_type_id, Link { node_id: to, rel_id });
        rel_id
    }

    /// Incoming half of a cross-shard insert, invoked on the ending node's
    /// shard with the already-allocated relationship id.
    pub fn relationship_add_incoming(
        &mut self,
        rel_type_id: TypeId,
        rel_id: RelationshipId,
        from: NodeId,
        to: NodeId,
    ) -> bool {
        if !self.node_alive(to) {
            return false;
        }
        let to_idx = external_to_internal(to) as usize;
        self.incoming[to_idx].add(rel_type_id, Link { node_id: from, rel_id });
        true
    }

    fn install_relationship(
        &mut self,
        rel_type_id: TypeId,
        from: NodeId,
        to: NodeId,
        properties: PropertyBag,
    ) -> RelationshipId {
        let internal = self.allocate_relationship_slot();
        let rel_id = self.to_external(internal);
        self.relationships[internal as usize] =
            Relationship::with_properties(rel_id, rel_type_id, from, to, properties);
        self.relationship_types.add_id(rel_type_id, rel_id);
        rel_id
    }

    /// The record for `id`, or the zero entity.
    pub fn relationship_get(&self, id: RelationshipId) -> Relationship {
        if self.valid_relationship_id(id) {
            self.relationships[external_to_internal(id) as usize].clone()
        } else {
            Relationship::default()
        }
    }

    pub fn relationship_type_of(&self, id: RelationshipId) -> TypeId {
        if self.valid_relationship_id(id) {
            self.relationships[external_to_internal(id) as usize].type_id
        } else {
            0
        }
    }

    pub fn relationship_start_node(&self, id: RelationshipId) -> NodeId {
        if self.valid_relationship_id(id) {
            self.relationships[external_to_internal(id) as usize].start_node_id
        } else {
            0
        }
    }

    pub fn relationship_end_node(&self, id: RelationshipId) -> NodeId {
        if self.valid_relationship_id(id) {
            self.relationships[external_to_internal(id) as usize].end_node_id
        } else {
            0
        }
    }

    /// Type and ending node of a live relationship, for sequencing removal.
    pub fn relationship_endpoints(&self, id: RelationshipId) -> Option<(TypeId, NodeId)> {
        if !self.relationship_alive(id) {
            return None;
        }
        let rel = &self.relationships[external_to_internal(id) as usize];
        Some((rel.type_id, rel.end_node_id))
    }

    /// Removes a relationship whose endpoints both live on this shard.
    pub fn relationship_remove_local(&mut self, id: RelationshipId) -> bool {
        let (rel_type_id, end) = match self.relationship_endpoints(id) {
            Some(pair) => pair,
            None => return false,
        };
        let start = self.relationships[external_to_internal(id) as usize].start_node_id;
        let start_idx = external_to_internal(start) as usize;
        self.outgoing[start_idx].remove(rel_type_id, id);
        if self.valid_node_id(end) {
            let end_idx = external_to_internal(end) as usize;
            self.incoming[end_idx].remove(rel_type_id, id);
        }
        self.recycle_relationship(id);
        true
    }

    /// Outgoing half of a cross-shard removal: drops the outgoing entry,
    /// recycles the record, and reports where the incoming half lives.
    pub fn relationship_remove_outgoing_half(
        &mut self,
        id: RelationshipId,
    ) -> Option<(TypeId, NodeId)> {
        let (rel_type_id, end) = self.relationship_endpoints(id)?;
        let start = self.relationships[external_to_internal(id) as usize].start_node_id;
        let start_idx = external_to_internal(start) as usize;
        self.outgoing[start_idx].remove(rel_type_id, id);
        self.recycle_relationship(id);
        Some((rel_type_id, end))
    }

    /// Incoming half of a cross-shard removal, on the ending node's shard.
    pub fn relationship_remove_incoming_half(
        &mut self,
        rel_type_id: TypeId,
        rel_id: RelationshipId,
        to: NodeId,
    ) -> bool {
        if !self.valid_node_id(to) {
            return false;
        }
        let to_idx = external_to_internal(to) as usize;
        self.incoming[to_idx].remove(rel_type_id, rel_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn shard() -> Shard {
        let mut shard = Shard::new(0, 1);
        shard.node_type_install("Node", 1);
        shard.relationship_type_install("LOVES", 1);
        shard.relationship_type_install("HATES", 2);
        shard
    }

    #[test]
    fn same_shard_add_links_both_endpoints() {
        let mut shard = shard();
        let a = shard.node_add_empty(1, "a");
        let b = shard.node_add_empty(1, "b");
        let rel = shard.relationship_add_same_shard(1, a, b, PropertyBag::new());
        assert_ne!(rel, 0);

        let record = shard.relationship_get(rel);
        assert_eq!(record.start_node_id, a);
        assert_eq!(record.end_node_id, b);
        assert_eq!(record.type_id, 1);
        assert_eq!(shard.node_degree(&a.into(), Direction::Out, &[]), 1);
        assert_eq!(shard.node_degree(&b.into(), Direction::In, &[]), 1);
        assert_eq!(shard.relationship_type_count(1), 1);
    }

    #[test]
    fn add_rejects_dead_endpoints_and_bad_types() {
        let mut shard = shard();
        let a = shard.node_add_empty(1, "a");
        let b = shard.node_add_empty(1, "b");
        assert_eq!(
            shard.relationship_add_same_shard(9, a, b, PropertyBag::new()),
            0
        );
        assert!(shard.node_remove(b));
        assert_eq!(
            shard.relationship_add_same_shard(1, a, b, PropertyBag::new()),
            0
        );
        assert_eq!(
            shard.relationship_add_same_shard(1, a, 0, PropertyBag::new()),
            0
        );
    }

    #[test]
    fn remove_unlinks_both_sides_and_frees_the_slot() {
        let mut shard = shard();
        let a = shard.node_add_empty(1, "a");
        let b = shard.node_add_empty(1, "b");
        let rel = shard.relationship_add_same_shard(1, a, b, PropertyBag::new());

        assert!(shard.relationship_remove_local(rel));
        assert!(!shard.relationship_remove_local(rel));
        assert!(shard.relationship_get(rel).is_zero());
        assert_eq!(shard.node_degree(&a.into(), Direction::Both, &[]), 0);
        assert_eq!(shard.node_degree(&b.into(), Direction::Both, &[]), 0);
        assert_eq!(shard.relationship_type_count(1), 0);

        let again = shard.relationship_add_same_shard(2, a, b, PropertyBag::new());
        assert_eq!(external_to_internal(again), external_to_internal(rel));
    }

    #[test]
    fn half_alive_state_is_visible_from_the_outgoing_side_only() {
        let mut shard = shard();
        let a = shard.node_add_empty(1, "a");
        // Pretend the ending node lives on another shard.
        let remote = crate::ids::internal_to_external(3, 1);
        let rel = shard.relationship_add_outgoing(1, a, remote, PropertyBag::new());
        assert_ne!(rel, 0);
        assert_eq!(shard.node_degree(&a.into(), Direction::Out, &[]), 1);
        assert_eq!(shard.relationship_get(rel).end_node_id, remote);
    }

    #[test]
    fn incoming_half_rejects_dead_targets() {
        let mut shard = shard();
        let a = shard.node_add_empty(1, "a");
        let remote = crate::ids::internal_to_external(3, 1);
        assert!(shard.relationship_add_incoming(1, crate::ids::internal_to_external(3, 1), remote, a));
        assert!(!shard.relationship_add_incoming(1, 7, remote, 0));
        assert_eq!(shard.node_degree(&a.into(), Direction::In, &[]), 1);
    }
}
