//! Single-threaded shard state: the per-shard storage of nodes,
//! relationships, type interners, adjacency and the slot-reuse allocator.
//!
//! A shard owns a disjoint partition of the graph. Everything here is
//! synchronous and only ever touched by the shard's worker thread; the
//! cross-shard protocols live on [`crate::Graph`].

mod degrees;
mod nodes;
mod relationships;
mod properties;
mod scan;
mod traversal;

use std::collections::{BTreeSet, HashMap};

use roaring::RoaringTreemap;

use crate::adjacency::{AdjacencyList, Link};
use crate::ids::{external_to_internal, internal_to_external, valid_external_id};
use crate::interner::TypeInterner;
use crate::records::{Node, Relationship};
use crate::types::{NodeId, NodeSelector, RelationshipId, ShardId, TypeId};

/// Cross-shard cleanup work for one node removal, grouped by the shard that
/// must perform it, then by relationship type.
pub type CleanupPlan = HashMap<ShardId, HashMap<TypeId, Vec<Link>>>;

pub struct Shard {
    shard_id: ShardId,
    shard_count: ShardId,
    /// `(type name, key)` index: exactly one live node per tuple.
    node_keys: HashMap<String, HashMap<String, NodeId>>,
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    outgoing: Vec<AdjacencyList>,
    incoming: Vec<AdjacencyList>,
    deleted_nodes: RoaringTreemap,
    deleted_relationships: RoaringTreemap,
    node_types: TypeInterner,
    relationship_types: TypeInterner,
}

impl Shard {
    pub fn new(shard_id: ShardId, shard_count: ShardId) -> Self {
        // Index 0 of every record vector is the reserved zero entity.
        Self {
            shard_id,
            shard_count,
            node_keys: HashMap::new(),
            nodes: vec![Node::default()],
            relationships: vec![Relationship::default()],
            outgoing: vec![AdjacencyList::new()],
            incoming: vec![AdjacencyList::new()],
            deleted_nodes: RoaringTreemap::new(),
            deleted_relationships: RoaringTreemap::new(),
            node_types: TypeInterner::new(),
            relationship_types: TypeInterner::new(),
        }
    }

    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    pub fn shard_count(&self) -> ShardId {
        self.shard_count
    }

    /// Resets the shard to its initial state: zero entities, empty interners,
    /// empty indexes.
    pub fn clear(&mut self) {
        self.node_keys.clear();
        self.nodes = vec![Node::default()];
        self.relationships = vec![Relationship::default()];
        self.outgoing = vec![AdjacencyList::new()];
        self.incoming = vec![AdjacencyList::new()];
        self.deleted_nodes.clear();
        self.deleted_relationships.clear();
        self.node_types = TypeInterner::new();
        self.relationship_types = TypeInterner::new();
    }

    /// Pre-sizes the record vectors. Hints too large to represent are
    /// silently ignored.
    pub fn reserve(&mut self, reserved_nodes: u64, reserved_relationships: u64) {
        if let Ok(n) = usize::try_from(reserved_nodes) {
            let _ = self.nodes.try_reserve(n);
            let _ = self.outgoing.try_reserve(n);
            let _ = self.incoming.try_reserve(n);
        }
        if let Ok(n) = usize::try_from(reserved_relationships) {
            let _ = self.relationships.try_reserve(n);
        }
    }

    pub(crate) fn to_external(&self, internal_id: u64) -> u64 {
        internal_to_external(self.shard_id, internal_id)
    }

    /// Structural validity of a node id for this shard: non-zero, in range,
    /// and the shard byte matches.
    pub fn valid_node_id(&self, id: NodeId) -> bool {
        valid_external_id(self.shard_id, id, self.nodes.len())
    }

    /// Structural validity of a relationship id, symmetric with nodes.
    pub fn valid_relationship_id(&self, id: RelationshipId) -> bool {
        valid_external_id(self.shard_id, id, self.relationships.len())
    }

    /// A structurally valid id whose slot holds a live record with that id.
    /// Dead slots hold the zero entity and fail the id comparison.
    pub fn node_alive(&self, id: NodeId) -> bool {
        self.valid_node_id(id) && self.nodes[external_to_internal(id) as usize].id == id
    }

    pub fn relationship_alive(&self, id: RelationshipId) -> bool {
        self.valid_relationship_id(id)
            && self.relationships[external_to_internal(id) as usize].id == id
    }

    /// Resolves a selector to a live node id on this shard, or 0.
    pub fn resolve_node(&self, selector: &NodeSelector) -> NodeId {
        match selector {
            NodeSelector::Id(id) => {
                if self.node_alive(*id) {
                    *id
                } else {
                    0
                }
            }
            NodeSelector::Key { type_name, key } => self.node_get_id(type_name, key),
        }
    }

    pub(crate) fn node_index(&self, selector: &NodeSelector) -> Option<usize> {
        let id = self.resolve_node(selector);
        if id == 0 {
            None
        } else {
            Some(external_to_internal(id) as usize)
        }
    }

    // ---- slot allocation ------------------------------------------------

    /// Smallest deleted slot if any, else a fresh slot appended to the node
    /// vector (with its adjacency rows).
    pub(crate) fn allocate_node_slot(&mut self) -> u64 {
        if let Some(internal) = self.deleted_nodes.min() {
            self.deleted_nodes.remove(internal);
            internal
        } else {
            let internal = self.nodes.len() as u64;
            self.nodes.push(Node::default());
            self.outgoing.push(AdjacencyList::new());
            self.incoming.push(AdjacencyList::new());
            internal
        }
    }

    pub(crate) fn allocate_relationship_slot(&mut self) -> u64 {
        if let Some(internal) = self.deleted_relationships.min() {
            self.deleted_relationships.remove(internal);
            internal
        } else {
            let internal = self.relationships.len() as u64;
            self.relationships.push(Relationship::default());
            internal
        }
    }

    /// Overwrites a relationship slot with the zero entity and marks it for
    /// reuse. Safe to call twice for the same id; the second call is a no-op
    /// because the slot no longer carries the id.
    pub(crate) fn recycle_relationship(&mut self, rel_id: RelationshipId) {
        if !self.relationship_alive(rel_id) {
            return;
        }
        let internal = external_to_internal(rel_id);
        let rel = std::mem::take(&mut self.relationships[internal as usize]);
        self.relationship_types.remove_id(rel.type_id, rel_id);
        self.deleted_relationships.insert(internal);
    }

    // ---- type surface ---------------------------------------------------

    pub fn node_types_count(&self) -> TypeId {
        self.node_types.len()
    }

    pub fn node_type_count(&self, type_id: TypeId) -> u64 {
        self.node_types.count(type_id)
    }

    pub fn node_type_counts(&self) -> std::collections::BTreeMap<TypeId, u64> {
        self.node_types.counts()
    }

    pub fn node_types_list(&self) -> BTreeSet<String> {
        self.node_types.types()
    }

    pub fn node_type_name(&self, type_id: TypeId) -> String {
        self.node_types.type_name(type_id).to_string()
    }

    pub fn node_type_id(&self, name: &str) -> TypeId {
        self.node_types.type_id(name)
    }

    pub fn node_type_get_or_insert(&mut self, name: &str) -> TypeId {
        self.node_types.get_or_insert(name)
    }

    pub fn node_type_install(&mut self, name: &str, type_id: TypeId) -> bool {
        self.node_types.install(name, type_id)
    }

    pub fn relationship_types_count(&self) -> TypeId {
        self.relationship_types.len()
    }

    pub fn relationship_type_count(&self, type_id: TypeId) -> u64 {
        self.relationship_types.count(type_id)
    }

    pub fn relationship_type_counts(&self) -> std::collections::BTreeMap<TypeId, u64> {
        self.relationship_types.counts()
    }

    pub fn relationship_types_list(&self) -> BTreeSet<String> {
        self.relationship_types.types()
    }

    pub fn relationship_type_name(&self, type_id: TypeId) -> String {
        self.relationship_types.type_name(type_id).to_string()
    }

    pub fn relationship_type_id(&self, name: &str) -> TypeId {
        self.relationship_types.type_id(name)
    }

    pub fn relationship_type_get_or_insert(&mut self, name: &str) -> TypeId {
        self.relationship_types.get_or_insert(name)
    }

    pub fn relationship_type_install(&mut self, name: &str, type_id: TypeId) -> bool {
        self.relationship_types.install(name, type_id)
    }

    /// Maps relationship type names to ids for filtering. Unknown names map
    /// to the reserved id 0, which no adjacency group ever carries, so they
    /// match nothing. An empty slice means "no filter".
    pub(crate) fn relationship_type_filter(&self, names: &[String]) -> Vec<TypeId> {
        names
            .iter()
            .map(|name| self.relationship_types.type_id(name))
            .collect()
    }
}
