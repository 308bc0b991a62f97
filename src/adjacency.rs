//! Per-node adjacency: relationship endpoints grouped by relationship type.
//!
//! Groups within a node are unordered; links within a group preserve
//! insertion order, and removal keeps that order (no swap-remove) so
//! traversal output stays stable. The number of distinct relationship types
//! touching one node is small, so groups are searched linearly.

use serde::Serialize;
use smallvec::SmallVec;

use crate::types::{NodeId, RelationshipId, TypeId};

/// One adjacency entry: the far node and the relationship connecting it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Link {
    pub node_id: NodeId,
    pub rel_id: RelationshipId,
}

#[derive(Clone, Debug, Default)]
pub struct Group {
    pub rel_type_id: TypeId,
    pub links: Vec<Link>,
}

/// One direction's adjacency for one node.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyList {
    groups: SmallVec<[Group; 2]>,
}

impl AdjacencyList {
    pub fn new() -> Self {
        Self::default()
    }

    fn group_mut(&mut self, rel_type_id: TypeId) -> &mut Group {
        // A missing group is created lazily on first insertion of its type.
        if let Some(i) = self.groups.iter().position(|g| g.rel_type_id == rel_type_id) {
            return &mut self.groups[i];
        }
        self.groups.push(Group {
            rel_type_id,
            links: Vec::new(),
        });
        self.groups.last_mut().unwrap()
    }

    pub fn add(&mut self, rel_type_id: TypeId, link: Link) {
        self.group_mut(rel_type_id).links.push(link);
    }

    /// Removes the link carrying `rel_id` from the group for `rel_type_id`,
    /// preserving the order of the remaining links.
    pub fn remove(&mut self, rel_type_id: TypeId, rel_id: RelationshipId) -> Option<Link> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.rel_type_id == rel_type_id)?;
        let position = group.links.iter().position(|l| l.rel_id == rel_id)?;
        Some(group.links.remove(position))
    }

    /// Link count across the groups selected by `filter` (empty = all).
    pub fn degree(&self, filter: &[TypeId]) -> u64 {
        self.groups
            .iter()
            .filter(|g| filter.is_empty() || filter.contains(&g.rel_type_id))
            .map(|g| g.links.len() as u64)
            .sum()
    }

    /// Links across the groups selected by `filter`, in group order then
    /// insertion order.
    pub fn links(&self, filter: &[TypeId]) -> Vec<Link> {
        self.groups
            .iter()
            .filter(|g| filter.is_empty() || filter.contains(&g.rel_type_id))
            .flat_map(|g| g.links.iter().copied())
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.links.is_empty())
    }
}
