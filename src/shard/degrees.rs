//! Degree computation over the per-node adjacency groups.

use crate::types::{Direction, NodeSelector};

use super::Shard;

impl Shard {
    /// Link count for the selected node, direction and relationship-type
    /// filter. An empty filter (or `Both` with an empty filter) counts
    /// everything; unknown type names match nothing. Missing nodes have
    /// degree 0.
    pub fn node_degree(
        &self,
        selector: &NodeSelector,
        direction: Direction,
        rel_types: &[String],
    ) -> u64 {
        let index = match self.node_index(selector) {
            Some(index) => index,
            None => return 0,
        };
        let filter = self.relationship_type_filter(rel_types);
        let mut degree = 0;
        if direction.includes_out() {
            degree += self.outgoing[index].degree(&filter);
        }
        if direction.includes_in() {
            degree += self.incoming[index].degree(&filter);
        }
        degree
    }
}
