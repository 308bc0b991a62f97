//! Core identifier types shared across the engine.

/// External node identifier: `(internal_index << 8) | shard_id`. Id 0 is
/// the invalid/sentinel value at every interface.
pub type NodeId = u64;

/// External relationship identifier. Same layout as [`NodeId`]; a
/// relationship id always carries the shard of its starting node.
pub type RelationshipId = u64;

/// Interned type identifier. Id 0 is the reserved empty type.
pub type TypeId = u16;

/// Shard identifier. Only the low 8 bits are representable in the external
/// id layout, so an engine never runs more than 256 shards.
pub type ShardId = u16;

/// Addresses a node either by external id or by its unique `(type, key)`
/// tuple. Every node-addressed operation accepts both forms through one
/// code path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeSelector {
    Id(NodeId),
    Key { type_name: String, key: String },
}

impl NodeSelector {
    pub fn key(type_name: impl Into<String>, key: impl Into<String>) -> Self {
        NodeSelector::Key {
            type_name: type_name.into(),
            key: key.into(),
        }
    }
}

impl From<NodeId> for NodeSelector {
    fn from(id: NodeId) -> Self {
        NodeSelector::Id(id)
    }
}

impl From<(&str, &str)> for NodeSelector {
    fn from((type_name, key): (&str, &str)) -> Self {
        NodeSelector::key(type_name, key)
    }
}

/// Direction for degree, traversal and adjacency queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Outgoing relationships from a node.
    Out,
    /// Incoming relationships to a node.
    In,
    /// Both incoming and outgoing relationships.
    Both,
}

impl Direction {
    /// Returns true if this direction includes outgoing relationships.
    pub fn includes_out(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }

    /// Returns true if this direction includes incoming relationships.
    pub fn includes_in(self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }
}
