//! Node and relationship records.
//!
//! `Default` builds the zero entity: the reserved record stored at index 0
//! of every shard's record vector and returned wherever an identity does not
//! resolve.

use serde::Serialize;

use crate::properties::PropertyBag;
use crate::types::{NodeId, RelationshipId, TypeId};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub type_id: TypeId,
    pub key: String,
    pub properties: PropertyBag,
}

impl Node {
    pub fn new(id: NodeId, type_id: TypeId, key: impl Into<String>) -> Self {
        Self {
            id,
            type_id,
            key: key.into(),
            properties: PropertyBag::new(),
        }
    }

    pub fn with_properties(
        id: NodeId,
        type_id: TypeId,
        key: impl Into<String>,
        properties: PropertyBag,
    ) -> Self {
        Self {
            id,
            type_id,
            key: key.into(),
            properties,
        }
    }

    /// True for the reserved absence record.
    pub fn is_zero(&self) -> bool {
        self.id == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub type_id: TypeId,
    pub start_node_id: NodeId,
    pub end_node_id: NodeId,
    pub properties: PropertyBag,
}

impl Relationship {
    pub fn new(
        id: RelationshipId,
        type_id: TypeId,
        start_node_id: NodeId,
        end_node_id: NodeId,
    ) -> Self {
        Self {
            id,
            type_id,
            start_node_id,
            end_node_id,
            properties: PropertyBag::new(),
        }
    }

    pub fn with_properties(
        id: RelationshipId,
        type_id: TypeId,
        start_node_id: NodeId,
        end_node_id: NodeId,
        properties: PropertyBag,
    ) -> Self {
        Self {
            id,
            type_id,
            start_node_id,
            end_node_id,
            properties,
        }
    }

    /// True for the reserved absence record.
    pub fn is_zero(&self) -> bool {
        self.id == 0
    }
}
