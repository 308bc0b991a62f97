//! Property surface for nodes and relationships on one shard.
//!
//! All operations resolve the target record first and report absence
//! in-band: `None` for single-value reads, `false` for writes against a
//! missing entity, the empty bag for whole-bag reads. Typed tombstone
//! getters live on [`crate::PropertyBag`] and [`crate::PropertyValue`].

use std::collections::BTreeMap;

use crate::ids::external_to_internal;
use crate::properties::{PropertyBag, PropertyValue};
use crate::types::{NodeSelector, RelationshipId};

use super::Shard;

impl Shard {
    fn node_bag(&self, selector: &NodeSelector) -> Option<&PropertyBag> {
        self.node_index(selector).map(|i| &self.nodes[i].properties)
    }

    fn node_bag_mut(&mut self, selector: &NodeSelector) -> Option<&mut PropertyBag> {
        let index = self.node_index(selector)?;
        Some(&mut self.nodes[index].properties)
    }

    fn relationship_bag_mut(&mut self, id: RelationshipId) -> Option<&mut PropertyBag> {
        if !self.relationship_alive(id) {
            return None;
        }
        let index = external_to_internal(id) as usize;
        Some(&mut self.relationships[index].properties)
    }

    // ---- nodes ----------------------------------------------------------

    pub fn node_property_get(&self, selector: &NodeSelector, key: &str) -> Option<PropertyValue> {
        self.node_bag(selector)?.try_get(key).cloned()
    }

    pub fn node_properties_get(&self, selector: &NodeSelector) -> PropertyBag {
        self.node_bag(selector).cloned().unwrap_or_default()
    }

    pub fn node_property_set(
        &mut self,
        selector: &NodeSelector,
        key: &str,
        value: PropertyValue,
    ) -> bool {
        match self.node_bag_mut(selector) {
            Some(bag) => {
                bag.set(key, value);
                true
            }
            None => false,
        }
    }

    pub fn node_property_delete(&mut self, selector: &NodeSelector, key: &str) -> bool {
        self.node_bag_mut(selector)
            .map(|bag| bag.delete(key))
            .unwrap_or(false)
    }

    /// Overlay: existing keys keep their values, unseen keys are appended.
    pub fn node_properties_merge(
        &mut self,
        selector: &NodeSelector,
        map: BTreeMap<String, PropertyValue>,
    ) -> bool {
        match self.node_bag_mut(selector) {
            Some(bag) => {
                bag.merge(map);
                true
            }
            None => false,
        }
    }

    /// Replace: the bag becomes exactly `map`.
    pub fn node_properties_replace(
        &mut self,
        selector: &NodeSelector,
        map: BTreeMap<String, PropertyValue>,
    ) -> bool {
        match self.node_bag_mut(selector) {
            Some(bag) => {
                bag.replace_all(map);
                true
            }
            None => false,
        }
    }

    pub fn node_properties_clear(&mut self, selector: &NodeSelector) -> bool {
        match self.node_bag_mut(selector) {
            Some(bag) => {
                bag.clear();
                true
            }
            None => false,
        }
    }

    // ---- relationships --------------------------------------------------

    pub fn relationship_property_get(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Option<PropertyValue> {
        if !self.relationship_alive(id) {
            return None;
        }
        self.relationships[external_to_internal(id) as usize]
            .properties
            .try_get(key)
            .cloned()
    }

    pub fn relationship_properties_get(&self, id: RelationshipId) -> PropertyBag {
        if !self.relationship_alive(id) {
            return PropertyBag::new();
        }
        self.relationships[external_to_internal(id) as usize]
            .properties
            .clone()
    }

    pub fn relationship_property_set(
        &mut self,
        id: RelationshipId,
        key: &str,
        value: PropertyValue,
    ) -> bool {
        match self.relationship_bag_mut(id) {
            Some(bag) => {
                bag.set(key, value);
                true
            }
            None => false,
        }
    }

    pub fn relationship_property_delete(&mut self, id: RelationshipId, key: &str) -> bool {
        self.relationship_bag_mut(id)
            .map(|bag| bag.delete(key))
            .unwrap_or(false)
    }

    pub fn relationship_properties_merge(
        &mut self,
        id: RelationshipId,
        map: BTreeMap<String, PropertyValue>,
    ) -> bool {
        match self.relationship_bag_mut(id) {
            Some(bag) => {
                bag.merge(map);
                true
            }
            None => false,
        }
    }

    /// Replace on the relationship record itself, never the node record.
    pub fn relationship_properties_replace(
        &mut self,
        id: RelationshipId,
        map: BTreeMap<String, PropertyValue>,
    ) -> bool {
        match self.relationship_bag_mut(id) {
            Some(bag) => {
                bag.replace_all(map);
                true
            }
            None => false,
        }
    }

    pub fn relationship_properties_clear(&mut self, id: RelationshipId) -> bool {
        match self.relationship_bag_mut(id) {
            Some(bag) => {
                bag.clear();
                true
            }
            None => false,
        }
    }
}
