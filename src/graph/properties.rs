//! Peered property surface for both entity families. Mechanical routing:
//! every operation lands on the shard that owns the record.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::properties::{ArrayValue, PropertyBag, PropertyValue, TOMBSTONE_DOUBLE, TOMBSTONE_INTEGER};
use crate::types::{NodeSelector, RelationshipId};

use super::Graph;

impl Graph {
    // ---- node properties ------------------------------------------------

    pub async fn node_property_get(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<Option<PropertyValue>> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(None),
        };
        let key = key.to_string();
        handle
            .invoke(move |s| s.node_property_get(&selector, &key))
            .await
    }

    pub async fn node_property_get_string(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<String> {
        Ok(self
            .node_property_get(selector, key)
            .await?
            .map(|v| v.as_string())
            .unwrap_or_default())
    }

    pub async fn node_property_get_integer(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<i64> {
        Ok(self
            .node_property_get(selector, key)
            .await?
            .map(|v| v.as_integer())
            .unwrap_or(TOMBSTONE_INTEGER))
    }

    pub async fn node_property_get_double(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<f64> {
        Ok(self
            .node_property_get(selector, key)
            .await?
            .map(|v| v.as_double())
            .unwrap_or(TOMBSTONE_DOUBLE))
    }

    pub async fn node_property_get_boolean(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<bool> {
        Ok(self
            .node_property_get(selector, key)
            .await?
            .map(|v| v.as_boolean())
            .unwrap_or(false))
    }

    pub async fn node_property_get_object(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<PropertyBag> {
        Ok(self
            .node_property_get(selector, key)
            .await?
            .map(|v| v.as_object())
            .unwrap_or_default())
    }

    pub async fn node_property_get_list(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<ArrayValue> {
        Ok(self
            .node_property_get(selector, key)
            .await?
            .map(|v| v.as_list())
            .unwrap_or_default())
    }

    pub async fn node_property_set(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
        value: PropertyValue,
    ) -> Result<bool> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        let key = key.to_string();
        handle
            .invoke(move |s| s.node_property_set(&selector, &key, value))
            .await
    }

    /// Sets one property from a JSON fragment. A null or malformed
    /// fragment fails in-band.
    pub async fn node_property_set_from_json(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
        fragment: &str,
    ) -> Result<bool> {
        match crate::json::parse_value(fragment) {
            Some(value) => self.node_property_set(selector, key, value).await,
            None => Ok(false),
        }
    }

    pub async fn node_property_delete(
        &self,
        selector: impl Into<NodeSelector>,
        key: &str,
    ) -> Result<bool> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        let key = key.to_string();
        handle
            .invoke(move |s| s.node_property_delete(&selector, &key))
            .await
    }

    pub async fn node_properties_get(
        &self,
        selector: impl Into<NodeSelector>,
    ) -> Result<PropertyBag> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(PropertyBag::new()),
        };
        handle.invoke(move |s| s.node_properties_get(&selector)).await
    }

    /// Overlay semantics: existing keys keep their values.
    pub async fn node_properties_set(
        &self,
        selector: impl Into<NodeSelector>,
        map: BTreeMap<String, PropertyValue>,
    ) -> Result<bool> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        handle
            .invoke(move |s| s.node_properties_merge(&selector, map))
            .await
    }

    pub async fn node_properties_set_from_json(
        &self,
        selector: impl Into<NodeSelector>,
        payload: &str,
    ) -> Result<bool> {
        match crate::json::parse_properties(payload) {
            Some(map) => self.node_properties_set(selector, map).await,
            None => Ok(false),
        }
    }

    /// Replace semantics: the bag becomes exactly `map`.
    pub async fn node_properties_reset(
        &self,
        selector: impl Into<NodeSelector>,
        map: BTreeMap<String, PropertyValue>,
    ) -> Result<bool> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        handle
            .invoke(move |s| s.node_properties_replace(&selector, map))
            .await
    }

    pub async fn node_properties_reset_from_json(
        &self,
        selector: impl Into<NodeSelector>,
        payload: &str,
    ) -> Result<bool> {
        match crate::json::parse_properties(payload) {
            Some(map) => self.node_properties_reset(selector, map).await,
            None => Ok(false),
        }
    }

    pub async fn node_properties_delete(
        &self,
        selector: impl Into<NodeSelector>,
    ) -> Result<bool> {
        let selector = selector.into();
        let handle = match self.route(&selector) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        handle
            .invoke(move |s| s.node_properties_clear(&selector))
            .await
    }

    // ---- relationship properties ----------------------------------------

    pub async fn relationship_property_get(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<Option<PropertyValue>> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(None),
        };
        let key = key.to_string();
        handle
            .invoke(move |s| s.relationship_property_get(id, &key))
            .await
    }

    pub async fn relationship_property_get_string(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<String> {
        Ok(self
            .relationship_property_get(id, key)
            .await?
            .map(|v| v.as_string())
            .unwrap_or_default())
    }

    pub async fn relationship_property_get_integer(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<i64> {
        Ok(self
            .relationship_property_get(id, key)
            .await?
            .map(|v| v.as_integer())
            .unwrap_or(TOMBSTONE_INTEGER))
    }

    pub async fn relationship_property_get_double(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<f64> {
        Ok(self
            .relationship_property_get(id, key)
            .await?
            .map(|v| v.as_double())
            .unwrap_or(TOMBSTONE_DOUBLE))
    }

    pub async fn relationship_property_get_boolean(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<bool> {
        Ok(self
            .relationship_property_get(id, key)
            .await?
            .map(|v| v.as_boolean())
            .unwrap_or(false))
    }

    pub async fn relationship_property_get_object(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<PropertyBag> {
        Ok(self
            .relationship_property_get(id, key)
            .await?
            .map(|v| v.as_object())
            .unwrap_or_default())
    }

    pub async fn relationship_property_get_list(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<ArrayValue> {
        Ok(self
            .relationship_property_get(id, key)
            .await?
            .map(|v| v.as_list())
            .unwrap_or_default())
    }

    pub async fn relationship_property_set(
        &self,
        id: RelationshipId,
        key: &str,
        value: PropertyValue,
    ) -> Result<bool> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        let key = key.to_string();
        handle
            .invoke(move |s| s.relationship_property_set(id, &key, value))
            .await
    }

    pub async fn relationship_property_set_from_json(
        &self,
        id: RelationshipId,
        key: &str,
        fragment: &str,
    ) -> Result<bool> {
        match crate::json::parse_value(fragment) {
            Some(value) => self.relationship_property_set(id, key, value).await,
            None => Ok(false),
        }
    }

    pub async fn relationship_property_delete(
        &self,
        id: RelationshipId,
        key: &str,
    ) -> Result<bool> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        let key = key.to_string();
        handle
            .invoke(move |s| s.relationship_property_delete(id, &key))
            .await
    }

    pub async fn relationship_properties_get(&self, id: RelationshipId) -> Result<PropertyBag> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(PropertyBag::new()),
        };
        handle.invoke(move |s| s.relationship_properties_get(id)).await
    }

    pub async fn relationship_properties_set(
        &self,
        id: RelationshipId,
        map: BTreeMap<String, PropertyValue>,
    ) -> Result<bool> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        handle
            .invoke(move |s| s.relationship_properties_merge(id, map))
            .await
    }

    pub async fn relationship_properties_set_from_json(
        &self,
        id: RelationshipId,
        payload: &str,
    ) -> Result<bool> {
        match crate::json::parse_properties(payload) {
            Some(map) => self.relationship_properties_set(id, map).await,
            None => Ok(false),
        }
    }

    pub async fn relationship_properties_reset(
        &self,
        id: RelationshipId,
        map: BTreeMap<String, PropertyValue>,
    ) -> Result<bool> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        handle
            .invoke(move |s| s.relationship_properties_replace(id, map))
            .await
    }

    pub async fn relationship_properties_reset_from_json(
        &self,
        id: RelationshipId,
        payload: &str,
    ) -> Result<bool> {
        match crate::json::parse_properties(payload) {
            Some(map) => self.relationship_properties_reset(id, map).await,
            None => Ok(false),
        }
    }

    pub async fn relationship_properties_delete(&self, id: RelationshipId) -> Result<bool> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        handle
            .invoke(move |s| s.relationship_properties_clear(id))
            .await
    }
}
