//! Peered relationship surface: routing plus the two-phase cross-shard
//! insert and remove protocols.

use std::collections::HashMap;

use tracing::warn;

use crate::error::Result;
use crate::ids::shard_of_id;
use crate::properties::PropertyBag;
use crate::records::Relationship;
use crate::types::{NodeId, NodeSelector, RelationshipId, ShardId, TypeId};

use super::Graph;

enum RemoveStep {
    Missing,
    Done(bool),
    NeedIncoming(TypeId, NodeId),
}

impl Graph {
    /// Adds a relationship with no properties. Returns 0 when either
    /// endpoint does not resolve.
    pub async fn relationship_add_empty(
        &self,
        rel_type: &str,
        from: impl Into<NodeSelector>,
        to: impl Into<NodeSelector>,
    ) -> Result<RelationshipId> {
        self.relationship_add_with(rel_type, from.into(), to.into(), PropertyBag::new())
            .await
    }

    /// Adds a relationship with a JSON-object property payload.
    pub async fn relationship_add(
        &self,
        rel_type: &str,
        from: impl Into<NodeSelector>,
        to: impl Into<NodeSelector>,
        properties: &str,
    ) -> Result<RelationshipId> {
        let map = match crate::json::parse_properties(properties) {
            Some(map) => map,
            None => return Ok(0),
        };
        self.relationship_add_with(rel_type, from.into(), to.into(), PropertyBag::from_map(map))
            .await
    }

    async fn relationship_add_with(
        &self,
        rel_type: &str,
        from: NodeSelector,
        to: NodeSelector,
        properties: PropertyBag,
    ) -> Result<RelationshipId> {
        let type_id = self.relationship_type_insert(rel_type).await?;
        let (s1, s2) = match (self.route(&from), self.route(&to)) {
            (Some(s1), Some(s2)) => (s1, s2),
            _ => return Ok(0),
        };

        if s1 == s2 {
            return self
                .shard(s1)?
                .invoke(move |s| {
                    let from = s.resolve_node(&from);
                    let to = s.resolve_node(&to);
                    if from == 0 || to == 0 {
                        0
                    } else {
                        s.relationship_add_same_shard(type_id, from, to, properties)
                    }
                })
                .await;
        }

        // Validate both endpoints in parallel before touching either side.
        let from_fut = self.shard(s1)?.invoke(move |s| s.resolve_node(&from));
        let to_fut = self.shard(s2)?.invoke(move |s| s.resolve_node(&to));
        let from = from_fut.await?;
        let to = to_fut.await?;
        if from == 0 || to == 0 {
            return Ok(0);
        }

        let rel_id = self
            .shard(s1)?
            .invoke(move |s| s.relationship_add_outgoing(type_id, from, to, properties))
            .await?;
        if rel_id == 0 {
            return Ok(0);
        }

        // The relationship is half-alive until the incoming side lands. A
        // failure here is tolerated: the id is already allocated and the
        // outgoing half stays in place.
        let incoming = self
            .shard(s2)?
            .invoke(move |s| s.relationship_add_incoming(type_id, rel_id, from, to))
            .await;
        if !matches!(incoming, Ok(true)) {
            warn!(rel = rel_id, "incoming half of relationship insert failed");
        }
        Ok(rel_id)
    }

    /// The record for `id`, or the zero entity.
    pub async fn relationship_get(&self, id: RelationshipId) -> Result<Relationship> {
        match self.route_id(id) {
            Some(shard_id) => {
                self.shard(shard_id)?
                    .invoke(move |s| s.relationship_get(id))
                    .await
            }
            None => Ok(Relationship::default()),
        }
    }

    pub async fn relationship_type_id_of(&self, id: RelationshipId) -> Result<TypeId> {
        match self.route_id(id) {
            Some(shard_id) => {
                self.shard(shard_id)?
                    .invoke(move |s| s.relationship_type_of(id))
                    .await
            }
            None => Ok(0),
        }
    }

    pub async fn relationship_type_of(&self, id: RelationshipId) -> Result<String> {
        match self.route_id(id) {
            Some(shard_id) => {
                self.shard(shard_id)?
                    .invoke(move |s| {
                        let type_id = s.relationship_type_of(id);
                        s.relationship_type_name(type_id)
                    })
                    .await
            }
            None => Ok(String::new()),
        }
    }

    pub async fn relationship_start_node(&self, id: RelationshipId) -> Result<NodeId> {
        match self.route_id(id) {
            Some(shard_id) => {
                self.shard(shard_id)?
                    .invoke(move |s| s.relationship_start_node(id))
                    .await
            }
            None => Ok(0),
        }
    }

    pub async fn relationship_end_node(&self, id: RelationshipId) -> Result<NodeId> {
        match self.route_id(id) {
            Some(shard_id) => {
                self.shard(shard_id)?
                    .invoke(move |s| s.relationship_end_node(id))
                    .await
            }
            None => Ok(0),
        }
    }

    /// Batch fetch preserving input order. Ids that resolve nowhere come
    /// back as zero entities.
    pub async fn relationships_get(
        &self,
        ids: &[RelationshipId],
    ) -> Result<Vec<Relationship>> {
        let mut by_shard: HashMap<ShardId, Vec<RelationshipId>> = HashMap::new();
        for &id in ids {
            if let Some(shard_id) = self.route_id(id) {
                by_shard.entry(shard_id).or_default().push(id);
            }
        }
        let mut legs = Vec::new();
        for (shard_id, wanted) in by_shard {
            let leg = self
                .shard(shard_id)?
                .invoke(move |s| s.relationships_by_ids(&wanted));
            legs.push(leg);
        }
        let mut found: HashMap<RelationshipId, Relationship> = HashMap::new();
        for leg in legs {
            for relationship in leg.await? {
                if !relationship.is_zero() {
                    found.insert(relationship.id, relationship);
                }
            }
        }
        Ok(ids
            .iter()
            .map(|id| found.remove(id).unwrap_or_default())
            .collect())
    }

    /// Removes a relationship. For a cross-shard relationship the record
    /// and outgoing entry go first, then the remote incoming entry.
    pub async fn relationship_remove(&self, id: RelationshipId) -> Result<bool> {
        let handle = match self.route_id(id) {
            Some(shard_id) => self.shard(shard_id)?,
            None => return Ok(false),
        };
        let own_shard = shard_of_id(id);
        let step = handle
            .invoke(move |s| match s.relationship_endpoints(id) {
                None => RemoveStep::Missing,
                Some((_, end)) if shard_of_id(end) == own_shard => {
                    RemoveStep::Done(s.relationship_remove_local(id))
                }
                Some(_) => match s.relationship_remove_outgoing_half(id) {
                    Some((type_id, end)) => RemoveStep::NeedIncoming(type_id, end),
                    None => RemoveStep::Missing,
                },
            })
            .await?;

        match step {
            RemoveStep::Missing => Ok(false),
            RemoveStep::Done(removed) => Ok(removed),
            RemoveStep::NeedIncoming(type_id, end) => {
                match self.route_id(end) {
                    Some(end_shard) => {
                        let removed = self
                            .shard(end_shard)?
                            .invoke(move |s| {
                                s.relationship_remove_incoming_half(type_id, id, end)
                            })
                            .await;
                        if !matches!(removed, Ok(true)) {
                            warn!(rel = id, "incoming half of relationship removal failed");
                        }
                    }
                    None => warn!(rel = id, "relationship ending node routes nowhere"),
                }
                Ok(true)
            }
        }
    }
}
