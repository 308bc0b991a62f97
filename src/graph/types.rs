//! Peered type surface and the type-id agreement protocol.
//!
//! Type ids are embedded in adjacency groups on shards other than the one
//! storing the relationship, so every shard must agree on them. All
//! insertions funnel through shard 0 under a single-writer lock: shard 0
//! assigns the id, the pair is broadcast to every shard (including shard 0,
//! where the install is a replay), and only then does the caller's data
//! operation proceed. Reads never take the lock; a read that loses a race
//! simply triggers an insert that resolves to the existing id.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::types::TypeId;

use super::Graph;

impl Graph {
    // ---- node types -----------------------------------------------------

    /// Interns a node type everywhere, returning its engine-wide id.
    /// Idempotent: an already-known name returns its existing id with no
    /// lock taken.
    pub async fn node_type_insert(&self, name: &str) -> Result<TypeId> {
        let probe = name.to_string();
        let existing = self.shard(0)?.invoke(move |s| s.node_type_id(&probe)).await?;
        if existing != 0 {
            return Ok(existing);
        }
        let _guard = self.node_type_lock.lock().await;
        let owned = name.to_string();
        let id = self
            .shard(0)?
            .invoke(move |s| s.node_type_get_or_insert(&owned))
            .await?;
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| {
                let owned = name.to_string();
                handle.invoke(move |s| s.node_type_install(&owned, id))
            })
            .collect();
        for future in futures {
            future.await?;
        }
        Ok(id)
    }

    pub async fn node_types_count(&self) -> Result<TypeId> {
        self.shard(0)?.invoke(|s| s.node_types_count()).await
    }

    /// Nodes of the named type across all shards.
    pub async fn node_type_count(&self, name: &str) -> Result<u64> {
        let id = self.node_type_id(name).await?;
        if id == 0 {
            return Ok(0);
        }
        self.node_type_count_by_id(id).await
    }

    pub async fn node_type_count_by_id(&self, type_id: TypeId) -> Result<u64> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| handle.invoke(move |s| s.node_type_count(type_id)))
            .collect();
        let mut total = 0;
        for future in futures {
            total += future.await?;
        }
        Ok(total)
    }

    /// Per-type-id node counts summed across shards, in type-id order.
    pub async fn node_type_count_map(&self) -> Result<BTreeMap<TypeId, u64>> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| handle.invoke(|s| s.node_type_counts()))
            .collect();
        let mut merged: BTreeMap<TypeId, u64> = BTreeMap::new();
        for future in futures {
            for (type_id, count) in future.await? {
                *merged.entry(type_id).or_default() += count;
            }
        }
        Ok(merged)
    }

    pub async fn node_types_list(&self) -> Result<BTreeSet<String>> {
        self.shard(0)?.invoke(|s| s.node_types_list()).await
    }

    pub async fn node_type_name(&self, type_id: TypeId) -> Result<String> {
        self.shard(0)?.invoke(move |s| s.node_type_name(type_id)).await
    }

    pub async fn node_type_id(&self, name: &str) -> Result<TypeId> {
        let owned = name.to_string();
        self.shard(0)?.invoke(move |s| s.node_type_id(&owned)).await
    }

    // ---- relationship types ---------------------------------------------

    /// Interns a relationship type everywhere. Same protocol as node
    /// types, under the relationship-type writer lock.
    pub async fn relationship_type_insert(&self, name: &str) -> Result<TypeId> {
        let probe = name.to_string();
        let existing = self
            .shard(0)?
            .invoke(move |s| s.relationship_type_id(&probe))
            .await?;
        if existing != 0 {
            return Ok(existing);
        }
        let _guard = self.relationship_type_lock.lock().await;
        let owned = name.to_string();
        let id = self
            .shard(0)?
            .invoke(move |s| s.relationship_type_get_or_insert(&owned))
            .await?;
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| {
                let owned = name.to_string();
                handle.invoke(move |s| s.relationship_type_install(&owned, id))
            })
            .collect();
        for future in futures {
            future.await?;
        }
        Ok(id)
    }

    pub async fn relationship_types_count(&self) -> Result<TypeId> {
        self.shard(0)?.invoke(|s| s.relationship_types_count()).await
    }

    pub async fn relationship_type_count(&self, name: &str) -> Result<u64> {
        let id = self.relationship_type_id(name).await?;
        if id == 0 {
            return Ok(0);
        }
        self.relationship_type_count_by_id(id).await
    }

    pub async fn relationship_type_count_by_id(&self, type_id: TypeId) -> Result<u64> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| handle.invoke(move |s| s.relationship_type_count(type_id)))
            .collect();
        let mut total = 0;
        for future in futures {
            total += future.await?;
        }
        Ok(total)
    }

    /// Per-type-id relationship counts summed across shards.
    pub async fn relationship_type_count_map(&self) -> Result<BTreeMap<TypeId, u64>> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| handle.invoke(|s| s.relationship_type_counts()))
            .collect();
        let mut merged: BTreeMap<TypeId, u64> = BTreeMap::new();
        for future in futures {
            for (type_id, count) in future.await? {
                *merged.entry(type_id).or_default() += count;
            }
        }
        Ok(merged)
    }

    pub async fn relationship_types_list(&self) -> Result<BTreeSet<String>> {
        self.shard(0)?.invoke(|s| s.relationship_types_list()).await
    }

    pub async fn relationship_type_name(&self, type_id: TypeId) -> Result<String> {
        self.shard(0)?
            .invoke(move |s| s.relationship_type_name(type_id))
            .await
    }

    pub async fn relationship_type_id(&self, name: &str) -> Result<TypeId> {
        let owned = name.to_string();
        self.shard(0)?
            .invoke(move |s| s.relationship_type_id(&owned))
            .await
    }
}
