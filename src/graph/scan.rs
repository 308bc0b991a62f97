//! Paginated global scans.
//!
//! The protocol is count-then-instruct: query every shard's per-type
//! counts, translate `(skip, limit)` into one `(local_skip, local_limit)`
//! instruction per shard while walking them in order, stop once the limit
//! is satisfied, then fan the instructions out and concatenate replies in
//! shard order. Results are shard-major, type-id-major within a shard, and
//! follow bitmap order within a type; no other total order exists.

use crate::error::Result;
use crate::records::{Node, Relationship};
use crate::types::{NodeId, RelationshipId, ShardId, TypeId};

use super::Graph;

/// One shard's slice of a global scan.
struct ScanStep {
    shard_id: ShardId,
    skip: u64,
    limit: u64,
}

fn plan_steps(counts: &[u64], skip: u64, limit: u64) -> Vec<ScanStep> {
    let mut steps = Vec::new();
    let mut skip = skip;
    let mut remaining = limit;
    for (index, &count) in counts.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        if skip >= count {
            skip -= count;
            continue;
        }
        let take = (count - skip).min(remaining);
        steps.push(ScanStep {
            shard_id: index as ShardId,
            skip,
            limit: take,
        });
        remaining -= take;
        skip = 0;
    }
    steps
}

impl Graph {
    async fn shard_node_counts(&self, type_id: Option<TypeId>) -> Result<Vec<u64>> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| {
                handle.invoke(move |s| match type_id {
                    Some(type_id) => s.node_type_count(type_id),
                    None => s.node_count(),
                })
            })
            .collect();
        let mut counts = Vec::with_capacity(futures.len());
        for future in futures {
            counts.push(future.await?);
        }
        Ok(counts)
    }

    async fn shard_relationship_counts(&self, type_id: Option<TypeId>) -> Result<Vec<u64>> {
        let futures: Vec<_> = self
            .shards()?
            .iter()
            .map(|handle| {
                handle.invoke(move |s| match type_id {
                    Some(type_id) => s.relationship_type_count(type_id),
                    None => s.relationship_count(),
                })
            })
            .collect();
        let mut counts = Vec::with_capacity(futures.len());
        for future in futures {
            counts.push(future.await?);
        }
        Ok(counts)
    }

    async fn resolve_node_type(&self, type_name: Option<&str>) -> Result<Option<Option<TypeId>>> {
        match type_name {
            None => Ok(Some(None)),
            Some(name) => {
                let id = self.node_type_id(name).await?;
                if id == 0 {
                    Ok(None)
                } else {
                    Ok(Some(Some(id)))
                }
            }
        }
    }

    async fn resolve_relationship_type(
        &self,
        type_name: Option<&str>,
    ) -> Result<Option<Option<TypeId>>> {
        match type_name {
            None => Ok(Some(None)),
            Some(name) => {
                let id = self.relationship_type_id(name).await?;
                if id == 0 {
                    Ok(None)
                } else {
                    Ok(Some(Some(id)))
                }
            }
        }
    }

    /// Node ids across all shards, optionally restricted to one type.
    pub async fn all_node_ids(
        &self,
        type_name: Option<&str>,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<NodeId>> {
        let type_id = match self.resolve_node_type(type_name).await? {
            Some(type_id) => type_id,
            None => return Ok(Vec::new()),
        };
        let counts = self.shard_node_counts(type_id).await?;
        let mut legs = Vec::new();
        for step in plan_steps(&counts, skip, limit) {
            let leg = self.shard(step.shard_id)?.invoke(move |s| match type_id {
                Some(type_id) => s.all_node_ids_of_type(type_id, step.skip, step.limit),
                None => s.all_node_ids(step.skip, step.limit),
            });
            legs.push(leg);
        }
        let mut ids = Vec::new();
        for leg in legs {
            ids.extend(leg.await?);
        }
        Ok(ids)
    }

    /// Node records across all shards, optionally restricted to one type.
    pub async fn all_nodes(
        &self,
        type_name: Option<&str>,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Node>> {
        let type_id = match self.resolve_node_type(type_name).await? {
            Some(type_id) => type_id,
            None => return Ok(Vec::new()),
        };
        let counts = self.shard_node_counts(type_id).await?;
        let mut legs = Vec::new();
        for step in plan_steps(&counts, skip, limit) {
            let leg = self.shard(step.shard_id)?.invoke(move |s| match type_id {
                Some(type_id) => s.all_nodes_of_type(type_id, step.skip, step.limit),
                None => s.all_nodes(step.skip, step.limit),
            });
            legs.push(leg);
        }
        let mut nodes = Vec::new();
        for leg in legs {
            nodes.extend(leg.await?);
        }
        Ok(nodes)
    }

    /// Relationship ids across all shards, optionally restricted to one
    /// type.
    pub async fn all_relationship_ids(
        &self,
        type_name: Option<&str>,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<RelationshipId>> {
        let type_id = match self.resolve_relationship_type(type_name).await? {
            Some(type_id) => type_id,
            None => return Ok(Vec::new()),
        };
        let counts = self.shard_relationship_counts(type_id).await?;
        let mut legs = Vec::new();
        for step in plan_steps(&counts, skip, limit) {
            let leg = self.shard(step.shard_id)?.invoke(move |s| match type_id {
                Some(type_id) => s.all_relationship_ids_of_type(type_id, step.skip, step.limit),
                None => s.all_relationship_ids(step.skip, step.limit),
            });
            legs.push(leg);
        }
        let mut ids = Vec::new();
        for leg in legs {
            ids.extend(leg.await?);
        }
        Ok(ids)
    }

    /// Relationship records across all shards, optionally restricted to one
    /// type.
    pub async fn all_relationships(
        &self,
        type_name: Option<&str>,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Relationship>> {
        let type_id = match self.resolve_relationship_type(type_name).await? {
            Some(type_id) => type_id,
            None => return Ok(Vec::new()),
        };
        let counts = self.shard_relationship_counts(type_id).await?;
        let mut legs = Vec::new();
        for step in plan_steps(&counts, skip, limit) {
            let leg = self.shard(step.shard_id)?.invoke(move |s| match type_id {
                Some(type_id) => s.all_relationships_of_type(type_id, step.skip, step.limit),
                None => s.all_relationships(step.skip, step.limit),
            });
            legs.push(leg);
        }
        let mut relationships = Vec::new();
        for leg in legs {
            relationships.extend(leg.await?);
        }
        Ok(relationships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shards(steps: &[ScanStep]) -> Vec<(ShardId, u64, u64)> {
        steps.iter().map(|s| (s.shard_id, s.skip, s.limit)).collect()
    }

    #[test]
    fn planning_walks_shards_in_order() {
        let counts = [3, 0, 4, 2];
        assert_eq!(
            shards(&plan_steps(&counts, 0, 100)),
            vec![(0, 0, 3), (2, 0, 4), (3, 0, 2)]
        );
        assert_eq!(shards(&plan_steps(&counts, 0, 5)), vec![(0, 0, 3), (2, 0, 2)]);
        assert_eq!(shards(&plan_steps(&counts, 2, 4)), vec![(0, 2, 1), (2, 0, 3)]);
        assert_eq!(shards(&plan_steps(&counts, 7, 100)), vec![(3, 0, 2)]);
        assert!(plan_steps(&counts, 9, 100).is_empty());
        assert!(plan_steps(&counts, 0, 0).is_empty());
    }
}
