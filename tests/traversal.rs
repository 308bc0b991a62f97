//! Degree, traversal and the node-removal cascade across shards.

use std::collections::HashSet;

use caldera::ids::{shard_for_key, shard_of_id};
use caldera::{Direction, Graph, Result, ShardId};

fn graph() -> Graph {
    let mut graph = Graph::with_shards("traversal", 4);
    graph.start();
    graph
}

fn key_on_shard(type_name: &str, shard: ShardId, shard_count: ShardId) -> String {
    (0..)
        .map(|i| format!("key-{i}"))
        .find(|key| shard_for_key(shard_count, type_name, key) == shard)
        .unwrap()
}

/// `n` on shard 0 with two outgoing edges to `p1`, `p2` and one incoming
/// from `p3`, all on other shards.
async fn star(graph: &Graph) -> Result<(u64, u64, u64, u64)> {
    let n = graph
        .node_add_empty("Node", &key_on_shard("Node", 0, 4))
        .await?;
    let p1 = graph
        .node_add_empty("Node", &key_on_shard("Node", 1, 4))
        .await?;
    let p2 = graph
        .node_add_empty("Node", &key_on_shard("Node", 2, 4))
        .await?;
    let p3 = graph
        .node_add_empty("Node", &key_on_shard("Node", 3, 4))
        .await?;
    assert_ne!(graph.relationship_add_empty("LINKS", n, p1).await?, 0);
    assert_ne!(graph.relationship_add_empty("LINKS", n, p2).await?, 0);
    assert_ne!(graph.relationship_add_empty("LINKS", p3, n).await?, 0);
    Ok((n, p1, p2, p3))
}

#[tokio::test]
async fn degrees_follow_direction_and_filters() -> Result<()> {
    let graph = graph();
    let (n, ..) = star(&graph).await?;
    assert_eq!(graph.node_degree(n, Direction::Out, &[]).await?, 2);
    assert_eq!(graph.node_degree(n, Direction::In, &[]).await?, 1);
    assert_eq!(graph.node_degree(n, Direction::Both, &[]).await?, 3);
    assert_eq!(graph.node_degree(n, Direction::Both, &["LINKS"]).await?, 3);
    assert_eq!(graph.node_degree(n, Direction::Both, &["OTHER"]).await?, 0);
    // BOTH with an empty list is the unfiltered degree.
    assert_eq!(
        graph.node_degree(n, Direction::Both, &[]).await?,
        graph.node_degree(n, Direction::Both, &["LINKS"]).await?
    );
    Ok(())
}

#[tokio::test]
async fn relationship_ids_pair_peers_with_relationships() -> Result<()> {
    let graph = graph();
    let (n, p1, p2, p3) = star(&graph).await?;
    let links = graph.relationship_ids(n, Direction::Both, &[]).await?;
    assert_eq!(links.len(), 3);
    let peers: HashSet<u64> = links.iter().map(|l| l.node_id).collect();
    assert_eq!(peers, HashSet::from([p1, p2, p3]));
    // Every relationship id is owned by its starting node's shard.
    for link in &links {
        let rel = graph.relationship_get(link.rel_id).await?;
        assert_eq!(shard_of_id(link.rel_id), shard_of_id(rel.start_node_id));
    }
    Ok(())
}

#[tokio::test]
async fn relationship_records_arrive_from_their_owning_shards() -> Result<()> {
    let graph = graph();
    let (n, p1, p2, p3) = star(&graph).await?;

    let outgoing = graph.relationships(n, Direction::Out, &[]).await?;
    let ends: HashSet<u64> = outgoing.iter().map(|r| r.end_node_id).collect();
    assert_eq!(ends, HashSet::from([p1, p2]));

    let incoming = graph.relationships(n, Direction::In, &[]).await?;
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].start_node_id, p3);

    let both = graph.relationships(n, Direction::Both, &[]).await?;
    assert_eq!(both.len(), 3);
    Ok(())
}

#[tokio::test]
async fn neighbors_return_far_records() -> Result<()> {
    let graph = graph();
    let (n, p1, p2, p3) = star(&graph).await?;
    let neighbors = graph.neighbors(n, Direction::Both, &[]).await?;
    let ids: HashSet<u64> = neighbors.iter().map(|record| record.id).collect();
    assert_eq!(ids, HashSet::from([p1, p2, p3]));
    let out_only = graph.neighbors(n, Direction::Out, &[]).await?;
    assert_eq!(out_only.len(), 2);
    Ok(())
}

#[tokio::test]
async fn node_removal_cascades_to_every_shard() -> Result<()> {
    let graph = graph();
    let (n, p1, p2, p3) = star(&graph).await?;

    assert!(graph.node_remove(n).await?);
    assert!(graph.node_get(n).await?.is_zero());
    assert_eq!(graph.node_degree(p1, Direction::In, &[]).await?, 0);
    assert_eq!(graph.node_degree(p2, Direction::In, &[]).await?, 0);
    assert_eq!(graph.node_degree(p3, Direction::Out, &[]).await?, 0);
    assert_eq!(graph.relationship_type_count("LINKS").await?, 0);
    assert!(graph.relationship_ids(p3, Direction::Both, &[]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn traversal_of_missing_nodes_is_empty() -> Result<()> {
    let graph = graph();
    assert!(graph.relationship_ids(0u64, Direction::Both, &[]).await?.is_empty());
    assert!(graph.relationships(("Node", "nope"), Direction::Both, &[]).await?.is_empty());
    assert!(graph.neighbors(0u64, Direction::Both, &[]).await?.is_empty());
    Ok(())
}
