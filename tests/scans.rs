//! Paginated global scans across four shards.

use std::collections::HashSet;

use caldera::ids::shard_of_id;
use caldera::{Graph, Result};

async fn populated() -> Result<Graph> {
    let mut graph = Graph::with_shards("scans", 4);
    graph.start();
    // 8 nodes of one type and 2 of another, spread wherever the keys hash.
    for i in 0..8 {
        assert_ne!(graph.node_add_empty("Node", &format!("n-{i}")).await?, 0);
    }
    for i in 0..2 {
        assert_ne!(graph.node_add_empty("User", &format!("u-{i}")).await?, 0);
    }
    Ok(graph)
}

#[tokio::test]
async fn limits_and_skips_window_the_global_scan() -> Result<()> {
    let graph = populated().await?;
    let first_five = graph.all_node_ids(None, 0, 5).await?;
    assert_eq!(first_five.len(), 5);

    let everything = graph.all_node_ids(None, 0, 100).await?;
    assert_eq!(everything.len(), 10);
    assert_eq!(everything[..5], first_five[..]);

    let rest = graph.all_node_ids(None, 5, 100).await?;
    assert_eq!(rest[..], everything[5..]);

    assert!(graph.all_node_ids(None, 10, 100).await?.is_empty());
    assert!(graph.all_node_ids(None, 0, 0).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn results_are_shard_major() -> Result<()> {
    let graph = populated().await?;
    let ids = graph.all_node_ids(None, 0, 100).await?;
    let shards: Vec<u16> = ids.iter().map(|&id| shard_of_id(id)).collect();
    let mut sorted = shards.clone();
    sorted.sort_unstable();
    assert_eq!(shards, sorted);
    Ok(())
}

#[tokio::test]
async fn typed_scans_see_only_their_type() -> Result<()> {
    let graph = populated().await?;
    let users = graph.all_node_ids(Some("User"), 0, 100).await?;
    assert_eq!(users.len(), 2);
    let all_users: HashSet<u64> = users.iter().copied().collect();
    for record in graph.all_nodes(Some("User"), 0, 100).await? {
        assert!(all_users.contains(&record.id));
        assert_eq!(record.type_id, graph.node_type_id("User").await?);
    }
    assert!(graph.all_node_ids(Some("Ghost"), 0, 100).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn relationship_scans_mirror_node_scans() -> Result<()> {
    let graph = populated().await?;
    let nodes = graph.all_node_ids(None, 0, 100).await?;
    for pair in nodes.chunks(2) {
        if let [a, b] = pair {
            assert_ne!(graph.relationship_add_empty("LINKS", *a, *b).await?, 0);
        }
    }
    let rels = graph.all_relationship_ids(None, 0, 100).await?;
    assert_eq!(rels.len(), 5);
    assert_eq!(graph.all_relationship_ids(None, 0, 3).await?.len(), 3);
    assert_eq!(graph.all_relationship_ids(Some("LINKS"), 0, 100).await?.len(), 5);
    assert!(graph.all_relationship_ids(Some("NONE"), 0, 100).await?.is_empty());

    let records = graph.all_relationships(Some("LINKS"), 2, 2).await?;
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(!record.is_zero());
    }
    Ok(())
}

#[tokio::test]
async fn node_records_scan_in_the_same_order_as_ids() -> Result<()> {
    let graph = populated().await?;
    let ids = graph.all_node_ids(None, 3, 4).await?;
    let records = graph.all_nodes(None, 3, 4).await?;
    let record_ids: Vec<u64> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, record_ids);
    Ok(())
}
