use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tokio::runtime::Runtime;

use caldera::{Direction, Graph};

fn started(shards: u16) -> Graph {
    let mut graph = Graph::with_shards("bench", shards);
    graph.start();
    graph
}

fn bench_node_add(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let graph = started(4);
    let mut i = 0u64;
    c.bench_function("node_add_empty", |b| {
        b.iter(|| {
            i += 1;
            rt.block_on(graph.node_add_empty("Node", &format!("key-{i}")))
                .unwrap()
        })
    });
}

fn bench_node_get(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let graph = started(4);
    let id = rt
        .block_on(graph.node_add("Node", "probe", r#"{"name":"max"}"#))
        .unwrap();
    c.bench_function("node_get_by_id", |b| {
        b.iter(|| rt.block_on(graph.node_get(id)).unwrap())
    });
    c.bench_function("node_get_by_key", |b| {
        b.iter(|| rt.block_on(graph.node_get(("Node", "probe"))).unwrap())
    });
}

fn bench_degree_and_traversal(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let graph = started(4);
    let center = rt.block_on(graph.node_add_empty("Node", "center")).unwrap();
    for i in 0..64 {
        let peer = rt
            .block_on(graph.node_add_empty("Node", &format!("peer-{i}")))
            .unwrap();
        rt.block_on(graph.relationship_add_empty("LINKS", center, peer))
            .unwrap();
    }
    c.bench_function("degree_both", |b| {
        b.iter(|| rt.block_on(graph.node_degree(center, Direction::Both, &[])).unwrap())
    });
    c.bench_function("neighbors_both", |b| {
        b.iter(|| rt.block_on(graph.neighbors(center, Direction::Both, &[])).unwrap())
    });
}

fn bench_add_remove_cycle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let graph = started(4);
    c.bench_function("add_remove_same_key", |b| {
        b.iter_batched(
            || (),
            |_| {
                let id = rt.block_on(graph.node_add_empty("Node", "cycled")).unwrap();
                rt.block_on(graph.node_remove(id)).unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_node_add,
    bench_node_get,
    bench_degree_and_traversal,
    bench_add_remove_cycle
);
criterion_main!(benches);
