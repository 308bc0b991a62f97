//! Shard-level id, reserve and clear behavior.

use caldera::ids::{external_to_internal, internal_to_external, shard_for_key};
use caldera::{PropertyBag, Shard};

#[test]
fn external_ids_carry_shard_and_index() {
    let shard = Shard::new(0, 4);
    assert_eq!(external_to_internal(256), 1);
    assert_eq!(external_to_internal(512), 2);
    assert_eq!(internal_to_external(0, 1), 256);
    assert_eq!(internal_to_external(0, 5), 1280);
    assert!(!shard.valid_node_id(0));
}

#[test]
fn valid_ids_require_matching_shard_byte() {
    let mut shard = Shard::new(2, 4);
    shard.node_type_install("Node", 1);
    let id = shard.node_add_empty(1, "one");
    assert!(shard.valid_node_id(id));
    // The same index on another shard is not ours.
    assert!(!shard.valid_node_id(internal_to_external(0, 1)));
    // Relationship ids are validated symmetrically.
    assert!(!shard.valid_relationship_id(internal_to_external(0, 1)));
}

#[test]
fn reserve_accepts_any_hint() {
    let mut shard = Shard::new(0, 4);
    shard.reserve(100, 100);
    // A hint too large to materialize is silently ignored.
    shard.reserve(u64::MAX, u64::MAX);
    shard.node_type_install("Node", 1);
    assert_ne!(shard.node_add_empty(1, "one"), 0);
}

#[test]
fn clear_resets_to_the_initial_state() {
    let mut shard = Shard::new(0, 4);
    shard.node_type_install("Node", 1);
    shard.node_type_install("User", 2);
    shard.node_type_install("Person", 3);
    shard.relationship_type_install("LOVES", 1);
    shard.relationship_type_install("HATES", 2);

    let one = shard.node_add_empty(1, "one");
    let two = shard.node_add_empty(2, "two");
    let three = shard.node_add_empty(3, "three");
    shard.relationship_add_same_shard(1, one, three, PropertyBag::new());
    shard.relationship_add_same_shard(1, three, two, PropertyBag::new());
    shard.relationship_add_same_shard(2, two, one, PropertyBag::new());

    assert_eq!(shard.relationship_type_count(1), 2);
    assert_eq!(shard.node_types_count(), 3);

    shard.clear();
    assert_eq!(shard.relationship_type_count(1), 0);
    assert_eq!(shard.node_types_count(), 0);
    assert_eq!(shard.node_get_id("Node", "one"), 0);
    // Interned names are gone too; the next insert starts over at id 1.
    assert_eq!(shard.node_type_id("Node"), 0);
}

#[test]
fn key_routing_spreads_and_stays_in_range() {
    for i in 0..64 {
        let key = format!("key-{i}");
        let shard = shard_for_key(4, "Node", &key);
        assert!(shard < 4);
        assert_eq!(shard, shard_for_key(4, "Node", &key));
    }
}
