//! External identifier layout and shard routing.
//!
//! Every node and relationship carries a 64-bit external id whose low byte
//! is the owning shard and whose remaining 56 bits are the dense index into
//! that shard's record vector. Index 0 is the reserved zero entity, so
//! external id 0 is invalid everywhere.

use xxhash_rust::xxh3::xxh3_64;

use crate::types::{NodeId, ShardId};

const SHARD_BITS: u32 = 8;
const SHARD_MASK: u64 = (1 << SHARD_BITS) - 1;

/// Builds the external id for an internal record index on a shard.
pub fn internal_to_external(shard_id: ShardId, internal_id: u64) -> u64 {
    (internal_id << SHARD_BITS) | u64::from(shard_id)
}

/// Extracts the internal record index from an external id.
pub fn external_to_internal(id: u64) -> u64 {
    id >> SHARD_BITS
}

/// Extracts the owning shard from an external id.
pub fn shard_of_id(id: u64) -> ShardId {
    (id & SHARD_MASK) as ShardId
}

/// Routes a `(type, key)` tuple to its owning shard.
///
/// High-word multiply maps the 64-bit hash uniformly onto `0..shard_count`
/// without a modulo.
pub fn shard_for_key(shard_count: ShardId, type_name: &str, key: &str) -> ShardId {
    let hash = xxh3_64(format!("{type_name}-{key}").as_bytes());
    ((u128::from(hash) * u128::from(shard_count)) >> 64) as ShardId
}

/// Interns a property key into its 64-bit comparison token.
pub fn key_token(key: &str) -> u64 {
    xxh3_64(key.as_bytes())
}

/// Structural validity: non-zero, and re-encoding the decoded parts yields
/// the id back for the given shard. Rejects ids whose shard byte does not
/// match, guarding against cross-shard id confusion.
pub fn valid_external_id(shard_id: ShardId, id: NodeId, records_len: usize) -> bool {
    if id == 0 {
        return false;
    }
    let internal = external_to_internal(id);
    (internal as usize) < records_len && internal_to_external(shard_id, internal) == id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_ids_round_trip() {
        assert_eq!(external_to_internal(256), 1);
        assert_eq!(external_to_internal(257), 1);
        assert_eq!(external_to_internal(258), 1);
        assert_eq!(external_to_internal(513), 2);

        assert_eq!(internal_to_external(0, 1), 256);
        assert_eq!(internal_to_external(0, 2), 512);
        assert_eq!(internal_to_external(0, 3), 768);
        assert_eq!(internal_to_external(1, 1), 257);
        assert_eq!(internal_to_external(3, 5), 1283);

        for shard in 0..4u16 {
            for internal in 1..100u64 {
                let id = internal_to_external(shard, internal);
                assert_eq!(external_to_internal(id), internal);
                assert_eq!(shard_of_id(id), shard);
            }
        }
    }

    #[test]
    fn key_routing_is_deterministic_and_in_range() {
        for key in ["empty", "existing", "one", "two", "three", ""] {
            let shard = shard_for_key(4, "Node", key);
            assert!(shard < 4);
            assert_eq!(shard, shard_for_key(4, "Node", key));
        }
        // A single shard absorbs everything.
        assert_eq!(shard_for_key(1, "User", "max"), 0);
    }

    #[test]
    fn shard_identity_clause_rejects_foreign_ids() {
        // Internal index 1 on shard 2 is not a valid id for shard 0.
        let id = internal_to_external(2, 1);
        assert!(valid_external_id(2, id, 10));
        assert!(!valid_external_id(0, id, 10));
        assert!(!valid_external_id(0, 0, 10));
        // Index out of range.
        assert!(!valid_external_id(0, internal_to_external(0, 10), 10));
    }
}
