//! caldera - an in-memory labeled property graph engine for multi-core
//! scale-up.
//!
//! Each worker thread owns an independent shard of the graph: a dense node
//! vector, a dense relationship vector, per-node adjacency grouped by
//! relationship type, per-kind type interners and a slot-reuse allocator.
//! All cross-shard work is expressed as explicit asynchronous messages
//! between shards; within a shard everything is single-threaded and
//! lock-free.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                 Graph (peered)                  │
//! │  routing · type broadcast · two-phase edges ·   │
//! │  removal fan-out · paginated global scans       │
//! └───────┬────────────┬────────────┬──────────────┘
//!         │ mailbox    │ mailbox    │ mailbox
//! ┌───────┴─────┐┌─────┴───────┐┌───┴─────────┐
//! │  Shard 0    ││  Shard 1    ││  Shard N-1  │
//! │  records    ││  records    ││  records    │
//! │  adjacency  ││  adjacency  ││  adjacency  │
//! │  interners  ││  interners  ││  interners  │
//! └─────────────┘└─────────────┘└─────────────┘
//! ```
//!
//! External ids encode their owner: `(internal_index << 8) | shard_id`.
//! Id 0 is invalid everywhere and index 0 of every record vector holds the
//! reserved zero entity representing absence.

pub mod adjacency;
pub mod error;
pub mod ids;
pub mod interner;
pub mod json;
pub mod properties;
pub mod records;
pub mod types;

mod graph;
mod runtime;
mod shard;

pub use crate::adjacency::{AdjacencyList, Group, Link};
pub use crate::error::{GraphError, Result};
pub use crate::graph::{Graph, GraphStats};
pub use crate::interner::TypeInterner;
pub use crate::properties::{
    ArrayValue, PropertyBag, PropertyValue, TOMBSTONE_DOUBLE, TOMBSTONE_INTEGER,
};
pub use crate::records::{Node, Relationship};
pub use crate::shard::{CleanupPlan, Shard};
pub use crate::types::{Direction, NodeId, NodeSelector, RelationshipId, ShardId, TypeId};
