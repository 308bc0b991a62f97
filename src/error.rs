use thiserror::Error;

use crate::types::ShardId;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Infrastructure faults only. Data-plane misses (unknown id, absent key,
/// duplicate node, malformed payload) are reported in-band as zero entities,
/// id 0 or `false`, and never pass through this enum.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("shard {0} is not running")]
    ShardUnavailable(ShardId),
    #[error("task on shard {0} failed")]
    TaskFailed(ShardId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
