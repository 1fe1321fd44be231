/// Skeleton, orientation, and latent-introduction errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid conditioning set for ({x}, {y}): {reason}")]
    InvalidConditioningSet {
        x: String,
        y: String,
        reason: String,
    },

    #[error("independence test for ({x}, {y}) timed out after {timeout_ms} ms")]
    OracleTimeout { x: String, y: String, timeout_ms: u64 },

    #[error("oracle cannot handle data type {data_type}")]
    UnsupportedDataType { data_type: String },

    #[error("search cancelled during {stage}")]
    Cancelled { stage: String },

    #[error("invalid depth {depth}: must be -1 (unbounded) or >= 0")]
    InvalidDepth { depth: i32 },

    #[error("invalid discriminating path length {length}: must be -1 (unbounded) or >= 4")]
    InvalidPathLength { length: i32 },

    #[error("oracle failure for ({x}, {y}): {reason}")]
    OracleFailure { x: String, y: String, reason: String },
}
