//! Error taxonomy for the PAG engine.
//!
//! Construction-time contradictions (knowledge, duplicate edges) are fatal.
//! Oracle timeouts are the one recoverable condition: callers degrade them to
//! "dependent" or leave the affected mark unresolved.

mod config_error;
mod ensemble_error;
mod graph_error;
mod knowledge_error;
mod search_error;

pub use config_error::ConfigError;
pub use ensemble_error::EnsembleError;
pub use graph_error::GraphError;
pub use knowledge_error::KnowledgeError;
pub use search_error::SearchError;

/// Top-level error for every PAG operation.
#[derive(Debug, thiserror::Error)]
pub enum PagError {
    #[error("graph error: {0}")]
    GraphError(#[from] GraphError),

    #[error("knowledge error: {0}")]
    KnowledgeError(#[from] KnowledgeError),

    #[error("search error: {0}")]
    SearchError(#[from] SearchError),

    #[error("ensemble error: {0}")]
    EnsembleError(#[from] EnsembleError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PagError {
    /// Whether the condition is handled locally instead of aborting the pipeline.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SearchError(SearchError::OracleTimeout { .. }))
    }

    /// Whether this error is a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::SearchError(SearchError::Cancelled { .. }))
    }
}

/// Convenience alias used across the workspace.
pub type PagResult<T> = Result<T, PagError>;
