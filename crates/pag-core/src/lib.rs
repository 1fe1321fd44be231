//! # pag-core
//!
//! Foundation crate for the PAG engine.
//! Defines the graph store, endpoint marks, knowledge, separating sets,
//! the independence-oracle seam, errors, config, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod combinatorics;
pub mod config;
pub mod data;
pub mod errors;
pub mod graph;
pub mod knowledge;
pub mod oracle;
pub mod sepset;
pub mod tracing;

// Re-export the most commonly used types at the crate root.
pub use cancellation::{Cancellable, CancellationToken};
pub use config::PagConfig;
pub use data::{DataSet, DataType};
pub use errors::{PagError, PagResult};
pub use graph::{Edge, EdgeProperty, EdgeType, Endpoint, Graph, Node, NodeId, NodeKind};
pub use knowledge::Knowledge;
pub use oracle::{GuardedOracle, IndependenceResult, IndependenceTest};
pub use sepset::{RemovalReason, Sepset, SepsetMap};
