//! # pag-ensemble
//!
//! Bootstrap ensembles: resample a dataset, run a search on every sample,
//! tally the edge type each run produced for every node pair, and merge the
//! runs into one graph under an ensemble policy. Every merged edge carries
//! the full distribution of edge types observed for its pair.

pub mod aggregator;
pub mod compare;
pub mod policy;
pub mod resample;
pub mod tally;

pub use aggregator::{BootstrapAggregator, EnsembleResult, PipelineAlgorithm, SearchAlgorithm};
pub use compare::{adjacency_confusion, edge_type_confusion, AdjacencyConfusion, EdgeTypeConfusion};
pub use resample::Resampler;
pub use tally::{EdgeTally, Observation};
