//! # pag-search
//!
//! The search stages of the PAG engine: adjacency search, the orientation
//! engine with its collider strategies and FCI rules, latent introduction,
//! edge specialization markup, and the pipeline that chains them.

pub mod latent;
pub mod markup;
pub mod orient;
pub mod pipeline;
pub mod skeleton;

pub use latent::{LatentBlock, LatentIntroducer, LatentMap, LatentResult};
pub use markup::{mark_edge_specializations, MarkupSummary};
pub use orient::strategies::{ColliderDecision, ColliderStrategy};
pub use orient::{OrientationEngine, OrientationReport, Rule};
pub use pipeline::{PagOutput, PagPipeline, SkeletonStats};
pub use skeleton::{SkeletonResult, SkeletonSearch};
