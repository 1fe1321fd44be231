//! Tracing setup and span macros.

pub mod setup;
pub mod spans;

pub use setup::{init_tracing, init_tracing_with};
