//! Span definitions per stage: skeleton, orientation, latent introduction, bootstrap.

/// Create a skeleton-search span.
#[macro_export]
macro_rules! skeleton_span {
    ($num_vars:expr, $depth:expr) => {
        tracing::info_span!("pag.skeleton", num_vars = $num_vars, depth = $depth)
    };
}

/// Create an orientation span.
#[macro_export]
macro_rules! orientation_span {
    ($strategy:expr, $num_edges:expr) => {
        tracing::info_span!("pag.orientation", strategy = %$strategy, num_edges = $num_edges)
    };
}

/// Create a latent-introduction span.
#[macro_export]
macro_rules! latent_span {
    ($check:expr) => {
        tracing::info_span!("pag.latent", check = ?$check)
    };
}

/// Create a bootstrap span.
#[macro_export]
macro_rules! bootstrap_span {
    ($runs:expr, $policy:expr) => {
        tracing::info_span!("pag.bootstrap", runs = $runs, policy = %$policy)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SKELETON: &str = "pag.skeleton";
    pub const ORIENTATION: &str = "pag.orientation";
    pub const LATENT: &str = "pag.latent";
    pub const BOOTSTRAP: &str = "pag.bootstrap";
}
