/// Bootstrap ensemble errors.
#[derive(Debug, thiserror::Error)]
pub enum EnsembleError {
    #[error("resample fraction {fraction} must be in (0, 1] without replacement or > 0 with replacement")]
    InvalidResampleFraction { fraction: f64 },

    #[error("ensemble requires at least one run")]
    NoRuns,

    #[error("dataset has no rows to resample")]
    EmptyDataSet,

    #[error("bootstrap run {run} failed: {reason}")]
    RunFailed { run: usize, reason: String },
}
