//! Subscriber initialization driven by the `PAG_LOG` environment variable.

use std::sync::Once;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Environment variable holding per-target filter directives.
pub const LOG_ENV: &str = "PAG_LOG";

/// Filter used when `PAG_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "pag=info";

/// Install the global subscriber once. Later calls are no-ops, as are calls
/// made after another subscriber was installed.
pub fn init_tracing() {
    init_tracing_with(None);
}

/// Like [`init_tracing`], with `fallback` replacing [`DEFAULT_FILTER`]
/// (typically `observability.log_level` from the config).
pub fn init_tracing_with(fallback: Option<&str>) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init();
    });
}
