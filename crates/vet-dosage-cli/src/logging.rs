//! Logging setup for the vet-dosage binary.
//!
//! Logs go to stderr so JSON on stdout stays machine-readable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber for a `vet-dosage` run.
///
/// `RUST_LOG` wins when set; otherwise `fallback` (see [`default_level`])
/// filters the core's calculation spans and gate events.
pub fn init_with_level(fallback: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::new(fallback),
    };
    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

/// Default level for a verbosity flag.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}
