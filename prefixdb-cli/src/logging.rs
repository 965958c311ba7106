//! Log initialisation and diagnostic forwarding.

use prefixdb::{Diagnostics, Severity};
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose`.
///
/// A subscriber that is already installed is left in place.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}

/// Emit each diagnostic as a log event at its severity.
pub fn forward(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                entry = diagnostic.entry,
                kind = ?diagnostic.kind,
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::info!(
                entry = diagnostic.entry,
                kind = ?diagnostic.kind,
                "{}",
                diagnostic.message
            ),
        }
    }
}
