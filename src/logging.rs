//! Console logging setup.

use std::io;

use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,bounce=debug";

/// Builds the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber: env filter plus a fmt layer with targets,
/// thread names and line numbers.
///
/// Does nothing if a subscriber is already installed.
pub fn init() {
    if try_install(io::stdout) {
        tracing::debug!(filter = DEFAULT_FILTER, "logging initialised");
    }
}

/// Returns false when another subscriber was already installed
fn try_install<W>(writer: W) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER);
        assert!(filter.is_ok());
    }

    #[test]
    fn test_second_install_is_refused() {
        // Sink writer keeps other tests' logs out of the harness output
        try_install(io::sink);
        assert!(!try_install(io::sink));
    }
}
