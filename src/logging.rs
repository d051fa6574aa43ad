//! Logging setup for the provider.
//!
//! All logs go to **stderr**; stdout belongs to the host. Filtering follows
//! `RUST_LOG` and falls back to a default level when it is unset.
//!
//! ```bash
//! # HTTP requests and polling progress
//! RUST_LOG=azurerm_provider::api=debug ./azurerm-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when `RUST_LOG` is not set.
pub const DEFAULT_LEVEL: &str = "info";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn install(default_level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
}

/// Install the global subscriber at the default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Install the global subscriber, using `default_level` when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    if let Err(err) = install(default_level) {
        panic!("failed to install logging subscriber: {err}");
    }
}

/// Install the global subscriber unless one is already set.
///
/// Returns `false` when a subscriber was already installed, which happens when
/// several tests in one process each set up logging.
pub fn try_init_logging() -> bool {
    install(DEFAULT_LEVEL).is_ok()
}
