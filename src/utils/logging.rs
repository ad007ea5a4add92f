//! Logging initialization for embedders and tests
//!
//! The crate itself only emits `tracing` events; installing a subscriber is
//! the embedding application's call. This helper sets up a sensible default:
//! - Respects the RUST_LOG environment variable
//! - Falls back to a caller-provided filter, then to "info"
//! - Human-readable output to stderr, honoring NO_COLOR
//!
//! # Usage
//! ```rust
//! use modwire::utils::init_logging;
//!
//! init_logging(None); // Uses RUST_LOG or defaults to "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the default logging subscriber.
///
/// RUST_LOG always takes precedence; the `filter` argument applies only when
/// RUST_LOG is unset. Calling this twice is a no-op, so test binaries can
/// call it from every test.
///
/// # Arguments
/// * `filter` - Optional filter (e.g., "info", "modwire=debug")
pub fn init_logging(filter: Option<&str>) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(filter.unwrap_or("info"))
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter)
        .try_init();
}
