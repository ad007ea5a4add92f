//! Utility modules shared across the crate

pub mod lock;
pub mod logging;

pub use lock::with_lock;
pub use logging::init_logging;
