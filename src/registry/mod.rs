//! Class registry
//!
//! Maps registered names to [`Blueprint`] factories and resolves
//! [`ClassTarget`]s (names or concrete classes) back to them. Each
//! orchestrator owns its own registry; there is no process-wide class table.

pub mod blueprint;
pub mod class_registry;

pub use blueprint::{Blueprint, ClassTarget};
pub use class_registry::ClassRegistry;
