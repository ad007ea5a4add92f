//! Error types for registration, resolution, injection, and lifecycle scheduling.
//!
//! Everything surfaces through the single [`ModuleError`] enum so callers can
//! match on failure classes without digging through nested error chains. Module
//! implementations that fail for their own reasons report through
//! [`ModuleError::Operation`], either directly or via the `anyhow` conversion.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A name was registered twice. Names identify exactly one blueprint.
    #[error("A module class named {name} is already registered")]
    DuplicateClass { name: String },

    /// A blueprint was registered under an empty or whitespace-only name.
    #[error("Cannot register a module class without a name")]
    UnnamedClass,

    /// A name-based lookup found nothing in the registry.
    #[error("Unable to resolve class {name}")]
    UnknownName { name: String },

    /// A class-based lookup found neither the type nor a substitute
    /// registered under the type's short name.
    #[error("Attempted to resolve an unknown class {type_name}")]
    UnknownClass { type_name: String },

    /// A blank name is never resolvable, independent of registry contents.
    #[error("Unable to resolve a class from a blank name")]
    BlankName,

    /// A typed request resolved to a substituted class of a different type.
    /// Requests that tolerate substitution should go through `request_dyn`.
    #[error("Class {name} resolved to {resolved}, which is not the requested type {requested}")]
    ClassMismatch {
        name: String,
        requested: &'static str,
        resolved: &'static str,
    },

    /// An injector was used after its module's declaration pass completed.
    #[error("Cannot request dependencies after bootstrap has finished for module {name}")]
    InjectionClosed { name: String },

    /// A module returned from `setup` without reporting itself set up.
    #[error("Module {name} does not properly implement the setup method. Make sure it calls ModuleCore::mark_set_up")]
    SetupContract { name: String },

    /// A module returned from `teardown` while still reporting itself set up.
    #[error("Module {name} does not properly implement the teardown method. Make sure it calls ModuleCore::clear_set_up")]
    TeardownContract { name: String },

    /// Setup stopped making progress before every pending module was set up.
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    /// A lifecycle operation was entered while another one was in flight.
    #[error("Cannot execute multiple operations in parallel in a {resource}. Check stack trace to identify the recursion.")]
    Reentrancy { resource: String },

    /// A module implementation failed during setup, post-setup, or teardown.
    #[error("Module operation failed: {0}")]
    Operation(String),
}

impl ModuleError {
    /// Shorthand for module implementations reporting their own failures.
    pub fn operation(msg: impl Into<String>) -> Self {
        ModuleError::Operation(msg.into())
    }
}

impl From<anyhow::Error> for ModuleError {
    fn from(err: anyhow::Error) -> Self {
        ModuleError::Operation(err.to_string())
    }
}

/// One module that could not be set up, with the required dependencies it was
/// still waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckModule {
    pub name: String,
    pub missing: Vec<String>,
}

/// Aggregate raised when a setup round completes without setting up a single
/// module. Lists every stuck module and its unmet required dependencies.
#[derive(Debug, Clone, Error)]
#[error("{}", render_stuck(.stuck))]
pub struct ConvergenceError {
    pub stuck: Vec<StuckModule>,
}

fn render_stuck(stuck: &[StuckModule]) -> String {
    let mut out = format!("Failed to set up {} modules. The errors were:", stuck.len());
    for module in stuck {
        out.push_str(&format!(
            "\n  Module {} is waiting on dependencies that were not set up ({})",
            module.name,
            module.missing.join(", ")
        ));
    }
    out.push_str(
        "\nIf a circular dependency is required then make sure one of the dependencies is optional.",
    );
    out
}
