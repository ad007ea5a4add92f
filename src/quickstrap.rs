//! One-call bootstrap for simple applications.

use crate::error::ModuleError;
use crate::orchestrator::{Bootstrapped, Orchestrator, RequirementSpec};
use crate::registry::Blueprint;

/// Register a set of classes, bootstrap a spec against them, and run setup,
/// returning the live state together with the orchestrator that owns it.
///
/// The blueprint list covers both registration forms: [`Blueprint::of`] for
/// plain classes and [`Blueprint::aliased`] for stand-ins registered under
/// another class's name, which is how tests substitute mocks without touching
/// the requirement spec.
///
/// # Example
/// ```rust
/// use modwire::{quickstrap, Blueprint, Module, ModuleCore, RequirementSpec};
///
/// #[derive(Default)]
/// struct App {
///     core: ModuleCore,
/// }
///
/// impl Module for App {
///     fn core(&self) -> &ModuleCore {
///         &self.core
///     }
/// }
///
/// # async fn demo() -> Result<(), modwire::ModuleError> {
/// let (state, system) = quickstrap(
///     RequirementSpec::named([("app", "App")]),
///     vec![Blueprint::of::<App>()],
/// )
/// .await?;
///
/// assert!(state.get("app").is_some_and(|app| app.was_set_up()));
/// system.teardown().await?;
/// # Ok(())
/// # }
/// ```
pub async fn quickstrap(
    spec: RequirementSpec,
    classes: Vec<Blueprint>,
) -> Result<(Bootstrapped, Orchestrator), ModuleError> {
    let system = Orchestrator::new();
    for blueprint in classes {
        system.register_blueprint(blueprint)?;
    }
    let state = system.bootstrap(spec)?;
    system.setup().await?;
    Ok((state, system))
}
