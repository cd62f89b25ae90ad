/// Navigation module
///
/// Tracks the navigable steps of the workbench and which one is active.
///
/// ## Architecture
///
/// ```text
/// StepRegistry
///   ├── Section ("Primary Workflow", "Repair", ...)
///   │     └── StepDescriptor (id, name, unit factory, badge)
///   ├── NavigationState (selected step id, active unit)
///   └── SettingsStore (last selected step)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let mut registry = StepRegistry::new(store).with_default_section("Primary Workflow");
/// registry.register_section("Primary Workflow", steps)?;
///
/// // After all sections are registered
/// registry.restore_selection();
///
/// // Keep a badge in sync with a domain collection; rebinding replaces it
/// registry.bind_badge("clarifying", &questions)?;
/// ```

pub mod collection;
pub mod registry;
pub mod state;
pub mod steps;

// Re-export commonly used types
pub use collection::{
    BadgeBinding, CollectionObserver, ObservableCollection, ObservableVec, ObserverId,
};
pub use registry::StepRegistry;
pub use state::NavigationState;
pub use steps::{Section, StepDescriptor, UnitFactory, UnitPolicy};
