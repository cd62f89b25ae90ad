/// Shared header area
///
/// ```text
/// HeaderCoordinator
///   ├── ViewConfiguration (section name + header unit)
///   ├── context labels (section name -> display label)
///   └── idempotent apply (unit identity decides "changed")
/// ```

pub mod configuration;
pub mod coordinator;
pub mod labels;

pub use configuration::ViewConfiguration;
pub use coordinator::{HeaderCoordinator, HeaderPhase};
pub use labels::{context_label, DEFAULT_CONTEXT_LABEL};
