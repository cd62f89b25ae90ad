//! Requirements workbench shell
//!
//! Typed in-process messaging, the header that shows the active unit, and
//! step navigation with persisted selection and badge counts.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod header;
pub mod logging;
pub mod messaging;
pub mod navigation;
pub mod persistence;
pub mod shell;
pub mod status;
pub mod unit;

pub use config::ShellConfig;
pub use diagnostics::{ErrorSink, FailureReport, RecordingErrorSink, SharedErrorSink};
pub use error::{AppResult, ConfigurationError, DispatchError, NavigationError, PersistenceError};
pub use header::{HeaderCoordinator, ViewConfiguration};
pub use messaging::{EventMediator, UiDispatcher};
pub use navigation::{StepDescriptor, StepRegistry};
pub use shell::Shell;
pub use unit::{PresentationUnit, Refreshable, StaticUnit, UnitHandle};
