/// Messaging module for decoupled navigation
///
/// Components never call each other directly. An initiator publishes a
/// request, the owning component reacts and publishes the outcome, and any
/// number of listeners observe that outcome.
///
/// ## Architecture
///
/// ```text
/// ┌───────────┐  ApplyViewConfiguration  ┌──────────────┐
/// │ Initiator │ ───────────────────────> │ EventMediator│
/// └───────────┘                          └──────────────┘
///                                               │
///                                               ▼
///                                      ┌──────────────────┐
///                                      │ HeaderCoordinator│
///                                      └──────────────────┘
///                                               │ ViewConfigurationApplied
///                                               ▼
///                                        ┌────────────┐
///                                        │ Listeners  │
///                                        │ (breadcrumb│
///                                        │  telemetry)│
///                                        └────────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let mediator = EventMediator::new();
///
/// let _sub = mediator.listen(|applied: &ViewConfigurationApplied| {
///     println!("changed: {}", applied.was_changed);
/// });
///
/// mediator.publish(&ApplyViewConfiguration::new(config));
/// ```
///
/// Work arriving from other threads goes through [`UiDispatcher`] first.

pub mod bus;
pub mod dispatcher;
pub mod events;

// Re-export commonly used types
pub use bus::{DispatchSummary, Event, EventMediator, Subscription, SubscriptionId};
pub use dispatcher::{UiDispatcher, UiTask};
pub use events::{
    ApplyViewConfiguration, ConnectionStatus, ConnectionStatusChanged, StepSelected,
    ViewConfigurationApplied, HEADER_TARGET,
};
