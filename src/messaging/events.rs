/// Event types for the application
///
/// Events are broadcast over the [`super::EventMediator`]. Requests are
/// phrased imperatively (`ApplyViewConfiguration`), notifications in the past
/// tense.
use crate::header::ViewConfiguration;
use crate::unit::UnitHandle;

use super::bus::Event;

/// Target name carried by header notifications
pub const HEADER_TARGET: &str = "Header";

/// Request to switch the shared header to a configuration.
///
/// A request without a configuration is malformed and is rejected by the
/// header coordinator before any state changes.
#[derive(Debug, Clone)]
pub struct ApplyViewConfiguration {
    pub configuration: Option<ViewConfiguration>,
}

impl ApplyViewConfiguration {
    pub fn new(configuration: ViewConfiguration) -> Self {
        Self {
            configuration: Some(configuration),
        }
    }

    pub fn empty() -> Self {
        Self {
            configuration: None,
        }
    }
}

impl Event for ApplyViewConfiguration {
    const NAME: &'static str = "ApplyViewConfiguration";
}

/// Outcome of one apply request
#[derive(Debug, Clone)]
pub struct ViewConfigurationApplied {
    pub configuration: ViewConfiguration,
    pub target: String,
    pub was_changed: bool,
}

impl Event for ViewConfigurationApplied {
    const NAME: &'static str = "ViewConfigurationApplied";
}

/// A navigation step became the active one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSelected {
    pub step_id: String,
    pub section: String,
    pub previous: Option<String>,
    pub unit: UnitHandle,
}

impl Event for StepSelected {
    const NAME: &'static str = "StepSelected";
}

/// Connection state of the remote requirements server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl ConnectionStatus {
    pub fn description(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Failed => "Connection failed",
        }
    }
}

/// Connection state changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatusChanged {
    pub status: ConnectionStatus,
    pub detail: Option<String>,
}

impl Event for ConnectionStatusChanged {
    const NAME: &'static str = "ConnectionStatusChanged";
}

impl ConnectionStatusChanged {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} ({})", self.status.description(), detail),
            None => self.status.description().to_string(),
        }
    }
}
