use thiserror::Error;

/// Library-level errors using thiserror for structured error handling.
///
/// Each enum covers one concern of the navigation core. Handler and refresh
/// failures travel as `anyhow::Error` and are wrapped in [`DispatchError`]
/// before they reach an [`crate::diagnostics::ErrorSink`].

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Duplicate step id '{id}' in section '{section}'")]
    DuplicateStepId { id: String, section: String },

    #[error("Unknown step id: {0}")]
    UnknownStepId(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid view configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read settings from {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings to {path}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode or decode value for key '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine the platform config directory")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Handler for {event} failed")]
    HandlerFailed {
        event: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Handler for {event} panicked: {message}")]
    HandlerPanicked { event: &'static str, message: String },

    #[error("Refresh of unit '{unit}' failed")]
    RefreshFailed {
        unit: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Error, Debug)]
pub enum ShellConfigError {
    #[error("Failed to load shell configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save shell configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid shell configuration: {0}")]
    Invalid(String),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = NavigationError::UnknownStepId("nonexistent".to_string());
        assert_eq!(err.to_string(), "Unknown step id: nonexistent");

        let err = NavigationError::DuplicateStepId {
            id: "clarifying".to_string(),
            section: "Repair".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate step id 'clarifying' in section 'Repair'"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err = PersistenceError::WriteFailed {
            path: "/test/settings.json".to_string(),
            source: io_err,
        };

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Failed to write settings to /test/settings.json");
    }

    #[test]
    fn test_dispatch_error_keeps_handler_cause() {
        let err = DispatchError::HandlerFailed {
            event: "ApplyViewConfiguration",
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "Handler for ApplyViewConfiguration failed");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }
}
