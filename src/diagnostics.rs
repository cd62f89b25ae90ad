/// Observability collaborator
///
/// Failures that must not interrupt the caller (handler errors during a
/// publish, persistence writes, refreshes) are reported here exactly once.
use std::sync::Arc;

use parking_lot::Mutex;

/// A reported failure: where it happened and the rendered error chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub context: String,
    pub message: String,
}

impl FailureReport {
    pub fn new(context: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            context: context.into(),
            message,
        }
    }
}

/// Receives failures that were isolated from the caller's control flow.
pub trait ErrorSink: Send + Sync {
    fn report(&self, report: FailureReport);
}

/// Default sink: writes every report through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, report: FailureReport) {
        tracing::error!(context = %report.context, "{}", report.message);
    }
}

/// Sink that keeps every report in memory, and forwards to `tracing` too.
#[derive(Debug, Default, Clone)]
pub struct RecordingErrorSink {
    reports: Arc<Mutex<Vec<FailureReport>>>,
}

impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<FailureReport> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl ErrorSink for RecordingErrorSink {
    fn report(&self, report: FailureReport) {
        tracing::warn!(context = %report.context, "{}", report.message);
        self.reports.lock().push(report);
    }
}

/// Shared handle to whichever sink the session uses
pub type SharedErrorSink = Arc<dyn ErrorSink>;

pub fn tracing_sink() -> SharedErrorSink {
    Arc::new(TracingErrorSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;

    #[test]
    fn test_report_renders_source_chain() {
        let err = PersistenceError::WriteFailed {
            path: "settings.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let report = FailureReport::new("select", &err);

        assert_eq!(report.context, "select");
        assert_eq!(
            report.message,
            "Failed to write settings to settings.json: disk full"
        );
    }

    #[test]
    fn test_recording_sink_collects_reports() {
        let sink = RecordingErrorSink::new();
        let handle: SharedErrorSink = Arc::new(sink.clone());
        assert!(sink.is_empty());

        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        handle.report(FailureReport::new("test", &err));

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].message, "boom");

        sink.clear();
        assert!(sink.is_empty());
    }
}
