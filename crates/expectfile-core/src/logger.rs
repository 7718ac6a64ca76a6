//! Line sink for report output.
//!
//! The reporter hands each finished line to a `LineLogger`. Nothing here
//! touches global state, so tests capture output with `MockLogger`.

use std::sync::{Arc, RwLock};

/// Severity attached to a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Passing records and the pass summary
    Info,
    /// Failing records and the fail summary
    Failure,
}

/// Receives report lines, one string per line.
pub trait LineLogger: Send + Sync {
    fn line(&self, severity: Severity, message: &str);
}

/// Forwards lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl LineLogger for TracingLogger {
    fn line(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: "expectfile::report", "{}", message),
            Severity::Failure => tracing::warn!(target: "expectfile::report", "{}", message),
        }
    }
}

/// A captured report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Captures every line for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Captured messages in order.
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    pub fn messages_at(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message)
            .collect()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }

    pub fn count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl LineLogger for MockLogger {
    fn line(&self, severity: Severity, message: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogEntry {
                severity,
                message: message.to_string(),
            });
    }
}

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl LineLogger for NullLogger {
    fn line(&self, _severity: Severity, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_logger_captures_in_order() {
        let logger = MockLogger::new();
        logger.line(Severity::Failure, "FAIL: a.txt missing");
        logger.line(Severity::Info, "PASS: b.txt");

        assert_eq!(logger.count(), 2);
        assert_eq!(logger.messages(), vec!["FAIL: a.txt missing", "PASS: b.txt"]);
        assert_eq!(logger.messages_at(Severity::Info), vec!["PASS: b.txt"]);
        assert!(logger.contains("a.txt"));
        assert!(!logger.contains("c.txt"));
    }

    #[test]
    fn test_mock_logger_clones_share_buffer() {
        let logger = MockLogger::new();
        let shared: Arc<dyn LineLogger> = Arc::new(logger.clone());
        shared.line(Severity::Info, "PASS");
        assert_eq!(logger.messages(), vec!["PASS"]);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Failure);
    }
}
