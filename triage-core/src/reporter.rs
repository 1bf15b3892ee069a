//! Reporting capability handed to the engine.
//!
//! The engine never logs through a global: callers pass a [`Reporter`] in, so
//! the binary can route messages to `tracing` while tests capture them.

use std::sync::Mutex;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for progress and diagnostic messages.
pub trait Reporter: Send + Sync {
    fn report(&self, level: ReportLevel, message: &str);

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(ReportLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, message);
    }
}

/// Forwards every message to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Info => tracing::info!("{message}"),
            ReportLevel::Warn => tracing::warn!("{message}"),
            ReportLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(ReportLevel, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in arrival order.
    pub fn entries(&self) -> Vec<(ReportLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at `level`.
    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(ReportLevel::Warn)
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_records_in_order() {
        let reporter = MemoryReporter::new();
        reporter.info("starting");
        reporter.warn("file missing");
        reporter.error("boom");

        let entries = reporter.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], (ReportLevel::Info, "starting".to_string()));
        assert_eq!(reporter.warnings(), vec!["file missing".to_string()]);
        assert_eq!(reporter.messages(ReportLevel::Error), vec!["boom".to_string()]);
    }

    #[test]
    fn test_reporter_is_object_safe() {
        let reporter: Box<dyn Reporter> = Box::new(TracingReporter);
        reporter.info("does not panic without a subscriber");
    }

    #[test]
    fn test_level_display() {
        assert_eq!(ReportLevel::Warn.to_string(), "WARN");
    }
}
