//! Error reporting for failed diagrams.
//!
//! A failed block never stops the document pass; its error is handed to an
//! [`ErrorReporter`] instead.

use std::sync::{Mutex, PoisonError};

/// Receives one message per failed diagram.
pub trait ErrorReporter: Send + Sync {
    fn error(&self, message: &str);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Keeps every reported message in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<String>>,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for CollectingReporter {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::new();
        assert!(reporter.is_empty());

        reporter.error("first");
        reporter.error("second");

        assert_eq!(reporter.len(), 2);
        assert_eq!(reporter.messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_collecting_reporter_shared_across_threads() {
        let reporter = CollectingReporter::new();

        std::thread::scope(|s| {
            for i in 0..4 {
                let reporter = &reporter;
                s.spawn(move || reporter.error(&format!("error {i}")));
            }
        });

        assert_eq!(reporter.len(), 4);
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingReporter.error("[dotfig]: something failed");
    }
}
