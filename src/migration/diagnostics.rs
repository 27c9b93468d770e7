//! Warning sinks injected into the index pipeline

use std::sync::Mutex;

/// Receives the human-readable messages the middleware emits instead of failing
pub trait WarningSink: Send + Sync {
    /// A deprecated option was used and rewritten
    fn deprecation(&self, message: &str);

    /// A failure was recovered locally (e.g. a duplicate index was skipped)
    fn warn(&self, message: &str);
}

/// Forwards to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn deprecation(&self, message: &str) {
        log::warn!(target: "lifeguard::deprecation", "DEPRECATION WARNING: {message}");
    }

    fn warn(&self, message: &str) {
        log::warn!(target: "lifeguard::migration", "{message}");
    }
}

/// Keeps every message in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    deprecations: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deprecations(&self) -> Vec<String> {
        self.deprecations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl WarningSink for MemorySink {
    fn deprecation(&self, message: &str) {
        self.deprecations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
