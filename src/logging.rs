//! Logging collaborator: the [`Log`] trait and its implementations.
//!
//! The registries and host conveniences log purely for diagnostics through
//! a [`Log`] handle, never directly to a backend. Production code uses
//! [`TracingLog`], which forwards to the [`tracing`] facade; tests use
//! [`RecordingLog`], which captures messages in memory so assertions can
//! inspect what was emitted (the non-fatal escalation path in particular).

use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a captured log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Fine-grained tracing for development.
    Trace,
    /// Diagnostic detail (may be suppressed on console).
    Debug,
    /// Informational message.
    Info,
    /// Warning: degraded behavior, execution continues.
    Warn,
}

/// Abstraction over logging backends.
///
/// Both [`TracingLog`] (forwarding to the `tracing` facade) and
/// [`RecordingLog`] (in-memory capture for tests) implement this trait,
/// allowing registry code to log without knowing where output lands.
pub trait Log: Send + Sync {
    /// Log a fine-grained trace message.
    fn trace(&self, msg: &str);
    /// Log a debug message.
    fn debug(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
}

/// Production [`Log`] implementation backed by the [`tracing`] facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl Log for TracingLog {
    fn trace(&self, msg: &str) {
        tracing::trace!(target: "batchkit", "{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!(target: "batchkit", "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!(target: "batchkit", "{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "batchkit", "{msg}");
    }
}

/// In-memory [`Log`] implementation that records every message.
///
/// Cloning shares the underlying buffer, so a test can hand a clone to the
/// code under test and inspect the original afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingLog {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingLog {
    /// Create an empty recording log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all recorded `(level, message)` pairs.
    #[must_use]
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return the messages recorded at a given level.
    #[must_use]
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: Level, msg: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, msg.to_string()));
    }
}

impl Log for RecordingLog {
    fn trace(&self, msg: &str) {
        self.push(Level::Trace, msg);
    }

    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }
}

/// Install a global `tracing` subscriber for host applications.
///
/// Filtering follows `RUST_LOG` when set, defaulting to `info`. Calling
/// this more than once is a no-op (the first subscriber wins), so library
/// consumers that install their own subscriber are unaffected.
pub fn init_subscriber() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).without_time().try_init();
}
