//! Injected warning sink.
//!
//! The validator reports recoverable oddities (an unparseable Content-Type,
//! a schema without an id, use of a deprecated entry point) through a
//! [`Logger`] supplied in the options. The default is [`NoopLogger`].

use std::fmt;

/// A sink for warnings raised while building or running a validator.
pub trait Logger: Send + Sync {
    /// Records a warning. `logging_key` identifies the validator instance
    /// and is empty when none was configured.
    fn warn(&self, logging_key: &str, message: &str);
}

/// Discards every warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn warn(&self, _logging_key: &str, _message: &str) {}
}

/// Forwards warnings to `tracing` at `WARN` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, logging_key: &str, message: &str) {
        tracing::warn!(logging_key, "{}", message);
    }
}

impl fmt::Debug for dyn Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Logger")
    }
}
