//! Pluggable logging.

use std::error::Error as StdError;

/// The logger a [`Method`](crate::Method) reports through.
///
/// `panic` and `fatal` never return: `panic` is used for registration errors,
/// `fatal` for faults that should have been impossible after registration.
pub trait Logger: Send + Sync {
    fn panic(&self, msg: &str) -> !;
    fn fatal(&self, msg: &str) -> !;
    fn error(&self, msg: &str);
    fn error_with_cause(&self, msg: &str, cause: &(dyn StdError + 'static));
    fn warn(&self, msg: &str);
    fn warn_with_cause(&self, msg: &str, cause: &(dyn StdError + 'static));
    fn debug(&self, msg: &str);
}

/// The default logger, which emits `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn panic(&self, msg: &str) -> ! {
        tracing::error!("{}", msg);
        panic!("{}", msg)
    }

    fn fatal(&self, msg: &str) -> ! {
        tracing::error!(fatal = true, "{}", msg);
        std::process::abort()
    }

    fn error(&self, msg: &str) {
        tracing::error!("{}", msg);
    }

    fn error_with_cause(&self, msg: &str, cause: &(dyn StdError + 'static)) {
        tracing::error!(error = %cause, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{}", msg);
    }

    fn warn_with_cause(&self, msg: &str, cause: &(dyn StdError + 'static)) {
        tracing::warn!(error = %cause, "{}", msg);
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{}", msg);
    }
}
