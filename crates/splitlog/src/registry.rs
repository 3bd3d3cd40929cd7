//! Process-wide logger registry.
//!
//! Holds at most one [`Logger`]. The first `init_global_logger` call wins;
//! its outcome (instance or construction error) is the single authoritative
//! result that every concurrent or later caller observes. A successful
//! initialization is never replaced.

use std::sync::{Arc, OnceLock};

use crate::error::SetupError;
use crate::logger::{Logger, LoggerOptions};

static SHARED: OnceLock<Result<Arc<Logger>, SetupError>> = OnceLock::new();

/// What a call to [`init_global_logger`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// This call performed the one-time initialization.
    Initialized,
    /// A previous call already initialized the registry; this call was a
    /// no-op and the existing instance is untouched.
    AlreadyInitialized,
}

/// Initialize the process-wide logger. Idempotent: concurrent first-time
/// callers are serialized by the gate and all observe the outcome of the
/// single winning attempt.
pub fn init_global_logger(options: LoggerOptions) -> Result<InitOutcome, SetupError> {
    let mut performed = false;
    let outcome = SHARED.get_or_init(|| {
        performed = true;
        Logger::new(options).map(Arc::new)
    });
    match outcome {
        Ok(_) if performed => Ok(InitOutcome::Initialized),
        Ok(_) => Ok(InitOutcome::AlreadyInitialized),
        Err(err) => Err(err.clone()),
    }
}

/// Handle to the shared logger, or `None` before (or after a failed)
/// initialization. Callers are expected to handle the unset case; it is
/// not a crash-worthy condition.
pub fn shared_logger() -> Option<Arc<Logger>> {
    SHARED.get().and_then(|outcome| outcome.as_ref().ok()).cloned()
}

/// Build an independent logger with the same construction contract,
/// bypassing the one-time gate. For dedicated side-channel logs (e.g. a
/// distinct file prefix) that must not contend with the shared instance.
pub fn new_logger_handle(options: LoggerOptions) -> Result<Logger, SetupError> {
    Logger::new(options)
}

/// Flush and close the shared logger's streams during orderly shutdown.
/// A no-op when the registry was never initialized.
pub fn shutdown_global_logger() {
    if let Some(logger) = shared_logger() {
        logger.close();
    }
}
