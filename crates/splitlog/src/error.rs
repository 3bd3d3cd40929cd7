//! Construction-time error types.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised while building a logger.
///
/// These are fatal to construction and surface to the caller; once a logger
/// is built, write-path I/O failures are absorbed by the streams instead.
/// `Clone` because the global registry stores the outcome of the single
/// winning initialization and hands it to every later caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SetupError {
    #[error("log output directory is required")]
    MissingOutputDir,

    #[error("cannot use log directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: Arc<io::Error>,
    },
}

impl SetupError {
    pub(crate) fn directory(path: PathBuf, source: io::Error) -> Self {
        SetupError::Directory {
            path,
            source: Arc::new(source),
        }
    }
}
