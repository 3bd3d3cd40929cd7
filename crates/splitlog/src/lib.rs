//! # Splitlog
//!
//! Severity-split, date-rotated file logging with a fixed line layout.
//!
//! Every record renders as
//! `<timestamp> [PID:<n>][<file>:<line>][<LEVEL>]<message>` and lands in a
//! combined daily file; error-class records (`error`, `fatal`, `panic`) are
//! mirrored into a second error-only daily file. Both streams keep a stable
//! `latest-*` alias pointing at the current day's file and prune their own
//! history past the retention window.
//!
//! ## Modules
//!
//! - `level` - severity levels and their routing class
//! - `format` - the line formatter
//! - `logger` - logger construction and the write path
//! - `registry` - the process-wide shared logger
//! - `layer` - bridge from `tracing` events into a logger
//! - `query` - database statement tracing
//!
//! ## Usage
//!
//! ```no_run
//! use splitlog::{init_global_logger, shared_logger, Level, LoggerOptions};
//!
//! init_global_logger(LoggerOptions {
//!     output_dir: "./logs".into(),
//!     min_level: Level::Debug,
//!     file_prefix: "myapp".to_string(),
//!     ..LoggerOptions::default()
//! })
//! .expect("logger setup failed");
//!
//! if let Some(logger) = shared_logger() {
//!     logger.info("service started");
//! }
//! ```

pub mod error;
pub mod format;
pub mod layer;
pub mod level;
pub mod logger;
pub mod query;
pub mod registry;

mod rotate;
mod task_id;
mod writer;

pub use error::SetupError;
pub use format::{CallSite, LineFormatter, LogRecord, DEFAULT_TIMESTAMP_LAYOUT};
pub use layer::LoggerLayer;
pub use level::Level;
pub use logger::{Logger, LoggerOptions};
pub use query::{QueryTraceOptions, QueryTracer};
pub use registry::{
    init_global_logger, new_logger_handle, shared_logger, shutdown_global_logger, InitOutcome,
};
pub use task_id::{current_task_id, TaskIdError};
