//! Logger construction and the write path.
//!
//! A [`Logger`] owns two rotating streams built from the same directory and
//! prefix: the combined stream receives every record at or above the
//! configured threshold, the error-only stream additionally receives
//! error-class records. Routing is a static per-level table built once at
//! construction; rotation is checked lazily on each write, so construction
//! spawns no background thread.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use crate::error::SetupError;
use crate::format::{CallSite, LineFormatter, LogRecord};
use crate::level::Level;
use crate::rotate::RotatingFileWriter;
use crate::writer::FanoutWriter;

const DEFAULT_SAVE_DAYS: u32 = 7;

/// Logger construction options.
pub struct LoggerOptions {
    /// Base directory for log files. Required; created if absent (single
    /// level only).
    pub output_dir: PathBuf,
    /// Minimum severity that produces output.
    pub min_level: Level,
    /// When true, call-site capture is skipped on every log call.
    pub high_performance: bool,
    /// Optional file-name prefix; empty means no prefix segment at all.
    pub file_prefix: String,
    /// Files whose file-name date is older than this many days are pruned
    /// on rotation. `0` means the default of 7 days.
    pub save_days: u32,
    /// Extra destinations mirrored alongside the files, e.g. stdout in
    /// development.
    pub ext_writers: Vec<Box<dyn Write + Send>>,
    /// Custom chrono timestamp layout; empty or absent uses the default.
    pub custom_time_layout: Option<String>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::new(),
            min_level: Level::Info,
            high_performance: false,
            file_prefix: String::new(),
            save_days: 0,
            ext_writers: Vec::new(),
            custom_time_layout: None,
        }
    }
}

/// A fully configured logger instance.
///
/// Exclusively owns its rotating streams; share across threads via `Arc`.
pub struct Logger {
    min_level: Level,
    report_call_site: bool,
    formatter: LineFormatter,
    routes: [Vec<Arc<RotatingFileWriter>>; Level::COUNT],
    fanout: Mutex<FanoutWriter>,
    combined: Arc<RotatingFileWriter>,
    error: Arc<RotatingFileWriter>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .field("report_call_site", &self.report_call_site)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(options: LoggerOptions) -> Result<Self, SetupError> {
        let LoggerOptions {
            output_dir,
            min_level,
            high_performance,
            file_prefix,
            save_days,
            ext_writers,
            custom_time_layout,
        } = options;

        if output_dir.as_os_str().is_empty() {
            return Err(SetupError::MissingOutputDir);
        }
        match fs::metadata(&output_dir) {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&output_dir)
                    .map_err(|err| SetupError::directory(output_dir.clone(), err))?;
            }
            Err(err) => return Err(SetupError::directory(output_dir, err)),
        }

        let prefix = if file_prefix.is_empty() {
            String::new()
        } else {
            format!("{file_prefix}-")
        };
        let save_days = if save_days == 0 {
            DEFAULT_SAVE_DAYS
        } else {
            save_days
        };

        let combined = Arc::new(RotatingFileWriter::new(
            output_dir.clone(),
            format!("{prefix}combined-"),
            format!("latest-combined-{prefix}log"),
            save_days,
        ));
        let error = Arc::new(RotatingFileWriter::new(
            output_dir,
            format!("{prefix}error-"),
            format!("latest-error-{prefix}log"),
            save_days,
        ));

        let routes = Level::ALL.map(|level| {
            if level.is_error_class() {
                vec![combined.clone(), error.clone()]
            } else {
                vec![combined.clone()]
            }
        });

        Ok(Self {
            min_level,
            report_call_site: !high_performance,
            formatter: LineFormatter::new(custom_time_layout),
            routes,
            fanout: Mutex::new(FanoutWriter::new(ext_writers)),
            combined,
            error,
        })
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn reports_call_site(&self) -> bool {
        self.report_call_site
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: &str) {
        let location = std::panic::Location::caller();
        let call_site = if self.report_call_site {
            Some(CallSite {
                file: location.file(),
                line: location.line(),
            })
        } else {
            None
        };
        self.log_with_call_site(level, message, call_site);
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.log(Level::Trace, message);
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    #[track_caller]
    pub fn fatal(&self, message: &str) {
        self.log(Level::Fatal, message);
    }

    #[track_caller]
    pub fn panic(&self, message: &str) {
        self.log(Level::Panic, message);
    }

    /// Write path used by both the level helpers and the tracing bridge.
    ///
    /// Records below the threshold are dropped before any formatting work.
    /// A record whose execution unit cannot be resolved is reported to
    /// stderr and dropped; it never aborts the caller.
    pub fn log_with_call_site(&self, level: Level, message: &str, call_site: Option<CallSite>) {
        if level < self.min_level {
            return;
        }
        let record = LogRecord {
            timestamp: Local::now(),
            level,
            message,
            call_site,
        };
        match self.formatter.format(&record) {
            Ok(line) => {
                for stream in &self.routes[level.index()] {
                    stream.write_line(&line);
                }
                self.fanout.lock().write_line(&line);
            }
            Err(err) => {
                eprintln!("splitlog: dropping record, cannot resolve execution unit: {err}");
            }
        }
    }

    pub fn flush(&self) {
        self.combined.flush();
        self.error.flush();
        self.fanout.lock().flush();
    }

    /// Flush and close both streams for orderly shutdown. The logger stays
    /// usable; a later write reopens its stream.
    pub fn close(&self) {
        self.combined.close();
        self.error.close();
        self.fanout.lock().flush();
    }
}
