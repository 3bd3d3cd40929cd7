//! Severity levels and their routing class.

use std::fmt;
use std::str::FromStr;

/// Log severity, ordered from least to most severe.
///
/// `Error`, `Fatal` and `Panic` form the error class: records at these
/// levels are mirrored into the error-only stream in addition to the
/// combined stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Panic = 6,
}

impl Level {
    /// Number of severity levels; sizes the per-level route table.
    pub(crate) const COUNT: usize = 7;

    /// All levels in ascending severity order.
    pub(crate) const ALL: [Level; Level::COUNT] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    /// Whether records at this level route to the error-only stream as well.
    pub fn is_error_class(self) -> bool {
        matches!(self, Level::Error | Level::Fatal | Level::Panic)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
        }
    }

    /// Map a `tracing` level onto the corresponding severity.
    pub fn from_tracing(level: tracing::Level) -> Level {
        if level == tracing::Level::TRACE {
            Level::Trace
        } else if level == tracing::Level::DEBUG {
            Level::Debug
        } else if level == tracing::Level::INFO {
            Level::Info
        } else if level == tracing::Level::WARN {
            Level::Warn
        } else {
            Level::Error
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "panic" => Ok(Level::Panic),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}
