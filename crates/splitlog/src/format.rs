//! Line rendering.
//!
//! Every record is rendered into the same fixed layout:
//!
//! ```text
//! <timestamp> [PID:<n>][<file>:<line>][<LEVEL>]<message>\n
//! ```
//!
//! The call-site segment is omitted entirely when the record has none. The
//! message is emitted verbatim, control characters included.

use std::fmt::Write;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::level::Level;
use crate::task_id::{current_task_id, TaskIdError};

/// Timestamp layout used when no custom layout is configured: RFC 3339 with
/// nanosecond precision and the local offset.
pub const DEFAULT_TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

/// Origin of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

/// A single record, produced fresh per log call and immutable once handed
/// to the formatter.
#[derive(Debug)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: &'a str,
    pub call_site: Option<CallSite>,
}

/// Renders records into the fixed line layout.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
    timestamp_layout: Option<String>,
}

impl LineFormatter {
    /// An empty, absent or unparseable layout falls back to
    /// [`DEFAULT_TIMESTAMP_LAYOUT`].
    pub fn new(timestamp_layout: Option<String>) -> Self {
        Self {
            timestamp_layout: timestamp_layout
                .filter(|layout| !layout.is_empty() && is_renderable(layout)),
        }
    }

    /// Render one record. The execution-unit id is re-resolved on every
    /// call; on resolution failure no partial line is returned.
    pub fn format(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, TaskIdError> {
        let layout = self
            .timestamp_layout
            .as_deref()
            .unwrap_or(DEFAULT_TIMESTAMP_LAYOUT);
        let task_id = current_task_id()?;

        let mut line = String::with_capacity(64 + record.message.len());
        let _ = write!(line, "{}", record.timestamp.format(layout));
        line.push_str(" [PID:");
        line.push_str(&task_id.to_string());
        line.push(']');
        if let Some(call_site) = record.call_site {
            line.push('[');
            line.push_str(basename(call_site.file));
            line.push(':');
            line.push_str(&call_site.line.to_string());
            line.push(']');
        }
        line.push('[');
        line.push_str(&record.level.as_str().to_uppercase());
        line.push(']');
        line.push_str(record.message);
        line.push('\n');
        Ok(line.into_bytes())
    }
}

/// Rendering an invalid strftime layout panics inside chrono, so bad
/// layouts are rejected up front.
fn is_renderable(layout: &str) -> bool {
    !StrftimeItems::new(layout).any(|item| matches!(item, Item::Error))
}

fn basename(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}
