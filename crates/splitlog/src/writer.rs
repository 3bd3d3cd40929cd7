//! Fan-out to caller-supplied sinks.

use std::io::{self, Write};

/// Mirrors every rendered line to each extra writer, best-effort.
///
/// The fan-out always ends in a discard sink, so the underlying output has
/// a default destination that stays off the terminal even when no extra
/// writers are configured.
pub(crate) struct FanoutWriter {
    sinks: Vec<Box<dyn Write + Send>>,
}

impl FanoutWriter {
    pub(crate) fn new(extra: Vec<Box<dyn Write + Send>>) -> Self {
        let mut sinks = extra;
        sinks.push(Box::new(io::sink()));
        Self { sinks }
    }

    pub(crate) fn write_line(&mut self, line: &[u8]) {
        for sink in &mut self.sinks {
            let _ = sink.write_all(line);
            let _ = sink.flush();
        }
    }

    pub(crate) fn flush(&mut self) {
        for sink in &mut self.sinks {
            let _ = sink.flush();
        }
    }
}
