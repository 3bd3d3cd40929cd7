//! Database statement tracing.
//!
//! A thin producer over a [`Logger`]: time a statement, hand the tracer the
//! begin instant, the statement text and the outcome, and it picks the
//! severity. Works against any database layer that can report begin time,
//! statement and an optional error.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::logger::Logger;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTraceOptions {
    /// Statements slower than this are reported at warn severity.
    pub slow_threshold: Option<Duration>,
}

pub struct QueryTracer {
    logger: Arc<Logger>,
    slow_threshold: Option<Duration>,
}

impl QueryTracer {
    pub fn new(logger: Arc<Logger>, options: QueryTraceOptions) -> Self {
        Self {
            logger,
            slow_threshold: options.slow_threshold,
        }
    }

    /// Record one executed statement.
    ///
    /// Failed statements log at error, slow ones at warn, the rest at
    /// debug.
    pub fn record(&self, started: Instant, statement: &str, error: Option<&dyn fmt::Display>) {
        let cost = started.elapsed();
        if let Some(err) = error {
            self.logger
                .error(&format!("[SQL Error][cost {cost:?}] {statement} | {err}"));
            return;
        }
        if let Some(threshold) = self.slow_threshold {
            if cost > threshold {
                self.logger
                    .warn(&format!("[Slow SQL][cost {cost:?}] {statement}"));
                return;
            }
        }
        self.logger
            .debug(&format!("[SQL][cost {cost:?}] {statement}"));
    }
}
