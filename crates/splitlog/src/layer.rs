//! Bridge from the `tracing` ecosystem into a [`Logger`].
//!
//! Applications that log through `tracing` macros can route those events
//! through the same formatting and rotation engine by stacking this layer
//! onto their subscriber:
//!
//! ```ignore
//! use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
//!
//! tracing_subscriber::registry()
//!     .with(splitlog::LoggerLayer::new(logger.clone()))
//!     .init();
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::format::CallSite;
use crate::level::Level;
use crate::logger::Logger;

/// Routes `tracing` events into a logger.
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

/// Extracts the `message` field; any other fields become `key=value`
/// suffixes on the message.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from_tracing(*metadata.level());

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        let mut message = visitor.message;
        for (key, value) in &visitor.fields {
            message.push(' ');
            message.push_str(key);
            message.push('=');
            message.push_str(value);
        }

        let call_site = if self.logger.reports_call_site() {
            match (metadata.file(), metadata.line()) {
                (Some(file), Some(line)) => Some(CallSite { file, line }),
                _ => None,
            }
        } else {
            None
        };

        self.logger.log_with_call_site(level, &message, call_site);
    }
}
