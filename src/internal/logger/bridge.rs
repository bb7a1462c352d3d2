// src/internal/logger/bridge.rs

use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use super::callsite::Origin;
use super::facade::{global, Facade};
use super::level::Level;

#[derive(Debug, Clone)]
enum Target {
    Global,
    Fixed(Arc<Facade>),
}

/// Forwards `tracing` events from dependencies into a facade, using the
/// event target as the record identity.
#[derive(Debug, Clone)]
pub struct TracingBridge {
    target: Target,
}

impl TracingBridge {
    /// Route to whichever facade is global when the event fires.
    pub fn global() -> Self {
        Self {
            target: Target::Global,
        }
    }

    pub fn fixed(facade: Arc<Facade>) -> Self {
        Self {
            target: Target::Fixed(facade),
        }
    }

    fn facade(&self) -> Arc<Facade> {
        match &self.target {
            Target::Global => global(),
            Target::Fixed(facade) => Arc::clone(facade),
        }
    }
}

impl<S: Subscriber> Layer<S> for TracingBridge {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(metadata.level());
        let facade = self.facade();
        if !facade.is_enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        facade.emit(
            level,
            Origin::Named(metadata.target()),
            format_args!("{}", visitor.finish()),
        );
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        match &self.target {
            Target::Global => None,
            Target::Fixed(facade) => Some(LevelFilter::from(facade.threshold())),
        }
    }
}

/// Collects the `message` field plus every other field as `key=value`.
#[derive(Debug, Default)]
struct FieldVisitor {
    message: String,
    fields: String,
}

impl FieldVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

/// Install the global-target bridge as the process-wide tracing
/// subscriber. Leaves an existing subscriber in place.
pub(crate) fn install_global() {
    // A subscriber installed earlier (or by the host program) wins.
    let _ = tracing_subscriber::registry()
        .with(TracingBridge::global())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::logger::format::RecordLine;
    use crate::internal::logger::sink::MemorySink;

    #[test]
    fn test_bridge_uses_target_as_identity() {
        let sink = Arc::new(MemorySink::new());
        let facade = Arc::new(Facade::new(Level::Info, sink.clone()));
        let subscriber = tracing_subscriber::registry().with(TracingBridge::fixed(facade));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "speech::engine", voice = "ap", count = 3, "loaded");
            tracing::debug!(target: "speech::engine", "hidden");
            tracing::warn!(target: "audio", "underrun");
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);

        let first = RecordLine::parse(&lines[0]).unwrap();
        assert_eq!(first.identity, "speech::engine");
        assert_eq!(first.level, Level::Info);
        assert_eq!(first.message, "loaded voice=ap count=3");

        let second = RecordLine::parse(&lines[1]).unwrap();
        assert_eq!(second.identity, "audio");
        assert_eq!(second.level, Level::Warning);
        assert_eq!(second.message, "underrun");
    }

    #[test]
    fn test_field_only_event() {
        let mut visitor = FieldVisitor::default();
        visitor.push_field("code", format_args!("{}", 7));
        assert_eq!(visitor.finish(), "code=7");
    }
}
