use crate::prelude::*;
use std::sync::Mutex;

use ringbuffer::{AllocRingBuffer, RingBuffer};
use tracing::{field::Visit, Event, Level, Subscriber};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// number of events kept by the layer created in [install_tracing]
pub const RECENT_EVENTS_CAPACITY: usize = 128;

/// Installs the global subscriber.
///
/// The filter is read from env `GW2API_LOG` and falls back to `info`.
/// Formatted events go to `writer` through a non-blocking appender, so the returned guard must be
/// kept alive until the program exits, otherwise buffered lines are lost.
/// The last [RECENT_EVENTS_CAPACITY] events are also kept in the returned [RecentEvents].
pub fn install_tracing<W>(
    writer: W,
) -> Result<(tracing_appender::non_blocking::WorkerGuard, RecentEvents)>
where
    W: std::io::Write + Send + 'static,
{
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};
    let filter_layer = EnvFilter::try_from_env("GW2API_LOG")
        .or_else(|_| EnvFilter::try_new("info"))
        .into_diagnostic()
        .wrap_err("failed to create log filter")?;
    let (nb, guard) = tracing_appender::non_blocking(writer);
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(nb);
    let (recent_layer, recent) = RecentEventsLayer::new(RECENT_EVENTS_CAPACITY);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(recent_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("failed to install global tracing subscriber")?;
    Ok((guard, recent))
}

/// A single event as seen by [RecentEventsLayer]
#[derive(Debug, Clone, PartialEq)]
pub struct TracingEvent {
    pub level: Level,
    pub line: u32,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
    /// names of the spans the event happened in, outermost first
    pub spans: Vec<String>,
}

struct EventVisitor<'a>(&'a mut TracingEvent);
impl Visit for EventVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.0.message = value.to_string(),
            name if name.starts_with("log.") => {}
            name => {
                self.0.fields.insert(name.to_string(), value.to_string());
            }
        }
    }
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => {
                self.0.message = format!("{value:?}");
            }
            "log.line" => {
                self.0.line = format!("{value:?}").parse().unwrap_or_default();
            }
            "log.target" => {
                self.0.target = format!("{value:?}");
            }
            _ => {
                if field.name().starts_with("log.") {
                    return;
                }
                let name = field.name().to_string();
                let value = format!("{value:?}");
                self.0.fields.insert(name, value);
            }
        }
    }
}
impl TracingEvent {
    fn from_event(event: &Event<'_>) -> Self {
        let target = if event.metadata().target() == "log" {
            Default::default()
        } else {
            event.metadata().target().to_string()
        };
        let mut te = Self {
            level: *event.metadata().level(),
            line: event.metadata().line().unwrap_or_default(),
            target,
            message: Default::default(),
            fields: Default::default(),
            spans: Default::default(),
        };
        event.record(&mut EventVisitor(&mut te));
        te
    }
}

/// Read handle to the events captured by a [RecentEventsLayer]
#[derive(Clone)]
pub struct RecentEvents(Arc<Mutex<AllocRingBuffer<TracingEvent>>>);

impl RecentEvents {
    /// copies the buffered events, oldest first
    pub fn snapshot(&self) -> Vec<TracingEvent> {
        match self.0.lock() {
            Ok(events) => events.iter().cloned().collect(),
            // a panic while pushing leaves the buffer itself intact
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
    /// events which carry a field `name` with the formatted `value`
    pub fn with_field(&self, name: &str, value: &str) -> Vec<TracingEvent> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.fields.get(name).map(String::as_str) == Some(value))
            .collect()
    }
}

/// Layer keeping the last few events in memory
pub struct RecentEventsLayer {
    events: Arc<Mutex<AllocRingBuffer<TracingEvent>>>,
}

impl RecentEventsLayer {
    pub fn new(capacity: usize) -> (Self, RecentEvents) {
        let events = Arc::new(Mutex::new(AllocRingBuffer::new(capacity)));
        (
            Self {
                events: events.clone(),
            },
            RecentEvents(events),
        )
    }
}

impl<S> Layer<S> for RecentEventsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut te = TracingEvent::from_event(event);
        if let Some(scope) = ctx.event_scope(event) {
            te.spans = scope.from_root().map(|span| span.name().to_string()).collect();
        }
        match self.events.lock() {
            Ok(mut events) => events.push(te),
            Err(poisoned) => poisoned.into_inner().push(te),
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use similar_asserts::assert_eq;
    use tracing_subscriber::prelude::*;

    use super::RecentEventsLayer;

    #[rstest]
    fn keeps_only_the_newest_events() {
        let (layer, recent) = RecentEventsLayer::new(2);
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("first");
            tracing::info!("second");
            tracing::info_span!("convert").in_scope(|| {
                tracing::warn!(family = "weapon", "third");
            });
        });
        let events = recent.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "second");
        assert_eq!(events[1].message, "third");
        assert_eq!(events[1].spans, vec!["convert".to_string()]);
        assert!(events[0].spans.is_empty());
        assert_eq!(recent.with_field("family", "weapon").len(), 1);
    }
}
