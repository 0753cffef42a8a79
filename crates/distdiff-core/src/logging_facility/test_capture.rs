//! In-memory event recording for tests.
//!
//! The capture layer stores every event together with the fields of the
//! spans it was emitted in, so an event logged deep inside a run still shows
//! the run's `run_id`. Event fields win over span fields of the same name.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use distdiff_core_types::schema::field;

/// One recorded event, fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

/// Field values of one span or event
#[derive(Default, Clone)]
struct Fields(HashMap<String, String>);

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    buffer: Buffer,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(fields);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(fields) = span.extensions_mut().get_mut::<Fields>() {
                values.record(fields);
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut merged = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            // root first, so inner spans override outer ones
            for span in scope.from_root() {
                if let Some(fields) = span.extensions().get::<Fields>() {
                    merged.extend(fields.0.clone());
                }
            }
        }
        let mut own = Fields::default();
        event.record(&mut own);
        merged.extend(own.0);

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: merged.get(field::COMPONENT).cloned(),
            op: merged.get(field::OP).cloned(),
            event: merged.get(field::EVENT).cloned(),
            fields: merged,
        };
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(captured);
        }
    }
}

/// Handle on the shared capture buffer
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Events logged for `op`, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    /// # Panics
    ///
    /// When no `op`/`event` pair was recorded.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {}/{} event among {} captured",
            op,
            event,
            events.len()
        );
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber and return its handle.
///
/// The buffer is process-wide: tests running in parallel in one binary see
/// each other's events, so filter on an `op` or field unique to the test.
///
/// ```
/// use distdiff_core::logging_facility::init_test_capture;
/// use distdiff_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_example");
/// capture.assert_event_exists("doc_capture_example", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let (capture, subscriber) = capturing_subscriber();
            let _ = subscriber.try_init();
            capture
        })
        .clone()
}

fn capturing_subscriber() -> (TestCapture, impl Subscriber + Send + Sync) {
    let buffer = Buffer::default();
    let layer = CaptureLayer {
        buffer: buffer.clone(),
    };
    (TestCapture { buffer }, tracing_subscriber::registry().with(layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_fields_reach_nested_events() {
        let (capture, subscriber) = capturing_subscriber();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("compare", run_id = "run-span-test");
            let _guard = span.enter();
            crate::log_op_start!("capture_span_unit_test", layer = "base");
        });

        let events = capture.events_for_op("capture_span_unit_test");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("run_id"), Some("run-span-test"));
        assert_eq!(events[0].field("layer"), Some("base"));
        assert!(events[0].is("capture_span_unit_test", "start"));
    }

    #[test]
    fn test_event_field_overrides_span_field() {
        let (capture, subscriber) = capturing_subscriber();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("outer", layer = "soa");
            let _guard = span.enter();
            crate::log_op_start!("capture_override_unit_test", layer = "base");
        });

        let events = capture.events_for_op("capture_override_unit_test");
        assert_eq!(events[0].field("layer"), Some("base"));
    }

    #[test]
    fn test_clear_empties_buffer() {
        let (capture, subscriber) = capturing_subscriber();

        tracing::subscriber::with_default(subscriber, || {
            crate::log_op_end!("capture_clear_unit_test", duration_ms = 1);
        });
        assert_eq!(capture.events().len(), 1);

        capture.clear();
        assert!(capture.events().is_empty());
    }
}
