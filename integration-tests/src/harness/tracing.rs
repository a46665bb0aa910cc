use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, layer::Context};

/// Only events emitted by the library under test are kept.
const CAPTURED_TARGET: &str = "accesstail_core";

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

/// Appends every `accesstail_core` event to a log shared by the test binary.
struct PipelineEventLayer {
    log: EventLog,
}

fn event_log() -> EventLog {
    static LOG: OnceLock<EventLog> = OnceLock::new();
    LOG.get_or_init(EventLog::default).clone()
}

/// Install the capturing subscriber once per test binary.
pub fn init_test_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::registry().with(PipelineEventLayer { log: event_log() });

        tracing::subscriber::set_global_default(subscriber)
            .expect("failed to set global tracing subscriber");
    });
}

/// Events whose `path` field names `path`.
///
/// Tests run in parallel inside one binary and each one tails files in its own
/// temporary directory, so the path keys a test's events.
pub fn events_for_path(path: &Path) -> Vec<CapturedEvent> {
    let wanted = path.display().to_string();
    event_log()
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.field("path") == Some(wanted.as_str()))
        .cloned()
        .collect()
}

impl<S: Subscriber> Layer<S> for PipelineEventLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if !meta.target().starts_with(CAPTURED_TARGET) {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        self.log.lock().unwrap().push(CapturedEvent {
            level: *meta.level(),
            target: meta.target().to_string(),
            message: collector.message,
            fields: collector.fields,
        });
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: BTreeMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}
