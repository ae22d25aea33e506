use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{Generation, Level, Span, Trace, TraceBackend};
use crate::error::TraceError;
use crate::types::SessionId;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub id: String,
    pub name: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    Span,
    Generation,
}

/// Everything that was reported about one span or generation.
#[derive(Debug, Clone)]
pub struct ObservationRecord {
    pub id: u64,
    pub trace_id: String,
    pub kind: ObservationKind,
    pub name: String,
    pub model: Option<String>,
    pub metadata: serde_json::Value,
    pub input: serde_json::Value,
    pub level: Level,
    pub completion_start: Option<DateTime<Utc>>,
    pub output: Option<String>,
    pub end_calls: usize,
}

#[derive(Default)]
struct Store {
    traces: Vec<TraceRecord>,
    observations: Vec<ObservationRecord>,
    flushes: usize,
}

/// In-memory [`TraceBackend`] that keeps every call for later inspection.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    store: Arc<Mutex<Store>>,
    next_id: Arc<AtomicU64>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traces(&self) -> Vec<TraceRecord> {
        lock(&self.store).traces.clone()
    }

    pub fn observations(&self) -> Vec<ObservationRecord> {
        lock(&self.store).observations.clone()
    }

    /// Observations with the given name, in the order they were opened.
    pub fn named(&self, name: &str) -> Vec<ObservationRecord> {
        lock(&self.store)
            .observations
            .iter()
            .filter(|o| o.name == name)
            .cloned()
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        lock(&self.store).flushes
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl TraceBackend for RecordingBackend {
    fn trace(&self, name: &str, session_id: &SessionId) -> Arc<dyn Trace> {
        let id = format!("trace-{}", self.next_id());
        lock(&self.store).traces.push(TraceRecord {
            id: id.clone(),
            name: name.to_string(),
            session_id: session_id.to_string(),
        });
        Arc::new(RecordedTrace {
            id,
            backend: self.clone(),
        })
    }

    fn flush(&self) -> Result<(), TraceError> {
        lock(&self.store).flushes += 1;
        Ok(())
    }
}

struct RecordedTrace {
    id: String,
    backend: RecordingBackend,
}

impl RecordedTrace {
    fn open(
        &self,
        kind: ObservationKind,
        name: &str,
        model: Option<&str>,
        metadata: serde_json::Value,
        input: serde_json::Value,
    ) -> Handle {
        let id = self.backend.next_id();
        lock(&self.backend.store).observations.push(ObservationRecord {
            id,
            trace_id: self.id.clone(),
            kind,
            name: name.to_string(),
            model: model.map(str::to_string),
            metadata,
            input,
            level: Level::Default,
            completion_start: None,
            output: None,
            end_calls: 0,
        });
        Handle {
            id,
            store: self.backend.store.clone(),
        }
    }
}

impl Trace for RecordedTrace {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn span(&self, name: &str, metadata: serde_json::Value) -> Box<dyn Span> {
        Box::new(self.open(
            ObservationKind::Span,
            name,
            None,
            metadata,
            serde_json::Value::Null,
        ))
    }

    fn generation(
        &self,
        name: &str,
        model: &str,
        input: serde_json::Value,
    ) -> Box<dyn Generation> {
        Box::new(self.open(
            ObservationKind::Generation,
            name,
            Some(model),
            serde_json::Value::Null,
            input,
        ))
    }
}

struct Handle {
    id: u64,
    store: Arc<Mutex<Store>>,
}

impl Handle {
    fn with<F: FnOnce(&mut ObservationRecord)>(&self, f: F) {
        let mut store = lock(&self.store);
        if let Some(record) = store.observations.iter_mut().find(|o| o.id == self.id) {
            f(record);
        }
    }
}

impl Span for Handle {
    fn update_level(&mut self, level: Level) {
        self.with(|r| r.level = level);
    }

    fn end(self: Box<Self>) {
        self.with(|r| r.end_calls += 1);
    }
}

impl Generation for Handle {
    fn update_level(&mut self, level: Level) {
        self.with(|r| r.level = level);
    }

    fn set_completion_start(&mut self, at: DateTime<Utc>) {
        self.with(|r| r.completion_start = Some(at));
    }

    fn end(self: Box<Self>, output: String) {
        self.with(|r| {
            r.output = Some(output);
            r.end_calls += 1;
        });
    }
}

fn lock(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_span_lifecycle() {
        let backend = RecordingBackend::new();
        let trace = backend.trace("t", &SessionId("s".to_string()));

        let mut span = trace.span("stt_node", serde_json::json!({"model": "deepgram"}));
        span.update_level(Level::Error);
        span.end();

        let records = backend.named("stt_node");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ObservationKind::Span);
        assert_eq!(records[0].trace_id, trace.id());
        assert_eq!(records[0].metadata["model"], "deepgram");
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[0].end_calls, 1);
    }

    #[test]
    fn test_records_generation_output() {
        let backend = RecordingBackend::new();
        let trace = backend.trace("t", &SessionId("s".to_string()));

        let mut generation = trace.generation("llm_generation", "gpt-4.1", serde_json::json!([]));
        generation.set_completion_start(Utc::now());
        generation.end("hello".to_string());

        let record = &backend.named("llm_generation")[0];
        assert_eq!(record.model.as_deref(), Some("gpt-4.1"));
        assert!(record.completion_start.is_some());
        assert_eq!(record.output.as_deref(), Some("hello"));
        assert_eq!(record.end_calls, 1);
    }
}
