//! OpenTelemetry-backed tracing.
//!
//! A trace is a root span named after the agent; stage spans and
//! generations are its children. Every child holds the root, so the root
//! span ends only once the trace and all of its children are gone.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry::trace::{Span as _, Status, TraceContextExt, Tracer as _, TracerProvider as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, Span as SdkSpan};

use super::{Generation, Level, Span, Trace, TraceBackend};
use crate::error::TraceError;
use crate::types::SessionId;

pub struct OtelBackend {
    tracer: SdkTracer,
    provider: SdkTracerProvider,
}

impl OtelBackend {
    /// Build a backend whose spans go to `provider`, and only there.
    pub fn new(provider: SdkTracerProvider) -> Self {
        Self {
            tracer: provider.tracer("glance"),
            provider,
        }
    }
}

impl TraceBackend for OtelBackend {
    fn trace(&self, name: &str, session_id: &SessionId) -> Arc<dyn Trace> {
        let mut root = self
            .tracer
            .start_with_context(name.to_string(), &Context::new());
        root.set_attribute(KeyValue::new("session.id", session_id.to_string()));
        let id = root.span_context().trace_id().to_string();

        Arc::new(OtelTrace {
            id,
            tracer: self.tracer.clone(),
            root: Arc::new(Root {
                cx: Context::new().with_span(root),
            }),
        })
    }

    fn flush(&self) -> Result<(), TraceError> {
        self.provider
            .force_flush()
            .map_err(|e| TraceError::Flush(e.to_string()))
    }
}

/// The turn's root span, ended when the last holder drops it.
struct Root {
    cx: Context,
}

impl Drop for Root {
    fn drop(&mut self) {
        self.cx.span().end();
    }
}

struct OtelTrace {
    id: String,
    tracer: SdkTracer,
    root: Arc<Root>,
}

impl OtelTrace {
    fn child(&self, name: &str) -> SdkSpan {
        self.tracer.start_with_context(name.to_string(), &self.root.cx)
    }
}

impl Trace for OtelTrace {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn span(&self, name: &str, metadata: serde_json::Value) -> Box<dyn Span> {
        let mut span = self.child(name);
        if let serde_json::Value::Object(fields) = metadata {
            for (key, value) in fields {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                span.set_attribute(KeyValue::new(format!("metadata.{}", key), value));
            }
        }
        Box::new(OtelSpan {
            span,
            _root: self.root.clone(),
        })
    }

    fn generation(
        &self,
        name: &str,
        model: &str,
        input: serde_json::Value,
    ) -> Box<dyn Generation> {
        let mut span = self.child(name);
        span.set_attribute(KeyValue::new("gen_ai.request.model", model.to_string()));
        span.set_attribute(KeyValue::new("gen_ai.prompt", input.to_string()));
        Box::new(OtelGeneration {
            span,
            _root: self.root.clone(),
        })
    }
}

fn apply_level(span: &mut SdkSpan, level: Level) {
    span.set_attribute(KeyValue::new("level", level.as_str()));
    if level == Level::Error {
        span.set_status(Status::error("stage failed"));
    }
}

struct OtelSpan {
    span: SdkSpan,
    _root: Arc<Root>,
}

impl Span for OtelSpan {
    fn update_level(&mut self, level: Level) {
        apply_level(&mut self.span, level);
    }

    fn end(mut self: Box<Self>) {
        self.span.end();
    }
}

struct OtelGeneration {
    span: SdkSpan,
    _root: Arc<Root>,
}

impl Generation for OtelGeneration {
    fn update_level(&mut self, level: Level) {
        apply_level(&mut self.span, level);
    }

    fn set_completion_start(&mut self, at: DateTime<Utc>) {
        self.span.set_attribute(KeyValue::new(
            "gen_ai.completion_start_time",
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
        self.span.add_event("completion_start", Vec::new());
    }

    fn end(mut self: Box<Self>, output: String) {
        self.span
            .set_attribute(KeyValue::new("gen_ai.completion", output));
        self.span.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry_sdk::trace::{BatchSpanProcessor, InMemorySpanExporter, SpanData};

    fn backend() -> (OtelBackend, InMemorySpanExporter) {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_span_processor(BatchSpanProcessor::builder(exporter.clone()).build())
            .build();
        (OtelBackend::new(provider), exporter)
    }

    fn finished(exporter: &InMemorySpanExporter, name: &str) -> SpanData {
        exporter
            .get_finished_spans()
            .unwrap()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no span named {}", name))
    }

    fn attribute(span: &SpanData, key: &str) -> Option<String> {
        span.attributes
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| kv.value.to_string())
    }

    #[test]
    fn test_each_trace_gets_its_own_identity() {
        let (backend, _exporter) = backend();
        let session = SessionId("s1".to_string());

        let a = backend.trace("video_agent", &session);
        let b = backend.trace("video_agent", &session);

        assert_ne!(a.id(), opentelemetry::trace::TraceId::INVALID.to_string());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_stage_spans_are_children_of_the_turn() {
        let (backend, exporter) = backend();
        let trace = backend.trace("video_agent", &SessionId("s1".to_string()));

        let mut span = trace.span("stt_node", serde_json::json!({ "model": "deepgram" }));
        span.update_level(Level::Error);
        span.end();
        drop(trace);
        backend.flush().unwrap();

        let root = finished(&exporter, "video_agent");
        let stt = finished(&exporter, "stt_node");
        assert_eq!(stt.span_context.trace_id(), root.span_context.trace_id());
        assert_eq!(stt.parent_span_id, root.span_context.span_id());
        assert_eq!(attribute(&stt, "metadata.model").as_deref(), Some("deepgram"));
        assert!(matches!(stt.status, Status::Error { .. }));
        assert_eq!(attribute(&root, "session.id").as_deref(), Some("s1"));
    }

    #[test]
    fn test_generation_records_completion() {
        let (backend, exporter) = backend();
        let trace = backend.trace("video_agent", &SessionId("s1".to_string()));

        let mut generation =
            trace.generation("llm_generation", "gpt-4.1", serde_json::json!([]));
        generation.set_completion_start(Utc::now());
        generation.end("Looking at it".to_string());
        drop(trace);
        backend.flush().unwrap();

        let span = finished(&exporter, "llm_generation");
        assert_eq!(attribute(&span, "gen_ai.completion").as_deref(), Some("Looking at it"));
        assert_eq!(attribute(&span, "gen_ai.request.model").as_deref(), Some("gpt-4.1"));
        assert!(attribute(&span, "gen_ai.completion_start_time").is_some());
        assert!(matches!(span.status, Status::Unset));
    }

    #[test]
    fn test_root_outlives_a_running_stage() {
        let (backend, exporter) = backend();
        let trace = backend.trace("video_agent", &SessionId("s1".to_string()));
        let span = trace.span("tts_node", serde_json::json!({}));

        drop(trace);
        backend.flush().unwrap();
        assert!(exporter.get_finished_spans().unwrap().is_empty());

        span.end();
        backend.flush().unwrap();
        let names: Vec<_> = exporter
            .get_finished_spans()
            .unwrap()
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, vec!["tts_node".to_string(), "video_agent".to_string()]);
    }
}
