//! Per-turn tracing.
//!
//! A [`Trace`] groups everything that happens during one conversation turn.
//! Each pipeline stage opens a [`Span`] (or a [`Generation`] for the language
//! model) on the current trace and ends it when the stage's stream finishes.
//!
//! The backend is injected, never global: production uses [`OtelBackend`],
//! tests use [`RecordingBackend`].

mod manager;
mod otel;
mod recording;

pub use manager::TraceManager;
pub use otel::OtelBackend;
pub use recording::{ObservationKind, ObservationRecord, RecordingBackend, TraceRecord};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::TraceError;
use crate::types::SessionId;

/// Severity attached to a span or generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    #[default]
    Default,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Default => "DEFAULT",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// Creates traces and persists what they collect.
pub trait TraceBackend: Send + Sync {
    fn trace(&self, name: &str, session_id: &SessionId) -> Arc<dyn Trace>;

    /// Push every pending span to the backend's sink.
    fn flush(&self) -> Result<(), TraceError>;
}

/// One conversation turn.
pub trait Trace: Send + Sync {
    /// Backend-unique identity of this trace.
    fn id(&self) -> String;

    fn span(&self, name: &str, metadata: serde_json::Value) -> Box<dyn Span>;

    fn generation(&self, name: &str, model: &str, input: serde_json::Value)
        -> Box<dyn Generation>;
}

/// A bounded annotation around one stage call. `end` consumes it.
pub trait Span: Send {
    fn update_level(&mut self, level: Level);

    fn end(self: Box<Self>);
}

/// A span specialised for language model calls.
pub trait Generation: Send {
    fn update_level(&mut self, level: Level);

    /// When the first chunk of the completion arrived.
    fn set_completion_start(&mut self, at: DateTime<Utc>);

    fn end(self: Box<Self>, output: String);
}
