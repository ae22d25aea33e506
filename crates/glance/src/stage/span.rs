use tracing::{error, info};

use super::{Observe, Stage};
use crate::engines::SpeechEvent;
use crate::error::EngineError;
use crate::media::AudioFrame;
use crate::trace::{Level, Span, Trace};

/// Open span for a recognition or synthesis call.
pub struct SpanObservation {
    stage: Stage,
    span: Option<Box<dyn Span>>,
}

impl SpanObservation {
    pub fn open(trace: &dyn Trace, stage: Stage, model: &str) -> Self {
        let span = trace.span(stage.span_name(), serde_json::json!({ "model": model }));
        Self {
            stage,
            span: Some(span),
        }
    }

    fn mark_failed(&mut self, e: &EngineError) {
        error!(stage = %self.stage, engine = e.engine(), "Stage error: {}", e);
        if let Some(span) = self.span.as_mut() {
            span.update_level(Level::Error);
        }
    }
}

impl Observe<SpeechEvent> for SpanObservation {
    fn observe(&mut self, event: &SpeechEvent) {
        if let SpeechEvent::FinalTranscript(speech) = event {
            let preview: String = speech.text.chars().take(50).collect();
            info!("Speech recognized: {}...", preview);
        }
    }

    fn fail(&mut self, error: &EngineError) {
        self.mark_failed(error);
    }
}

impl Observe<AudioFrame> for SpanObservation {
    fn fail(&mut self, error: &EngineError) {
        self.mark_failed(error);
    }
}

impl Drop for SpanObservation {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            span.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{RecordingBackend, TraceBackend};
    use crate::types::SessionId;

    #[test]
    fn test_span_carries_model_and_ends_on_drop() {
        let backend = RecordingBackend::new();
        let trace = backend.trace("video_agent", &SessionId::new());

        let observation = SpanObservation::open(trace.as_ref(), Stage::Synthesis, "cartesia");
        assert_eq!(backend.named("tts_node")[0].end_calls, 0);
        drop(observation);

        let record = &backend.named("tts_node")[0];
        assert_eq!(record.metadata["model"], "cartesia");
        assert_eq!(record.end_calls, 1);
        assert_eq!(record.level, Level::Default);
    }

    #[test]
    fn test_failure_sets_error_level() {
        let backend = RecordingBackend::new();
        let trace = backend.trace("video_agent", &SessionId::new());

        let mut observation =
            SpanObservation::open(trace.as_ref(), Stage::Recognition, "deepgram");
        Observe::<SpeechEvent>::fail(&mut observation, &EngineError::stream("deepgram", "eof"));
        drop(observation);

        let record = &backend.named("stt_node")[0];
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.end_calls, 1);
    }
}
