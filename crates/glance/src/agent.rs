//! The voice agent: three traced stages sharing one frame buffer and one
//! trace manager.

use std::sync::Arc;

use glanceconf::ImageDetail;

use crate::context::{ChatChunk, ChatContext};
use crate::engines::{Engines, EventStream, SpeechEvent};
use crate::frames::FrameBuffer;
use crate::media::{AudioFrame, AudioStream, TextStream};
use crate::stage::{self, GenerationObservation, SpanObservation, Stage};
use crate::trace::TraceManager;

pub struct VoiceAgent {
    traces: Arc<TraceManager>,
    frames: FrameBuffer,
    engines: Engines,
    instructions: String,
    image_detail: ImageDetail,
}

impl VoiceAgent {
    pub fn new(
        traces: Arc<TraceManager>,
        frames: FrameBuffer,
        engines: Engines,
        instructions: impl Into<String>,
        image_detail: ImageDetail,
    ) -> Self {
        Self {
            traces,
            frames,
            engines,
            instructions: instructions.into(),
            image_detail,
        }
    }

    /// System instructions the host seeds the conversation with.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn traces(&self) -> &Arc<TraceManager> {
        &self.traces
    }

    /// Buffer the screen-share sampler writes into.
    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    /// Speech recognition, traced as `stt_node`.
    pub fn recognize(&self, audio: AudioStream) -> EventStream<SpeechEvent> {
        let trace = self.traces.current();
        let observation =
            SpanObservation::open(trace.as_ref(), Stage::Recognition, self.engines.stt.model());
        stage::instrument(self.engines.stt.recognize(audio), observation)
    }

    /// Language generation over `context` plus whatever the screen showed
    /// since the last call, traced as `llm_generation`.
    pub fn generate(&self, context: &ChatContext) -> EventStream<ChatChunk> {
        let augmented = stage::augment_context(context, &self.frames, self.image_detail);
        let trace = self.traces.current();
        let observation =
            GenerationObservation::open(trace.as_ref(), self.engines.llm.model(), &augmented);
        stage::instrument(self.engines.llm.chat(augmented), observation)
    }

    /// Speech synthesis, traced as `tts_node`.
    pub fn synthesize(&self, text: TextStream) -> EventStream<AudioFrame> {
        let trace = self.traces.current();
        let observation =
            SpanObservation::open(trace.as_ref(), Stage::Synthesis, self.engines.tts.model());
        stage::instrument(self.engines.tts.synthesize(text), observation)
    }

    /// Start a new trace for the next turn.
    pub fn on_user_turn_completed(&self) {
        self.traces.reset();
    }
}
