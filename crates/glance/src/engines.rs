//! Streaming engines the pipeline stages wrap.
//!
//! Each engine takes its input and answers with an ordered stream of events.
//! A failure mid-stream is delivered as an `Err` item; the stream may end
//! right after it.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;

use crate::context::{ChatChunk, ChatContext};
use crate::error::EngineError;
use crate::media::{AudioFrame, AudioStream, TextStream};

/// Ordered output of an engine call.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T, EngineError>> + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechData {
    pub text: String,
    pub language: Option<String>,
    pub confidence: f32,
}

impl SpeechData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            confidence: 1.0,
        }
    }
}

/// What speech recognition reports while listening.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    StartOfSpeech,
    InterimTranscript(SpeechData),
    FinalTranscript(SpeechData),
    EndOfSpeech,
}

pub trait SpeechToText: Send + Sync {
    /// Identifier recorded on the stage's span, e.g. "deepgram/nova-3".
    fn model(&self) -> &str;

    fn recognize(&self, audio: AudioStream) -> EventStream<SpeechEvent>;
}

pub trait LanguageModel: Send + Sync {
    fn model(&self) -> &str;

    fn chat(&self, context: ChatContext) -> EventStream<ChatChunk>;
}

pub trait TextToSpeech: Send + Sync {
    fn model(&self) -> &str;

    fn synthesize(&self, text: TextStream) -> EventStream<AudioFrame>;
}

/// The three engines one agent talks through.
#[derive(Clone)]
pub struct Engines {
    pub stt: Arc<dyn SpeechToText>,
    pub llm: Arc<dyn LanguageModel>,
    pub tts: Arc<dyn TextToSpeech>,
}
