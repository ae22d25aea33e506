//! glance - screen-share visual context for a real-time voice assistant.
//!
//! While the user shares their screen, [`frames`] keeps roughly one frame per
//! second. Every language model call drains those frames and attaches up to
//! three of them (first, middle, most recent) to the conversation. The
//! recognition, generation and synthesis calls are each wrapped by [`stage`]
//! so every user turn produces one trace with a span per call.

pub mod agent;
pub mod context;
pub mod engines;
pub mod error;
pub mod frames;
pub mod knowledge;
pub mod media;
pub mod prompt;
pub mod session;
pub mod stage;
pub mod telemetry;
pub mod trace;
pub mod types;

pub use agent::VoiceAgent;
pub use context::{ChatChunk, ChatContent, ChatContext, ChatMessage, Role};
pub use engines::{Engines, EventStream, LanguageModel, SpeechEvent, SpeechToText, TextToSpeech};
pub use error::{EngineError, HostError, TraceError, TransportError};
pub use frames::{FrameBuffer, FramePosition};
pub use session::{entrypoint, SessionController, SessionEvent};
pub use trace::{OtelBackend, RecordingBackend, TraceBackend, TraceManager};
pub use types::{SessionId, UserState};
