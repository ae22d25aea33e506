//! Fakes shared by the integration tests: scripted engines, a recording
//! host, and video tracks that count how often their stream is released.

#![allow(dead_code)]

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use glance::context::{ChatChunk, ChatContext};
use glance::engines::{
    Engines, EventStream, LanguageModel, SpeechData, SpeechEvent, SpeechToText, TextToSpeech,
};
use glance::error::{EngineError, HostError, TransportError};
use glance::frames::FrameBuffer;
use glance::media::{
    AudioFrame, AudioStream, TextStream, TrackSource, VideoFrame, VideoFrameEvent,
    VideoFrameStream, VideoTrack,
};
use glance::session::AgentHost;
use glance::trace::{RecordingBackend, TraceManager};
use glance::types::SessionId;
use glance::VoiceAgent;
use glanceconf::ImageDetail;

pub struct FakeStt {
    pub events: Vec<Result<SpeechEvent, EngineError>>,
}

impl SpeechToText for FakeStt {
    fn model(&self) -> &str {
        "deepgram"
    }

    fn recognize(&self, _audio: AudioStream) -> EventStream<SpeechEvent> {
        Box::pin(stream::iter(self.events.clone()))
    }
}

/// Language model that replays `chunks` and remembers every context it saw.
pub struct FakeLlm {
    pub chunks: Vec<Result<ChatChunk, EngineError>>,
    pub seen: Arc<Mutex<Vec<ChatContext>>>,
}

impl LanguageModel for FakeLlm {
    fn model(&self) -> &str {
        "gpt-4.1"
    }

    fn chat(&self, context: ChatContext) -> EventStream<ChatChunk> {
        self.seen.lock().unwrap().push(context);
        Box::pin(stream::iter(self.chunks.clone()))
    }
}

pub struct FakeTts {
    pub frames: Vec<Result<AudioFrame, EngineError>>,
}

impl TextToSpeech for FakeTts {
    fn model(&self) -> &str {
        "cartesia"
    }

    fn synthesize(&self, _text: TextStream) -> EventStream<AudioFrame> {
        Box::pin(stream::iter(self.frames.clone()))
    }
}

pub fn transcript(text: &str) -> SpeechEvent {
    SpeechEvent::FinalTranscript(SpeechData::new(text))
}

pub fn audio(samples: u32) -> AudioFrame {
    AudioFrame {
        data: bytes::Bytes::from(vec![0u8; samples as usize * 2]),
        sample_rate: 24_000,
        num_channels: 1,
        samples_per_channel: samples,
    }
}

pub fn no_audio() -> AudioStream {
    Box::pin(stream::empty())
}

pub fn no_text() -> TextStream {
    Box::pin(stream::empty())
}

/// A scripted agent plus handles onto everything it records.
pub struct Harness {
    pub agent: Arc<VoiceAgent>,
    pub backend: RecordingBackend,
    pub llm_seen: Arc<Mutex<Vec<ChatContext>>>,
}

pub struct Script {
    pub stt: Vec<Result<SpeechEvent, EngineError>>,
    pub llm: Vec<Result<ChatChunk, EngineError>>,
    pub tts: Vec<Result<AudioFrame, EngineError>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            stt: vec![
                Ok(SpeechEvent::StartOfSpeech),
                Ok(transcript("hello")),
                Ok(SpeechEvent::EndOfSpeech),
            ],
            llm: vec![
                Ok(ChatChunk::text("c1", "Hi")),
                Ok(ChatChunk::text("c1", " there")),
            ],
            tts: vec![Ok(audio(240)), Ok(audio(480))],
        }
    }
}

/// Scripted engines, plus the list of contexts the language model receives.
pub fn engines(script: Script) -> (Engines, Arc<Mutex<Vec<ChatContext>>>) {
    let llm_seen = Arc::new(Mutex::new(Vec::new()));
    let engines = Engines {
        stt: Arc::new(FakeStt { events: script.stt }),
        llm: Arc::new(FakeLlm {
            chunks: script.llm,
            seen: llm_seen.clone(),
        }),
        tts: Arc::new(FakeTts { frames: script.tts }),
    };
    (engines, llm_seen)
}

pub fn harness(script: Script) -> Harness {
    let backend = RecordingBackend::new();
    let (engines, llm_seen) = engines(script);
    let traces = Arc::new(TraceManager::new(
        Arc::new(backend.clone()),
        "video_agent",
        SessionId("test-session".to_string()),
    ));
    let agent = Arc::new(VoiceAgent::new(
        traces,
        FrameBuffer::new(),
        engines,
        "be helpful",
        ImageDetail::High,
    ));
    Harness {
        agent,
        backend,
        llm_seen,
    }
}

/// Host that records every reply it is asked for.
#[derive(Default)]
pub struct FakeHost {
    pub replies: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentHost for FakeHost {
    async fn generate_reply(&self, instructions: &str) -> Result<(), HostError> {
        self.replies.lock().unwrap().push(instructions.to_string());
        Ok(())
    }
}

/// Counts stream opens and releases for one fake track.
#[derive(Default, Clone)]
pub struct StreamCounter {
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl StreamCounter {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

struct Tracked {
    inner: VideoFrameStream,
    released: Arc<AtomicUsize>,
}

impl Stream for Tracked {
    type Item = Result<VideoFrameEvent, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Track that delivers `frames` frames one second apart, then stays open.
pub struct FakeTrack {
    pub sid: String,
    pub source: TrackSource,
    pub frames: u32,
    pub counter: StreamCounter,
}

impl FakeTrack {
    pub fn screen(sid: &str, frames: u32) -> (Box<dyn VideoTrack>, StreamCounter) {
        Self::boxed(sid, TrackSource::ScreenShare, frames)
    }

    pub fn boxed(sid: &str, source: TrackSource, frames: u32) -> (Box<dyn VideoTrack>, StreamCounter) {
        let counter = StreamCounter::default();
        let track = FakeTrack {
            sid: sid.to_string(),
            source,
            frames,
            counter: counter.clone(),
        };
        (Box::new(track), counter)
    }
}

impl VideoTrack for FakeTrack {
    fn sid(&self) -> &str {
        &self.sid
    }

    fn source(&self) -> TrackSource {
        self.source
    }

    fn into_stream(self: Box<Self>) -> VideoFrameStream {
        self.counter.opened.fetch_add(1, Ordering::SeqCst);
        let events: Vec<Result<VideoFrameEvent, TransportError>> = (0..self.frames)
            .map(|i| {
                Ok(VideoFrameEvent {
                    frame: VideoFrame::new(vec![0u8; 16], 1280 + i, 720),
                    timestamp: Duration::from_secs(i as u64),
                })
            })
            .collect();
        Box::pin(Tracked {
            inner: Box::pin(stream::iter(events).chain(stream::pending())),
            released: self.counter.released.clone(),
        })
    }
}

/// Poll `condition` until it holds or a second has passed.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
