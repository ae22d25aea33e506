//! Media types exchanged with the real-time transport.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use serde::Serialize;

use crate::error::TransportError;

/// One decoded video frame.
///
/// `data` is a shared handle onto the transport's pixel buffer; cloning a
/// frame never copies pixels and nothing in this crate mutates them.
#[derive(Debug, Clone, Serialize)]
pub struct VideoFrame {
    #[serde(skip)]
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl VideoFrame {
    pub fn new(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
        }
    }
}

/// A video frame as delivered by the transport, stamped with its arrival time.
///
/// `timestamp` is measured on the transport's monotonic clock; only
/// differences between timestamps are meaningful.
#[derive(Debug, Clone)]
pub struct VideoFrameEvent {
    pub frame: VideoFrame,
    pub timestamp: Duration,
}

/// A chunk of PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Interleaved signed 16-bit little-endian samples
    pub data: Bytes,
    pub sample_rate: u32,
    pub num_channels: u16,
    pub samples_per_channel: u32,
}

impl AudioFrame {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples_per_channel as f64 / self.sample_rate as f64)
    }
}

/// Where a published track comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    Camera,
    Microphone,
    ScreenShare,
    ScreenShareAudio,
    Unknown,
}

/// Frames read from one subscribed video track.
pub type VideoFrameStream =
    Pin<Box<dyn Stream<Item = Result<VideoFrameEvent, TransportError>> + Send>>;

/// Audio fed into speech recognition.
pub type AudioStream = Pin<Box<dyn Stream<Item = AudioFrame> + Send>>;

/// Text fed into speech synthesis.
pub type TextStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// A remote video track the session has subscribed to.
pub trait VideoTrack: Send {
    /// Transport-assigned track id
    fn sid(&self) -> &str;

    fn source(&self) -> TrackSource;

    /// Open a frame stream on this track. Dropping the stream releases it.
    fn into_stream(self: Box<Self>) -> VideoFrameStream;
}
