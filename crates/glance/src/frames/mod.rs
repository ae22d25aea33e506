//! Screen-share frame capture and selection.
//!
//! ```text
//! VideoTrack ──► FrameSampler ──push──► FrameBuffer ──take──► selector
//!                (1 frame / interval)                        (≤ 3 frames, oldest first)
//! ```
//!
//! The sampler runs as its own task ([`CaptureTask`]); the selector runs
//! inside the generation stage at the start of every model call and always
//! leaves the buffer empty.

mod buffer;
mod capture;
mod sampler;
mod selector;

pub use buffer::FrameBuffer;
pub use capture::CaptureTask;
pub use sampler::{CaptureSummary, FrameSampler, SamplerState};
pub use selector::{select, select_and_drain, FramePosition, SelectedFrame};
