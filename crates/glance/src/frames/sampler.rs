use std::time::Duration;

use futures::StreamExt;
use opentelemetry::metrics::Counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::FrameBuffer;
use crate::error::TransportError;
use crate::media::{VideoFrameEvent, VideoFrameStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Capturing,
    Closed,
}

/// Counts reported when a capture run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub admitted: u64,
    pub discarded: u64,
}

struct SamplerMetrics {
    admitted: Counter<u64>,
    discarded: Counter<u64>,
}

impl SamplerMetrics {
    fn new() -> Self {
        let meter = opentelemetry::global::meter("glance");
        Self {
            admitted: meter
                .u64_counter("glance.frames.admitted")
                .with_description("Screen-share frames kept for generation context")
                .build(),
            discarded: meter
                .u64_counter("glance.frames.discarded")
                .with_description("Screen-share frames dropped by the sampling throttle")
                .build(),
        }
    }
}

/// Throttles a live frame stream into a [`FrameBuffer`].
///
/// A frame is admitted when at least `interval` has passed since the last
/// admitted frame; the first frame always is. Everything else is dropped.
pub struct FrameSampler {
    buffer: FrameBuffer,
    interval: Duration,
    state: SamplerState,
    last_admitted: Option<Duration>,
    summary: CaptureSummary,
    metrics: SamplerMetrics,
}

impl FrameSampler {
    pub fn new(buffer: FrameBuffer, interval: Duration) -> Self {
        Self {
            buffer,
            interval,
            state: SamplerState::Idle,
            last_admitted: None,
            summary: CaptureSummary::default(),
            metrics: SamplerMetrics::new(),
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn summary(&self) -> CaptureSummary {
        self.summary
    }

    /// Idle → Capturing. No effect in any other state.
    pub fn start(&mut self) {
        if self.state == SamplerState::Idle {
            self.state = SamplerState::Capturing;
        }
    }

    /// → Closed. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.state = SamplerState::Closed;
    }

    /// Apply the throttle to one frame. Returns whether it was buffered.
    pub fn offer(&mut self, event: VideoFrameEvent) -> bool {
        if self.state != SamplerState::Capturing {
            return false;
        }

        let due = match self.last_admitted {
            None => true,
            Some(last) => event.timestamp.saturating_sub(last) >= self.interval,
        };

        if !due {
            self.summary.discarded += 1;
            self.metrics.discarded.add(1, &[]);
            return false;
        }

        self.last_admitted = Some(event.timestamp);
        self.summary.admitted += 1;
        self.metrics.admitted.add(1, &[]);
        debug!(
            frame = self.summary.admitted,
            width = event.frame.width,
            height = event.frame.height,
            "Captured frame #{}: {}x{}",
            self.summary.admitted,
            event.frame.width,
            event.frame.height
        );
        self.buffer.push(event.frame);
        true
    }

    /// Drive the sampler until the stream ends, fails, or `cancel` fires.
    ///
    /// The stream is dropped before this returns, on every path. A stream
    /// error is returned as-is; there is no retry here.
    pub async fn run(
        mut self,
        mut stream: VideoFrameStream,
        cancel: CancellationToken,
    ) -> Result<CaptureSummary, TransportError> {
        self.start();
        info!("Starting video frame capture");

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                next = stream.next() => match next {
                    Some(Ok(event)) => {
                        self.offer(event);
                    }
                    Some(Err(e)) => break Err(e),
                    None => break Ok(()),
                },
            }
        };

        drop(stream);
        self.close();

        match outcome {
            Ok(()) => {
                info!(
                    admitted = self.summary.admitted,
                    discarded = self.summary.discarded,
                    "Video frame capture ended - captured {} frames",
                    self.summary.admitted
                );
                Ok(self.summary)
            }
            Err(e) => {
                warn!(
                    admitted = self.summary.admitted,
                    "Video frame capture failed: {}", e
                );
                Err(e)
            }
        }
    }
}
