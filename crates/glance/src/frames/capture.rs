use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info_span;
use tracing::Instrument;

use super::{CaptureSummary, FrameBuffer, FrameSampler};
use crate::error::TransportError;
use crate::media::VideoTrack;

/// A running [`FrameSampler`] bound to one subscribed track.
///
/// The frame stream is owned by the spawned task; closing the task (or the
/// track ending on its own) drops the stream exactly once.
pub struct CaptureTask {
    track_sid: String,
    cancel: CancellationToken,
    handle: JoinHandle<Result<CaptureSummary, TransportError>>,
}

impl CaptureTask {
    pub fn spawn(track: Box<dyn VideoTrack>, buffer: FrameBuffer, interval: Duration) -> Self {
        let track_sid = track.sid().to_string();
        let cancel = CancellationToken::new();
        let stream = track.into_stream();
        let sampler = FrameSampler::new(buffer, interval);

        let span = info_span!("frame_capture", track = %track_sid);
        let handle = tokio::spawn(sampler.run(stream, cancel.clone()).instrument(span));

        Self {
            track_sid,
            cancel,
            handle,
        }
    }

    pub fn track_sid(&self) -> &str {
        &self.track_sid
    }

    /// Whether the sampler has already stopped (stream ended or failed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop capturing and wait for the stream to be released.
    pub async fn close(self) -> Result<CaptureSummary, TransportError> {
        self.cancel.cancel();
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(TransportError::Stream {
                track: self.track_sid,
                message: format!("capture task aborted: {}", join_err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{TrackSource, VideoFrame, VideoFrameEvent, VideoFrameStream};
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Released(Arc<AtomicUsize>);

    impl Drop for Released {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct EndlessTrack {
        released: Arc<AtomicUsize>,
    }

    impl VideoTrack for EndlessTrack {
        fn sid(&self) -> &str {
            "TR_endless"
        }

        fn source(&self) -> TrackSource {
            TrackSource::ScreenShare
        }

        fn into_stream(self: Box<Self>) -> VideoFrameStream {
            let guard = Released(self.released.clone());
            let ticks = ticks();
            Box::pin(ticks.map(move |i| {
                let _held = &guard;
                Ok::<_, TransportError>(VideoFrameEvent {
                    frame: VideoFrame::new(vec![0u8; 4], 2, 2),
                    timestamp: Duration::from_secs(i),
                })
            }))
        }
    }

    fn ticks() -> impl futures::Stream<Item = u64> + Send {
        futures::stream::unfold(0u64, |i| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Some((i, i + 1))
        })
    }

    #[tokio::test]
    async fn test_close_releases_stream_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let buffer = FrameBuffer::new();
        let task = CaptureTask::spawn(
            Box::new(EndlessTrack {
                released: released.clone(),
            }),
            buffer.clone(),
            Duration::from_secs(1),
        );
        assert_eq!(task.track_sid(), "TR_endless");

        tokio::time::sleep(Duration::from_millis(30)).await;
        let summary = task.close().await.unwrap();

        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(summary.admitted as usize, buffer.len());
    }
}
