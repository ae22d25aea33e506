use std::sync::{Arc, Mutex, MutexGuard};

use crate::media::VideoFrame;

/// Chronological store of admitted frames for one session.
///
/// The sampler is the only writer and the selector the only reader; the
/// reader always drains. The lock is held only for a push or a swap, never
/// across an await.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    frames: Arc<Mutex<Vec<VideoFrame>>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, frame: VideoFrame) {
        self.lock().push(frame);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every buffered frame, oldest first.
    pub fn take(&self) -> Vec<VideoFrame> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<VideoFrame>> {
        // A panicking writer cannot leave a Vec half-pushed
        self.frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_in_insertion_order() {
        let buffer = FrameBuffer::new();
        for width in 1..=3 {
            buffer.push(VideoFrame::new(vec![0u8; 4], width, 1));
        }

        let widths: Vec<u32> = buffer.take().iter().map(|f| f.width).collect();
        assert_eq!(widths, vec![1, 2, 3]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let buffer = FrameBuffer::new();
        let writer = buffer.clone();
        writer.push(VideoFrame::new(vec![0u8; 4], 2, 2));
        assert_eq!(buffer.len(), 1);
    }
}
