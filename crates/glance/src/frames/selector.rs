use serde::Serialize;
use tracing::info;

use super::FrameBuffer;
use crate::media::VideoFrame;

/// Where in the buffered sequence a selected frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePosition {
    First,
    Middle,
    MostRecent,
}

impl FramePosition {
    pub fn label(&self) -> &'static str {
        match self {
            FramePosition::First => "first",
            FramePosition::Middle => "middle",
            FramePosition::MostRecent => "most recent",
        }
    }

    /// Label with every word capitalized, e.g. "Most Recent".
    pub fn title(&self) -> &'static str {
        match self {
            FramePosition::First => "First",
            FramePosition::Middle => "Middle",
            FramePosition::MostRecent => "Most Recent",
        }
    }
}

impl std::fmt::Display for FramePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct SelectedFrame {
    pub position: FramePosition,
    pub frame: VideoFrame,
}

/// Pick the frames for one generation call, oldest first.
///
/// * one or more frames: the most recent
/// * three or more: also the first
/// * five or more: also the one at `n / 2`
pub fn select(frames: &[VideoFrame]) -> Vec<SelectedFrame> {
    let n = frames.len();
    let mut picked = Vec::with_capacity(3);

    if n >= 3 {
        picked.push(SelectedFrame {
            position: FramePosition::First,
            frame: frames[0].clone(),
        });
    }
    if n >= 5 {
        picked.push(SelectedFrame {
            position: FramePosition::Middle,
            frame: frames[n / 2].clone(),
        });
    }
    if let Some(last) = frames.last() {
        picked.push(SelectedFrame {
            position: FramePosition::MostRecent,
            frame: last.clone(),
        });
    }

    picked
}

/// Drain `buffer` and return the selection made from what it held.
///
/// The buffer is empty afterwards even when nothing was selected.
pub fn select_and_drain(buffer: &FrameBuffer) -> Vec<SelectedFrame> {
    let frames = buffer.take();
    let selection = select(&frames);
    info!(
        selected = selection.len(),
        available = frames.len(),
        "Adding {} frames to conversation (from {} available)",
        selection.len(),
        frames.len()
    );
    selection
}
