use chrono::Utc;
use glanceconf::ImageDetail;
use tracing::{error, info, warn};

use super::{Observe, Stage};
use crate::context::{ChatChunk, ChatContent, ChatContext, ChatMessage, ImageContent, Role};
use crate::error::EngineError;
use crate::frames::{self, FrameBuffer};
use crate::trace::{Generation, Level, Trace};

/// Told to the model when no screen frames were captured for the turn.
pub const NO_SCREEN_SHARE_NOTICE: &str = "The user is not currently sharing their screen. \
Let them know they need to share their screen for you to provide visual assistance.";

/// Copy `context` and append the frames selected from `buffer`.
///
/// Drains the buffer. `context` itself is left untouched.
pub fn augment_context(
    context: &ChatContext,
    buffer: &FrameBuffer,
    detail: ImageDetail,
) -> ChatContext {
    let mut augmented = context.clone();
    let selection = frames::select_and_drain(buffer);

    if selection.is_empty() {
        augmented.add_message(ChatMessage::text(Role::System, NO_SCREEN_SHARE_NOTICE));
        warn!("No captured frames available for this conversation");
        return augmented;
    }

    for selected in selection {
        augmented.add_message(ChatMessage::new(
            Role::User,
            vec![
                ChatContent::Text(format!(
                    "{} view of user during speech:",
                    selected.position.title()
                )),
                ChatContent::Image(ImageContent {
                    frame: selected.frame,
                    detail,
                }),
            ],
        ));
        info!("Added {} frame to chat context", selected.position);
    }
    augmented
}

/// Open generation for a language model call.
///
/// Records when the first chunk arrived and collects the streamed text as
/// the generation's output.
pub struct GenerationObservation {
    generation: Option<Box<dyn Generation>>,
    output: String,
    started: bool,
}

impl GenerationObservation {
    pub fn open(trace: &dyn Trace, model: &str, context: &ChatContext) -> Self {
        let generation =
            trace.generation(Stage::Generation.span_name(), model, context.to_trace_input());
        Self {
            generation: Some(generation),
            output: String::new(),
            started: false,
        }
    }
}

impl Observe<ChatChunk> for GenerationObservation {
    fn observe(&mut self, chunk: &ChatChunk) {
        if !self.started {
            self.started = true;
            if let Some(generation) = self.generation.as_mut() {
                generation.set_completion_start(Utc::now());
            }
        }
        if let Some(content) = chunk.content() {
            self.output.push_str(content);
        }
    }

    fn fail(&mut self, e: &EngineError) {
        error!(stage = %Stage::Generation, engine = e.engine(), "LLM error: {}", e);
        if let Some(generation) = self.generation.as_mut() {
            generation.update_level(Level::Error);
        }
    }
}

impl Drop for GenerationObservation {
    fn drop(&mut self) {
        if let Some(generation) = self.generation.take() {
            generation.end(std::mem::take(&mut self.output));
        }
    }
}
