//! Traced pass-through around the recognition, generation and synthesis
//! engines.
//!
//! [`instrument`] relays every item of an engine stream unchanged and in
//! order, showing each one to an [`Observe`] guard on the way. The guard owns
//! the open span; dropping it ends the span, so the span ends exactly once
//! whether the engine finishes, fails, or the consumer stops listening.

mod generation;
mod span;

pub use generation::{augment_context, GenerationObservation, NO_SCREEN_SHARE_NOTICE};
pub use span::SpanObservation;

use futures::StreamExt;

use crate::engines::EventStream;
use crate::error::EngineError;

/// One of the three traced pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Recognition,
    Generation,
    Synthesis,
}

impl Stage {
    /// Name of the span or generation opened for a call.
    pub fn span_name(&self) -> &'static str {
        match self {
            Stage::Recognition => "stt_node",
            Stage::Generation => "llm_generation",
            Stage::Synthesis => "tts_node",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.span_name())
    }
}

/// Watches the items of one stage call. Ends its span on drop.
pub trait Observe<T>: Send {
    fn observe(&mut self, _item: &T) {}

    fn fail(&mut self, error: &EngineError);
}

/// Relay `inner` through `observation`.
pub fn instrument<T, O>(inner: EventStream<T>, observation: O) -> EventStream<T>
where
    T: Send + 'static,
    O: Observe<T> + 'static,
{
    Box::pin(async_stream::stream! {
        let mut observation = observation;
        let mut inner = inner;
        while let Some(item) = inner.next().await {
            match &item {
                Ok(event) => observation.observe(event),
                Err(e) => observation.fail(e),
            }
            yield item;
        }
    })
}
