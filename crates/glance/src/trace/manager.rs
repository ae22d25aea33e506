use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use super::{Trace, TraceBackend};
use crate::error::TraceError;
use crate::types::SessionId;

/// Holds the one trace that is current for a session.
///
/// Every stage call between two [`reset`](Self::reset)s attaches to the same
/// trace, so a trace covers exactly one user turn.
pub struct TraceManager {
    backend: Arc<dyn TraceBackend>,
    name: String,
    session_id: SessionId,
    current: Mutex<Option<Arc<dyn Trace>>>,
}

impl TraceManager {
    pub fn new(backend: Arc<dyn TraceBackend>, name: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            backend,
            name: name.into(),
            session_id,
            current: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The current trace, created on first use.
    pub fn current(&self) -> Arc<dyn Trace> {
        let mut slot = self.lock();
        if let Some(trace) = slot.as_ref() {
            return trace.clone();
        }
        let trace = self.backend.trace(&self.name, &self.session_id);
        debug!(trace_id = %trace.id(), session_id = %self.session_id, "Started trace");
        *slot = Some(trace.clone());
        trace
    }

    /// Drop the current trace and start a fresh one. Called when a user turn completes.
    pub fn reset(&self) -> Arc<dyn Trace> {
        let trace = self.backend.trace(&self.name, &self.session_id);
        let previous = self.lock().replace(trace.clone());
        info!(
            trace_id = %trace.id(),
            previous = previous.as_ref().map(|t| t.id()).unwrap_or_default(),
            "User turn completed {}",
            trace.id()
        );
        trace
    }

    /// Forget the current trace without starting another.
    pub fn clear(&self) {
        self.lock().take();
    }

    pub fn flush(&self) -> Result<(), TraceError> {
        self.backend.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn Trace>>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
