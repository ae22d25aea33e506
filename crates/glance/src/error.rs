//! Error types shared across the agent.
//!
//! Stage failures travel inside the event streams as `Err(EngineError)` and
//! are relayed to the caller as the very same value, so the type is `Clone`.

use thiserror::Error;

/// Failure raised by a recognition, generation, or synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{engine}: connection failed: {message}")]
    Connection { engine: String, message: String },

    #[error("{engine}: stream failed: {message}")]
    Stream { engine: String, message: String },

    #[error("{engine}: rejected input: {message}")]
    InvalidInput { engine: String, message: String },
}

impl EngineError {
    pub fn stream(engine: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Stream {
            engine: engine.into(),
            message: message.into(),
        }
    }

    pub fn connection(engine: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Connection {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Identifier of the engine that failed.
    pub fn engine(&self) -> &str {
        match self {
            EngineError::Connection { engine, .. }
            | EngineError::Stream { engine, .. }
            | EngineError::InvalidInput { engine, .. } => engine,
        }
    }
}

/// Failure of the media transport's video stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("video stream {track} failed: {message}")]
    Stream { track: String, message: String },

    #[error("video stream {track} was closed by the remote participant")]
    Unpublished { track: String },
}

/// Failure reported by the hosting runtime.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to connect to room: {0}")]
    Connect(String),

    #[error("failed to start agent session: {0}")]
    Start(String),

    #[error("reply generation failed: {0}")]
    Reply(String),
}

/// Failure of the tracing backend.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to flush traces: {0}")]
    Flush(String),
}
