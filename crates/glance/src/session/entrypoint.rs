//! Seams to the hosting runtime and the job entrypoint it calls.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use glanceconf::GlanceConfig;
use tracing::info;

use super::controller::{ControllerSettings, SessionController};
use super::events::SessionEvents;
use crate::agent::VoiceAgent;
use crate::engines::Engines;
use crate::error::HostError;
use crate::frames::FrameBuffer;
use crate::knowledge::KnowledgeBase;
use crate::prompt;
use crate::telemetry;
use crate::trace::{OtelBackend, TraceBackend, TraceManager};
use crate::types::SessionId;

/// The running agent session as seen from the agent.
#[async_trait]
pub trait AgentHost: Send + Sync {
    /// Have the agent speak, steered by `instructions`. Resolves once the
    /// reply has been handed to the output.
    async fn generate_reply(&self, instructions: &str) -> Result<(), HostError>;
}

#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub name: String,
    pub local_identity: String,
    pub remote_participants: Vec<String>,
}

/// Which media the session reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomOptions {
    pub video_input: bool,
    pub audio_input: bool,
    pub audio_output: bool,
    pub transcription_output: bool,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            video_input: true,
            audio_input: true,
            audio_output: true,
            transcription_output: true,
        }
    }
}

/// A started session: the host to speak through and its event feed.
pub struct StartedSession {
    pub host: Arc<dyn AgentHost>,
    pub events: SessionEvents,
}

/// One dispatched job from the hosting runtime.
#[async_trait]
pub trait JobContext: Send {
    async fn connect(&mut self) -> Result<RoomInfo, HostError>;

    async fn start(
        &mut self,
        agent: Arc<VoiceAgent>,
        options: RoomOptions,
    ) -> Result<StartedSession, HostError>;
}

/// Run one agent job to completion.
///
/// Returns early without starting a session when nobody else is in the room.
pub async fn entrypoint(
    ctx: &mut dyn JobContext,
    config: &GlanceConfig,
    engines: Engines,
    backend: Arc<dyn TraceBackend>,
) -> anyhow::Result<()> {
    let room = ctx.connect().await.context("Failed to connect to room")?;

    info!("Connected to room: {}", room.name);
    info!("Local participant: {}", room.local_identity);

    if room.remote_participants.is_empty() {
        info!("No remote participants in room, exiting");
        return Ok(());
    }
    info!("Found {} remote participants", room.remote_participants.len());

    let knowledge = KnowledgeBase::load(&config.agent.knowledge_dir);
    let traces = Arc::new(TraceManager::new(
        backend,
        config.agent.trace_name.clone(),
        SessionId::new(),
    ));
    let agent = Arc::new(VoiceAgent::new(
        traces,
        FrameBuffer::new(),
        engines,
        prompt::instructions(&knowledge),
        config.capture.image_detail,
    ));

    let session = ctx
        .start(agent.clone(), RoomOptions::default())
        .await
        .context("Failed to start agent session")?;

    SessionController::new(agent, session.host, ControllerSettings::from_config(config))
        .run(session.events)
        .await
        .context("Agent session failed")
}

/// Run one job with OTLP export: telemetry is set up from `[telemetry]`,
/// turns are traced through [`OtelBackend`], and every exporter is shut down
/// when the job ends, whether or not it succeeded.
pub async fn run_job(
    ctx: &mut dyn JobContext,
    config: &GlanceConfig,
    engines: Engines,
) -> anyhow::Result<()> {
    let guard = telemetry::init(&config.telemetry).context("Failed to initialize telemetry")?;
    let backend = Arc::new(OtelBackend::new(guard.tracer_provider()));

    let result = entrypoint(ctx, config, engines, backend).await;
    guard.shutdown();
    result
}
