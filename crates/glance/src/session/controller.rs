use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::entrypoint::AgentHost;
use super::events::{SessionEvent, SessionEvents};
use crate::agent::VoiceAgent;
use crate::error::HostError;
use crate::frames::CaptureTask;
use crate::media::{TrackSource, VideoTrack};
use crate::types::UserState;

/// Controller settings taken from `[agent]` and `[capture]`.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub intro_instructions: String,
    pub farewell_instructions: String,
    pub sample_interval: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &glanceconf::GlanceConfig) -> Self {
        Self {
            intro_instructions: config.agent.intro_instructions.clone(),
            farewell_instructions: config.agent.farewell_instructions.clone(),
            sample_interval: config.capture.sample_interval(),
        }
    }
}

/// Binds one agent to the lifecycle of its session.
///
/// Owns the screen-share capture task; there is never more than one.
pub struct SessionController {
    agent: Arc<VoiceAgent>,
    host: Arc<dyn AgentHost>,
    settings: ControllerSettings,
    capture: Option<CaptureTask>,
    closed: bool,
}

impl SessionController {
    pub fn new(agent: Arc<VoiceAgent>, host: Arc<dyn AgentHost>, settings: ControllerSettings) -> Self {
        Self {
            agent,
            host,
            settings,
            capture: None,
            closed: false,
        }
    }

    /// Id of the track currently being captured, if any.
    pub fn capturing(&self) -> Option<&str> {
        self.capture.as_ref().map(|c| c.track_sid())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Greet the user.
    pub async fn enter(&mut self) -> Result<(), HostError> {
        info!(session_id = %self.agent.traces().session_id(), "Agent entered session");
        self.host
            .generate_reply(&self.settings.intro_instructions)
            .await
    }

    /// React to one session event.
    pub async fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::UserStateChanged { old, new } => self.on_user_state_changed(old, new),
            SessionEvent::TrackSubscribed(track) => self.on_track_subscribed(track).await,
            SessionEvent::UserTurnCompleted => self.agent.on_user_turn_completed(),
            SessionEvent::Disconnected => {}
        }
    }

    pub fn on_user_state_changed(&self, old: UserState, new: UserState) {
        info!("User state changed: {} -> {}", old, new);
    }

    /// Start capturing a screen-share track, replacing any earlier capture.
    /// Other tracks, and any track arriving after `close`, are ignored.
    pub async fn on_track_subscribed(&mut self, track: Box<dyn VideoTrack>) {
        if self.closed || track.source() != TrackSource::ScreenShare {
            return;
        }
        info!(track = track.sid(), "Screen share track subscribed");

        self.close_capture().await;
        self.capture = Some(CaptureTask::spawn(
            track,
            self.agent.frames().clone(),
            self.settings.sample_interval,
        ));
    }

    /// Say goodbye, then shut down.
    ///
    /// Shutdown happens even if the farewell fails; the farewell's error is
    /// returned afterwards.
    pub async fn exit(&mut self) -> Result<(), HostError> {
        let farewell = self
            .host
            .generate_reply(&self.settings.farewell_instructions)
            .await;
        self.close().await;
        farewell
    }

    /// Stop capturing and flush traces. Safe to call any number of times.
    pub async fn close(&mut self) {
        self.close_capture().await;
        if self.closed {
            return;
        }
        self.closed = true;

        self.agent.traces().clear();
        if let Err(e) = self.agent.traces().flush() {
            warn!("Trace flush failed: {}", e);
        }
    }

    /// Greet, handle events until the session disconnects, then exit.
    pub async fn run(mut self, mut events: SessionEvents) -> Result<(), HostError> {
        self.enter().await?;

        while let Some(event) = events.recv().await {
            if matches!(event, SessionEvent::Disconnected) {
                break;
            }
            self.handle(event).await;
        }

        self.exit().await
    }

    async fn close_capture(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        let track = capture.track_sid().to_string();
        match capture.close().await {
            Ok(summary) => info!(
                track = %track,
                admitted = summary.admitted,
                discarded = summary.discarded,
                "Closed screen share capture"
            ),
            Err(e) => warn!(track = %track, "Screen share capture ended with error: {}", e),
        }
    }
}
