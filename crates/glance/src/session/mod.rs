//! Session lifecycle: greeting, screen-share subscription, farewell and
//! shutdown.

mod controller;
mod entrypoint;
mod events;

pub use controller::{ControllerSettings, SessionController};
pub use entrypoint::{
    entrypoint, run_job, AgentHost, JobContext, RoomInfo, RoomOptions, StartedSession,
};
pub use events::{channel, EventSender, SessionClosed, SessionEvent, SessionEvents};
