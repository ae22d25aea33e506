use tokio::sync::mpsc;

use crate::media::VideoTrack;
use crate::types::UserState;

/// Something the host reports about the running session.
pub enum SessionEvent {
    UserStateChanged { old: UserState, new: UserState },
    TrackSubscribed(Box<dyn VideoTrack>),
    UserTurnCompleted,
    Disconnected,
}

impl std::fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::UserStateChanged { old, new } => f
                .debug_struct("UserStateChanged")
                .field("old", old)
                .field("new", new)
                .finish(),
            SessionEvent::TrackSubscribed(track) => f
                .debug_tuple("TrackSubscribed")
                .field(&track.sid())
                .finish(),
            SessionEvent::UserTurnCompleted => f.write_str("UserTurnCompleted"),
            SessionEvent::Disconnected => f.write_str("Disconnected"),
        }
    }
}

/// The session ended before the event could be delivered.
#[derive(Debug, thiserror::Error)]
#[error("session event channel closed")]
pub struct SessionClosed;

/// Host side of the event channel.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<SessionEvent>,
}

impl EventSender {
    pub async fn send(&self, event: SessionEvent) -> Result<(), SessionClosed> {
        self.tx.send(event).await.map_err(|_| SessionClosed)
    }
}

/// Controller side of the event channel.
pub struct SessionEvents {
    rx: mpsc::Receiver<SessionEvent>,
}

impl SessionEvents {
    /// `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }
}

pub fn channel(capacity: usize) -> (EventSender, SessionEvents) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { tx }, SessionEvents { rx })
}
