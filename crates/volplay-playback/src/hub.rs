//! Notification fan-out to subscribers.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use volplay_core::{EventKind, SequenceEvent};

/// Notifications raised by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A model was published and is now presentable.
    NewModel { model_id: u64, frame: u32 },
    FirstFrame { frame: u32 },
    LastFrame { frame: u32 },
    User { frame: u32, name: String },
    /// Initialization could not open the sequence.
    ModelNotFound { location: String },
}

impl From<SequenceEvent> for PlaybackEvent {
    fn from(event: SequenceEvent) -> Self {
        match event.kind {
            EventKind::SequenceStart => Self::FirstFrame { frame: event.frame },
            EventKind::SequenceEnd => Self::LastFrame { frame: event.frame },
            EventKind::User(name) => Self::User {
                frame: event.frame,
                name,
            },
        }
    }
}

/// Broadcasts every event to every live subscriber.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Send to all subscribers; dropped receivers are forgotten.
    pub fn emit(&mut self, event: PlaybackEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
