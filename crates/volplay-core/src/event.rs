//! In-stream sequence events.

use serde::{Deserialize, Serialize};

/// Raw discriminator the decoder uses for the first-frame boundary event.
pub const FIRST_FRAME_EVENT: i32 = 254;
/// Raw discriminator the decoder uses for the last-frame boundary event.
pub const LAST_FRAME_EVENT: i32 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    SequenceStart,
    SequenceEnd,
    User(String),
}

impl EventKind {
    /// Classify a decoder record by its type discriminator.
    pub fn from_raw(kind: i32, name: &str) -> Self {
        match kind {
            FIRST_FRAME_EVENT => Self::SequenceStart,
            LAST_FRAME_EVENT => Self::SequenceEnd,
            _ => Self::User(name.to_string()),
        }
    }

    /// Payload name; only user events carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::User(name) => Some(name),
            _ => None,
        }
    }
}

/// Event record exactly as the decoder reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub frame: u32,
    pub kind: i32,
    pub name: String,
}

/// A classified event crossed by the decode cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceEvent {
    pub frame: u32,
    pub kind: EventKind,
}

impl From<RawEvent> for SequenceEvent {
    fn from(raw: RawEvent) -> Self {
        Self {
            frame: raw.frame,
            kind: EventKind::from_raw(raw.kind, &raw.name),
        }
    }
}

/// One entry of the full-sequence event list used for editor listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub frame: u32,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(frame: u32, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(EventKind::from_raw(254, "ignored"), EventKind::SequenceStart);
        assert_eq!(EventKind::from_raw(255, ""), EventKind::SequenceEnd);
    }

    #[test]
    fn test_classify_user_event() {
        let raw = RawEvent {
            frame: 42,
            kind: 3,
            name: "explosion".to_string(),
        };
        let event = SequenceEvent::from(raw);
        assert_eq!(event.frame, 42);
        assert_eq!(event.kind.name(), Some("explosion"));
    }
}
