//! Volplay Tracking - rigid/skeletal tracking channels carried by a sequence.
//!
//! Channels are read once at load and never touched by playback afterwards.

pub mod channel;
pub mod set;

pub use channel::{RotationRepresentation, TrackingChannel, TrackingKeyframe};
pub use set::TrackingSet;
