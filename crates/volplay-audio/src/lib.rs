//! Volplay Audio - embedded audio adapter
//!
//! Architecture:
//! - `AudioTrack`: the full sample buffer, read once at load
//! - `AudioSync`: offset/pitch cues derived from the playback clock
//! - `AudioSink`: output seam; `FeedSink` serves a pulling audio callback

pub mod sink;
pub mod sync;
pub mod track;

pub use sink::{AudioSink, FeedReader, FeedSink};
pub use sync::{AudioCue, AudioSync};
pub use track::AudioTrack;
