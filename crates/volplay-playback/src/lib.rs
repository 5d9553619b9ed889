//! Volplay Playback - drives an open sequence tick by tick.
//!
//! Provides:
//! - Multi-buffered geometry and texture slots
//! - The playback clock with loop, reverse, stop and hide policies
//! - Per-tick model fetch and event dispatch
//! - The [`Player`] façade and its versioned configuration

pub mod buffer_pool;
pub mod clock;
pub mod config;
pub mod events;
pub mod hub;
pub mod pipeline;
pub mod player;
pub mod stats;
pub mod timing;

pub use buffer_pool::{BufferPool, SlotRing, WriteSlots};
pub use clock::{ClockTick, Direction, PlaybackClock, PlaybackState};
pub use config::{PlayerConfig, PlayerConfigFile, CURRENT_VERSION};
pub use events::{pull_events, EventBatch, EventCatalog};
pub use hub::{EventHub, PlaybackEvent};
pub use pipeline::{FramePipeline, FrameUpdate};
pub use player::{Player, TickReport};
pub use stats::{ManualTime, MonotonicTime, PlaybackStats, StatsCollector, TimeSource};
pub use timing::ClipTiming;
