//! Alignment of the audio track against the visual clock.
//!
//! The core never resamples audio. It tells the sink where to play from and
//! at what pitch; the sink does the rest.

use serde::{Deserialize, Serialize};
use volplay_core::{FrameRate, RationalTime};

/// Where and how fast the sink should play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioCue {
    /// Position in the audio track.
    pub offset: RationalTime,
    /// Playback-rate multiplier; always non-negative.
    pub pitch: f32,
    /// Set while the clock runs backwards; sinks should stay silent.
    pub reversed: bool,
}

impl AudioCue {
    pub fn offset_seconds(&self) -> f64 {
        self.offset.to_seconds_f64()
    }
}

/// Computes cues from clock state. Frame 0 of the sequence is time 0 of the
/// audio track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSync {
    frame_rate: FrameRate,
    /// Allowed drift before a resync is requested, in seconds.
    tolerance: f64,
}

impl AudioSync {
    pub fn new(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            tolerance: 0.1,
        }
    }

    pub fn with_tolerance(mut self, seconds: f64) -> Self {
        self.tolerance = seconds.abs();
        self
    }

    /// Cue for the given frame and effective rate (speed ratio x time scale).
    pub fn cue(&self, frame: u32, effective_rate: f32) -> AudioCue {
        AudioCue {
            offset: RationalTime::from_frames(frame as i64, self.frame_rate),
            pitch: effective_rate.abs(),
            reversed: effective_rate < 0.0,
        }
    }

    /// Whether a sink reporting `sink_seconds` has drifted from `cue`.
    pub fn needs_resync(&self, cue: &AudioCue, sink_seconds: f64) -> bool {
        (cue.offset_seconds() - sink_seconds).abs() > self.tolerance
    }
}
