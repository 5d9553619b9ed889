//! Driving a sequence from a host timeline clip.

use serde::{Deserialize, Serialize};
use volplay_audio::AudioCue;
use volplay_core::{FrameRate, RationalTime, Result, VolplayError};

/// A clip placed on a host timeline that plays a slice of a sequence
/// stretched over `duration_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipTiming {
    pub first_frame: u32,
    /// `None` plays to the end of the sequence.
    pub last_frame: Option<u32>,
    pub frame_count: u32,
    pub frame_rate: FrameRate,
    pub duration_seconds: f64,
}

impl ClipTiming {
    pub fn new(
        first_frame: u32,
        last_frame: Option<u32>,
        frame_count: u32,
        frame_rate: FrameRate,
        duration_seconds: f64,
    ) -> Result<Self> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "clip duration must be positive, got {}",
                duration_seconds
            )));
        }
        if first_frame >= frame_count {
            return Err(VolplayError::FrameOutOfRange {
                frame: first_frame,
                first: 0,
                last: frame_count.saturating_sub(1),
            });
        }
        Ok(Self {
            first_frame,
            last_frame,
            frame_count,
            frame_rate,
            duration_seconds,
        })
    }

    /// Sequence frames consumed per frame of clip time.
    pub fn speed_ratio(&self) -> f32 {
        let frames = match self.last_frame {
            Some(last) if last > self.first_frame => last - self.first_frame,
            _ => self.frame_count - self.first_frame,
        };
        (frames as f64 / (self.duration_seconds * self.frame_rate.to_fps_f64())) as f32
    }

    /// Sequence frame shown `clip_seconds` into the clip, clamped to the
    /// clip's last frame.
    pub fn frame_at(&self, clip_seconds: f64) -> u32 {
        let last = self
            .last_frame
            .filter(|&last| last > self.first_frame)
            .unwrap_or(self.frame_count - 1);
        let advanced =
            clip_seconds.max(0.0) * self.frame_rate.to_fps_f64() * self.speed_ratio() as f64;
        (self.first_frame + advanced.floor() as u32).min(last)
    }

    /// Audio position and pitch matching `clip_seconds`.
    pub fn audio_cue(&self, clip_seconds: f64) -> AudioCue {
        let speed = self.speed_ratio();
        AudioCue {
            offset: RationalTime::from_seconds_f64(clip_seconds.max(0.0) * speed as f64),
            pitch: speed,
            reversed: false,
        }
    }
}
