//! Playback statistics: decoding rate, updating rate and decoding delay.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use volplay_core::FrameRate;

/// Rates are recomputed at most this often.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Monotonic time since an arbitrary origin.
pub trait TimeSource: Send {
    fn now(&self) -> Duration;
}

/// Wall clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced time, shared between the collector and whoever drives it.
#[derive(Debug, Clone, Default)]
pub struct ManualTime(Arc<Mutex<Duration>>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        *self.0.lock()
    }
}

/// Snapshot for display. Rates and delay are `None` while not playing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackStats {
    /// Models produced by the decoder per second.
    pub decoding_fps: Option<f32>,
    /// Models published to the consumer per second.
    pub updating_fps: Option<f32>,
    /// Seconds the presented frame lags behind real time.
    pub decoding_delay: Option<f64>,
    pub frames_played: u64,
    pub models_published: u64,
}

pub struct StatsCollector {
    time: Box<dyn TimeSource>,
    playing_since: Option<Duration>,
    frames_played: u64,
    models_published: u64,
    sample_start: Duration,
    sample_model_id: Option<u64>,
    sample_published: u64,
    decoding_fps: f32,
    updating_fps: f32,
}

impl StatsCollector {
    pub fn new(time: Box<dyn TimeSource>) -> Self {
        let now = time.now();
        Self {
            time,
            playing_since: None,
            frames_played: 0,
            models_published: 0,
            sample_start: now,
            sample_model_id: None,
            sample_published: 0,
            decoding_fps: 0.0,
            updating_fps: 0.0,
        }
    }

    /// Restart the played-frame counter and the delay reference.
    pub fn on_play(&mut self, last_model_id: Option<u64>) {
        let now = self.time.now();
        self.playing_since = Some(now);
        self.frames_played = 0;
        self.sample_start = now;
        self.sample_model_id = last_model_id;
        self.sample_published = self.models_published;
        self.decoding_fps = 0.0;
        self.updating_fps = 0.0;
    }

    pub fn on_pause(&mut self) {
        self.playing_since = None;
    }

    pub fn record_tick(&mut self, last_model_id: Option<u64>, published: bool) {
        if published {
            self.models_published += 1;
            if self.playing_since.is_some() {
                self.frames_played += 1;
            }
        }

        let now = self.time.now();
        let elapsed = now.saturating_sub(self.sample_start);
        if elapsed < SAMPLE_INTERVAL {
            return;
        }
        let seconds = elapsed.as_secs_f32();
        if let (Some(id), Some(start)) = (last_model_id, self.sample_model_id) {
            self.decoding_fps = id.saturating_sub(start) as f32 / seconds;
        }
        self.updating_fps = (self.models_published - self.sample_published) as f32 / seconds;
        self.sample_start = now;
        self.sample_model_id = last_model_id;
        self.sample_published = self.models_published;
    }

    pub fn snapshot(&self, frame_rate: FrameRate) -> PlaybackStats {
        let Some(since) = self.playing_since else {
            return PlaybackStats {
                frames_played: self.frames_played,
                models_published: self.models_published,
                ..Default::default()
            };
        };
        let playing_for = self.time.now().saturating_sub(since).as_secs_f64();
        PlaybackStats {
            decoding_fps: Some(self.decoding_fps),
            updating_fps: Some(self.updating_fps),
            decoding_delay: Some(playing_for - self.frames_played as f64 / frame_rate.to_fps_f64()),
            frames_played: self.frames_played,
            models_published: self.models_published,
        }
    }
}

impl std::fmt::Debug for StatsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCollector")
            .field("playing_since", &self.playing_since)
            .field("frames_played", &self.frames_played)
            .field("decoding_fps", &self.decoding_fps)
            .field("updating_fps", &self.updating_fps)
            .finish_non_exhaustive()
    }
}
