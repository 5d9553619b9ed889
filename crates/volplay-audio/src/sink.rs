//! Audio output seam.
//!
//! [`FeedSink`] is a pull-based sink: the host's audio callback thread holds a
//! [`FeedReader`] and asks it for interleaved samples at the cued position
//! and pitch.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::sync::AudioCue;
use crate::track::AudioTrack;

/// Consumer of the materialized track, driven by playback.
pub trait AudioSink: Send {
    /// Hand over the track once after load.
    fn load(&mut self, track: &AudioTrack);

    /// Start (or restart) playback at the cue.
    fn play(&mut self, cue: AudioCue);

    fn set_pitch(&mut self, pitch: f32);

    fn pause(&mut self);

    fn stop(&mut self);

    /// Current playback position in seconds, if the sink tracks one.
    fn position_seconds(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Default)]
struct FeedState {
    samples: Vec<f32>,
    channel_count: usize,
    sample_rate: u32,
    /// Read position in sample frames; fractional when pitch != 1.
    position: f64,
    pitch: f32,
    playing: bool,
}

impl FeedState {
    fn frame_count(&self) -> usize {
        if self.channel_count == 0 {
            0
        } else {
            self.samples.len() / self.channel_count
        }
    }
}

/// Sink that exposes the track to a pulling audio callback.
#[derive(Debug, Clone, Default)]
pub struct FeedSink {
    state: Arc<Mutex<FeedState>>,
}

impl FeedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader handle for the audio thread.
    pub fn reader(&self) -> FeedReader {
        FeedReader {
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }
}

impl AudioSink for FeedSink {
    fn load(&mut self, track: &AudioTrack) {
        let mut state = self.state.lock();
        state.samples = track.samples.clone();
        state.channel_count = track.channel_count as usize;
        state.sample_rate = track.sample_rate;
        state.position = 0.0;
        state.pitch = 1.0;
        state.playing = false;
    }

    fn play(&mut self, cue: AudioCue) {
        let mut state = self.state.lock();
        state.position = cue.offset_seconds() * state.sample_rate as f64;
        state.pitch = cue.pitch;
        state.playing = !cue.reversed;
        debug!("Audio cue at {:.3}s, pitch {}", cue.offset_seconds(), cue.pitch);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.state.lock().pitch = pitch.max(0.0);
    }

    fn pause(&mut self) {
        self.state.lock().playing = false;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.position = 0.0;
    }

    fn position_seconds(&self) -> Option<f64> {
        let state = self.state.lock();
        (state.sample_rate > 0).then(|| state.position / state.sample_rate as f64)
    }
}

/// Audio-thread side of a [`FeedSink`].
#[derive(Debug, Clone)]
pub struct FeedReader {
    state: Arc<Mutex<FeedState>>,
}

impl FeedReader {
    /// Fill `output` with interleaved samples, silence when paused or past
    /// the end. Returns the number of sample frames taken from the track.
    pub fn fill(&self, output: &mut [f32]) -> usize {
        let mut state = self.state.lock();
        let channels = state.channel_count;
        if channels == 0 {
            output.fill(0.0);
            return 0;
        }

        let frames = state.frame_count();
        let mut taken = 0;
        for frame in output.chunks_mut(channels) {
            let index = state.position as usize;
            if !state.playing || index >= frames {
                frame.fill(0.0);
                continue;
            }
            let start = index * channels;
            let len = frame.len();
            frame.copy_from_slice(&state.samples[start..start + len]);
            state.position += state.pitch as f64;
            taken += 1;
        }
        taken
    }
}
