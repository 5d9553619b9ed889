//! Playback clock and active-range controller.
//!
//! Time is kept as an unbounded phase, in frames, measured from the first
//! active frame. The out-of-range policy maps the phase onto the range:
//! modulo for `Loop`, reflection for `Reverse`, clamping for `Stop`, and for
//! `Hide` the phase keeps running past the end while nothing is presented.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use volplay_core::{FrameRate, OutOfRangeMode, ResolvedRange, Result, VolplayError};

/// Absorbs float drift when the phase lands a hair below a whole frame.
const PHASE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// What one clock step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub frame: u32,
    pub previous: u32,
    pub direction: Direction,
    /// Crossed from the last back to the first active frame.
    pub wrapped: bool,
    /// Changed direction at either end of the range.
    pub bounced: bool,
    /// Reached the last active frame and stopped.
    pub ended: bool,
    /// Past the end under `Hide`; nothing should be presented.
    pub hidden: bool,
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    range: ResolvedRange,
    mode: OutOfRangeMode,
    fps: f64,
    speed_ratio: f32,
    time_scale: f32,
    state: PlaybackState,
    phase: f64,
    /// The next advance consumes no time.
    hold: bool,
    /// The run reached its end; the next `play(true)` starts over.
    ended: bool,
}

impl PlaybackClock {
    pub fn new(range: ResolvedRange, mode: OutOfRangeMode, frame_rate: FrameRate) -> Self {
        Self {
            range,
            mode,
            fps: frame_rate.to_fps_f64(),
            speed_ratio: 1.0,
            time_scale: 1.0,
            state: PlaybackState::Stopped,
            phase: 0.0,
            hold: false,
            ended: false,
        }
    }

    pub fn range(&self) -> ResolvedRange {
        self.range
    }

    pub fn mode(&self) -> OutOfRangeMode {
        self.mode
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// User speed ratio; must be positive. Direction is owned by the clock.
    pub fn set_speed_ratio(&mut self, ratio: f32) -> Result<()> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "speed ratio must be positive, got {}",
                ratio
            )));
        }
        self.speed_ratio = ratio;
        Ok(())
    }

    /// Host time dilation. Returns whether the value changed.
    pub fn set_time_scale(&mut self, scale: f32) -> Result<bool> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "time scale must be non-negative, got {}",
                scale
            )));
        }
        let changed = scale != self.time_scale;
        self.time_scale = scale;
        Ok(changed)
    }

    /// `speed_ratio * time_scale`, negative while bouncing backwards.
    pub fn effective_rate(&self) -> f32 {
        self.speed_ratio * self.time_scale * self.direction().sign()
    }

    pub fn direction(&self) -> Direction {
        self.position().1
    }

    pub fn current_frame(&self) -> u32 {
        self.range.first + self.position().0
    }

    pub fn is_hidden(&self) -> bool {
        self.mode == OutOfRangeMode::Hide && self.steps() > self.range.span() as u64
    }

    /// Whether a `Stop`/`Hide` clock has run off the end of the range.
    pub fn at_end(&self) -> bool {
        matches!(self.mode, OutOfRangeMode::Stop | OutOfRangeMode::Hide)
            && self.steps() >= self.range.span() as u64
    }

    /// Whether the last run ended, either off the end of a `Stop`/`Hide`
    /// range or through [`PlaybackClock::finish`].
    pub fn has_ended(&self) -> bool {
        self.ended || self.is_hidden() || (self.state == PlaybackState::Stopped && self.at_end())
    }

    /// `true` starts (or resumes) playback, `false` pauses it. Starting an
    /// ended run rewinds to the first active frame.
    pub fn play(&mut self, on: bool) {
        if on {
            if self.has_ended() {
                self.phase = 0.0;
                self.ended = false;
            }
            self.state = PlaybackState::Playing;
            self.hold = true;
            info!("Playback started at frame {}", self.current_frame());
        } else {
            self.state = PlaybackState::Paused;
            info!("Playback paused at frame {}", self.current_frame());
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        info!("Playback stopped at frame {}", self.current_frame());
    }

    /// Stop and end the run, whatever the out-of-range mode.
    pub fn finish(&mut self) {
        self.ended = true;
        self.stop();
    }

    /// Jump to `frame`, keeping the current direction under `Reverse`.
    pub fn seek(&mut self, frame: u32) -> Result<()> {
        if !self.range.contains(frame) {
            return Err(VolplayError::FrameOutOfRange {
                frame,
                first: self.range.first,
                last: self.range.last,
            });
        }
        self.ended = false;
        let offset = (frame - self.range.first) as f64;
        let span = self.range.span() as f64;
        self.phase = match (self.mode, self.direction()) {
            (OutOfRangeMode::Reverse, Direction::Backward) if offset < span => 2.0 * span - offset,
            _ => offset,
        };
        self.hold = true;
        Ok(())
    }

    /// Advance by `dt` seconds of host time.
    pub fn advance(&mut self, dt: f64) -> ClockTick {
        let (previous, previous_direction) = self.position();
        let previous_steps = self.steps();

        if self.state == PlaybackState::Playing {
            if self.hold {
                self.hold = false;
            } else if dt > 0.0 {
                self.phase += dt * self.speed_ratio as f64 * self.time_scale as f64 * self.fps;
            }
        }

        let steps = self.steps();
        let span = self.range.span() as u64;
        let (offset, direction) = self.position();
        let mut tick = ClockTick {
            frame: self.range.first + offset,
            previous: self.range.first + previous,
            direction,
            wrapped: false,
            bounced: false,
            ended: false,
            hidden: false,
        };

        match self.mode {
            OutOfRangeMode::Loop => {
                tick.wrapped = steps / (span + 1) > previous_steps / (span + 1);
                if tick.wrapped {
                    debug!("Wrapped to frame {}", tick.frame);
                }
            }
            OutOfRangeMode::Reverse => {
                tick.bounced = direction != previous_direction;
                if tick.bounced {
                    debug!("Bounced at frame {}, now {:?}", tick.frame, direction);
                }
            }
            OutOfRangeMode::Stop => {
                if self.state == PlaybackState::Playing && steps >= span {
                    self.phase = span as f64;
                    self.state = PlaybackState::Stopped;
                    self.ended = true;
                    tick.ended = true;
                    info!("Reached last active frame {}", tick.frame);
                }
            }
            OutOfRangeMode::Hide => {
                tick.hidden = steps > span;
            }
        }
        tick
    }

    fn steps(&self) -> u64 {
        (self.phase + PHASE_EPSILON).floor().max(0.0) as u64
    }

    /// Offset from the first active frame and the travel direction.
    fn position(&self) -> (u32, Direction) {
        let steps = self.steps();
        let span = self.range.span() as u64;
        match self.mode {
            OutOfRangeMode::Loop => ((steps % (span + 1)) as u32, Direction::Forward),
            OutOfRangeMode::Reverse => {
                if span == 0 {
                    return (0, Direction::Forward);
                }
                let period = 2 * span;
                let p = steps % period;
                if p < span {
                    (p as u32, Direction::Forward)
                } else {
                    ((period - p) as u32, Direction::Backward)
                }
            }
            OutOfRangeMode::Stop | OutOfRangeMode::Hide => (steps.min(span) as u32, Direction::Forward),
        }
    }
}
