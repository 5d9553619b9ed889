//! Time and frame-range representation.
//!
//! Sequence frame rates come from the decoder as floats; they are snapped to
//! rational values so frame/time conversions stay exact over long clips.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VolplayError};

/// A rational time value in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RationalTime {
    value: Rational64,
}

impl RationalTime {
    /// Create a new RationalTime of `numerator / denominator` seconds.
    #[inline]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            value: Rational64::new(numerator, denominator),
        }
    }

    /// Time at which `frames` starts at the given rate.
    #[inline]
    pub fn from_frames(frames: i64, rate: FrameRate) -> Self {
        Self {
            value: Rational64::new(frames * rate.denominator as i64, rate.numerator as i64),
        }
    }

    /// Create a RationalTime from seconds as a float.
    /// Note: May introduce small precision errors.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        const PRECISION: i64 = 1_000_000;
        Self {
            value: Rational64::new((seconds * PRECISION as f64).round() as i64, PRECISION),
        }
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }

    /// Zero time constant.
    pub const ZERO: Self = Self {
        value: Rational64::new_raw(0, 1),
    };
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.to_seconds_f64())
    }
}

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Snap a decoder-reported float rate to a rational one.
    ///
    /// Integral rates and NTSC rates (`n * 1000 / 1001`) are recognised;
    /// anything else keeps millihertz precision.
    pub fn from_fps_f32(fps: f32) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "frame rate must be positive, got {}",
                fps
            )));
        }
        let fps = fps as f64;
        let rounded = fps.round();
        if (fps - rounded).abs() < 1e-3 {
            return Ok(Self::new(rounded as u32, 1));
        }
        let ntsc_base = (fps * 1001.0 / 1000.0).round();
        if (ntsc_base * 1000.0 / 1001.0 - fps).abs() < 1e-3 {
            return Ok(Self::new(ntsc_base as u32 * 1000, 1001));
        }
        Ok(Self::new((fps * 1000.0).round() as u32, 1000))
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// The sub-interval of frames eligible for playback, as configured.
///
/// `last == None` means "until the end of the sequence"; it is resolved
/// lazily once the frame count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActiveRange {
    pub first: u32,
    #[serde(default)]
    pub last: Option<u32>,
}

impl ActiveRange {
    /// The whole sequence.
    pub const FULL: Self = Self {
        first: 0,
        last: None,
    };

    pub fn new(first: u32, last: Option<u32>) -> Result<Self> {
        if let Some(last) = last {
            if first > last {
                return Err(VolplayError::InvalidParameter(format!(
                    "active range first frame {} is after last frame {}",
                    first, last
                )));
            }
        }
        Ok(Self { first, last })
    }

    /// Resolve against the sequence length. An explicit last frame past the
    /// end is clamped to the final frame.
    pub fn resolve(self, frame_count: u32) -> Result<ResolvedRange> {
        if frame_count == 0 {
            return Err(VolplayError::InvalidParameter(
                "sequence has no frames".to_string(),
            ));
        }
        let end = frame_count - 1;
        let last = self.last.unwrap_or(end).min(end);
        if self.first > last {
            return Err(VolplayError::InvalidParameter(format!(
                "active range starts at frame {} but the sequence ends at {}",
                self.first, last
            )));
        }
        Ok(ResolvedRange {
            first: self.first,
            last,
        })
    }
}

/// An active range with both ends known. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub first: u32,
    pub last: u32,
}

impl ResolvedRange {
    /// Number of frames in the range.
    #[inline]
    pub fn len(self) -> u32 {
        self.last - self.first + 1
    }

    /// Always false; a resolved range holds at least one frame.
    #[inline]
    pub fn is_empty(self) -> bool {
        false
    }

    /// Distance in frames between the first and last frame.
    #[inline]
    pub fn span(self) -> u32 {
        self.last - self.first
    }

    #[inline]
    pub fn contains(self, frame: u32) -> bool {
        frame >= self.first && frame <= self.last
    }
}
