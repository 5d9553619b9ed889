//! Sequence identity and capacity metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::time::FrameRate;

/// Opaque identifier for one open sequence, issued by the source boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceHandle(pub Uuid);

impl SequenceHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SequenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq-{}", self.0.simple())
    }
}

/// Compressed (or raw) texel layout of a sequence texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureEncoding {
    /// 4 bits per pixel block compression (desktop).
    #[default]
    Dxt1,
    /// 4 bits per pixel block compression (mobile).
    Etc2,
    /// 2 bits per pixel.
    Pvrtc2,
    /// 8x8 blocks of 16 bytes.
    Astc8x8,
    /// Uncompressed, 4 bytes per pixel.
    Rgba32,
}

impl TextureEncoding {
    /// Bytes needed for one square texture of `size` pixels per side.
    pub fn buffer_len(self, size: u32) -> usize {
        let size = size as usize;
        match self {
            Self::Dxt1 | Self::Etc2 => size * size / 2,
            Self::Pvrtc2 => size * size / 4,
            Self::Astc8x8 => {
                let blocks = size.div_ceil(8);
                blocks * blocks * 16
            }
            Self::Rgba32 => size * size * 4,
        }
    }
}

/// How surface color is carried. Decided once at load, never switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// RGBA per vertex; no UV/normal/velocity arrays and no texture.
    PerVertex,
    /// Square texture plus UVs, normals and velocities per vertex.
    Textured {
        size: u32,
        encoding: TextureEncoding,
    },
}

impl ColorMode {
    #[inline]
    pub fn is_textured(self) -> bool {
        matches!(self, Self::Textured { .. })
    }
}

/// What playback does when the cursor leaves the active range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutOfRangeMode {
    /// Wrap back to the first active frame.
    #[default]
    Loop,
    /// Bounce between the first and last active frames.
    Reverse,
    /// Stop on the last active frame.
    Stop,
    /// Keep the clock running but present nothing.
    Hide,
}

/// Capacity and timing information of an open sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequenceInfo {
    pub max_vertices: u32,
    pub max_triangles: u32,
    pub color_mode: ColorMode,
    pub frame_rate: FrameRate,
    pub frame_count: u32,
    /// Whether the sequence carries data for look-at pose adjustment.
    pub has_look_at: bool,
}

impl SequenceInfo {
    /// Clip length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count as f64 / self.frame_rate.to_fps_f64()
    }
}
