//! Rigid/skeletal tracking channels.

use glam::{EulerRot, Quat, Vec4};
use serde::{Deserialize, Serialize};
use volplay_core::{FrameRate, RationalTime, Vec3};

/// How the per-frame rotation vector is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationRepresentation {
    /// `(x, y, z, w)` quaternion.
    Quaternion,
    /// `(x, y, z)` XYZ Euler angles in radians; `w` unused.
    Euler,
    /// Discriminator this player does not know.
    Unknown(i32),
}

impl RotationRepresentation {
    pub fn from_raw(kind: i32) -> Self {
        match kind {
            0 => Self::Quaternion,
            1 => Self::Euler,
            other => Self::Unknown(other),
        }
    }
}

/// A single timed sample for host animation systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingKeyframe {
    /// Time relative to the channel's first frame.
    pub time: RationalTime,
    pub position: Vec3,
    pub rotation: Vec4,
}

/// One track, fully materialized at load and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingChannel {
    pub name: String,
    pub first_frame: u32,
    pub last_frame: u32,
    pub rotation: RotationRepresentation,
    pub positions: Vec<Vec3>,
    pub rotations: Vec<Vec4>,
}

impl TrackingChannel {
    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn covers(&self, frame: u32) -> bool {
        frame >= self.first_frame && frame <= self.last_frame
    }

    /// Position at a sequence frame, `None` outside the channel.
    pub fn position(&self, frame: u32) -> Option<Vec3> {
        self.index(frame).and_then(|i| self.positions.get(i).copied())
    }

    /// Raw rotation vector at a sequence frame.
    pub fn raw_rotation(&self, frame: u32) -> Option<Vec4> {
        self.index(frame).and_then(|i| self.rotations.get(i).copied())
    }

    /// Rotation at a sequence frame as a quaternion. Unknown representations
    /// yield `None`.
    pub fn orientation(&self, frame: u32) -> Option<Quat> {
        let raw = self.raw_rotation(frame)?;
        match self.rotation {
            RotationRepresentation::Quaternion => {
                Some(Quat::from_xyzw(raw.x, raw.y, raw.z, raw.w).normalize())
            }
            RotationRepresentation::Euler => {
                Some(Quat::from_euler(EulerRot::XYZ, raw.x, raw.y, raw.z))
            }
            RotationRepresentation::Unknown(_) => None,
        }
    }

    /// Keyframes at `i / frame_rate` seconds for `i` in the channel.
    pub fn keyframes(&self, frame_rate: FrameRate) -> Vec<TrackingKeyframe> {
        self.positions
            .iter()
            .zip(&self.rotations)
            .enumerate()
            .map(|(i, (&position, &rotation))| TrackingKeyframe {
                time: RationalTime::from_frames(i as i64, frame_rate),
                position,
                rotation,
            })
            .collect()
    }

    fn index(&self, frame: u32) -> Option<usize> {
        self.covers(frame)
            .then(|| (frame - self.first_frame) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(rotation: RotationRepresentation) -> TrackingChannel {
        TrackingChannel {
            name: "head".to_string(),
            first_frame: 10,
            last_frame: 12,
            rotation,
            positions: vec![Vec3::X, Vec3::Y, Vec3::Z],
            rotations: vec![Vec4::W, Vec4::W, Vec4::new(0.0, 0.0, 0.0, 2.0)],
        }
    }

    #[test]
    fn test_sample_by_sequence_frame() {
        let channel = channel(RotationRepresentation::Quaternion);
        assert_eq!(channel.position(10), Some(Vec3::X));
        assert_eq!(channel.position(12), Some(Vec3::Z));
        assert_eq!(channel.position(9), None);
        assert_eq!(channel.position(13), None);
        assert_eq!(channel.orientation(12), Some(Quat::IDENTITY));
    }

    #[test]
    fn test_euler_and_unknown() {
        let mut channel = channel(RotationRepresentation::Euler);
        channel.rotations[0] = Vec4::new(0.0, std::f32::consts::FRAC_PI_2, 0.0, 0.0);
        let q = channel.orientation(10).unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), 1e-6));

        channel.rotation = RotationRepresentation::from_raw(7);
        assert_eq!(channel.rotation, RotationRepresentation::Unknown(7));
        assert!(channel.orientation(10).is_none());
    }

    #[test]
    fn test_keyframe_times() {
        let keys = channel(RotationRepresentation::Quaternion).keyframes(FrameRate::FPS_25);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].time, RationalTime::ZERO);
        assert_eq!(keys[2].time.to_seconds_f64(), 0.08);
        assert_eq!(keys[1].position, Vec3::Y);
    }
}
