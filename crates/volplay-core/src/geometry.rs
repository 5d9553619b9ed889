//! Geometric primitives for mesh bounds and pose adjustment.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3 as GlamVec3};
use serde::{Deserialize, Serialize};

/// 3D vector.
pub type Vec3 = GlamVec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Placeholder volume used before the first model arrives
    /// (centered on the origin, half-extent 4 on every axis).
    pub const PLACEHOLDER: Self = Self {
        min: Vec3::splat(-4.0),
        max: Vec3::splat(4.0),
    };

    /// Create bounds from the two corners reported by the decoder.
    /// The corners may come in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[inline]
    pub fn center(self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(self) -> Vec3 {
        self.max - self.min
    }

    /// Half of the size along each axis.
    #[inline]
    pub fn extents(self) -> Vec3 {
        self.size() * 0.5
    }
}

/// Per-tick request to bias the model's pose toward a target.
///
/// `target` is expressed in the model's local space; the default look
/// direction is +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookAt {
    pub target: Vec3,
    pub max_angle_degrees: i32,
}

impl LookAt {
    pub fn new(target: Vec3, max_angle_degrees: i32) -> Self {
        Self {
            target,
            max_angle_degrees,
        }
    }

    /// Signed yaw (radians, around +Y) from +Z toward the target,
    /// clamped to the maximum angle. Zero when the target sits on the Y axis.
    pub fn clamped_yaw(&self) -> f32 {
        let flat = Vec3::new(self.target.x, 0.0, self.target.z);
        if flat.length_squared() <= f32::EPSILON {
            return 0.0;
        }
        let yaw = flat.x.atan2(flat.z);
        let limit = (self.max_angle_degrees.max(0) as f32).to_radians();
        yaw.clamp(-limit, limit)
    }

    /// Rotation to apply to vertex positions and normals.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.clamped_yaw())
    }
}
