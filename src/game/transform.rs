//! Transform Component
//!
//! Position, rotation and uniform scale of an entity in world space.
//! There is no hierarchy: whichever system controls an entity (player
//! input, AI, scripted motion) mutates its transform in place each tick.
//!
//! Yaw is measured about world up (+Z); yaw 0 faces +Y.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Unit quaternion
    pub rotation: Quat,
    /// Uniform scale
    pub scale: f32,
}

impl Transform {
    /// Identity transform (origin, no rotation, scale 1)
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Horizontal facing direction (unit length).
    pub fn facing(&self) -> Vec2 {
        (self.rotation * Vec3::Y).truncate().normalize_or(Vec2::Y)
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation = Quat::from_rotation_z(yaw);
    }

    /// Turn to face a horizontal direction. Zero directions are ignored.
    pub fn face_towards(&mut self, direction: Vec2) {
        if direction.length_squared() > f32::EPSILON {
            self.set_yaw(yaw_of(direction));
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Yaw that rotates +Y onto `direction`.
pub fn yaw_of(direction: Vec2) -> f32 {
    (-direction.x).atan2(direction.y)
}

/// Unit horizontal direction for a yaw angle.
pub fn direction_of(yaw: f32) -> Vec2 {
    Vec2::new(-yaw.sin(), yaw.cos())
}
