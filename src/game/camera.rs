//! Third-person camera boom
//!
//! The camera sits behind and above its target. A sphere is swept from the
//! target toward the desired camera position; if terrain is in the way the
//! camera stops where the sphere first touches it.

use glam::Vec3;

use super::dynamics::UP;
use super::transform::direction_of;
use crate::config::CameraSettings;
use crate::geometry::{Segment, Terrain};

/// Unobstructed camera position for a target and camera yaw.
pub fn desired_camera_position(target: Vec3, yaw: f32, settings: &CameraSettings) -> Vec3 {
    target - direction_of(yaw).extend(0.0) * settings.distance + UP * settings.height
}

/// Pull `desired` toward `target` until a sphere of `probe_radius` fits.
pub fn boom_position(terrain: &Terrain, target: Vec3, desired: Vec3, probe_radius: f32) -> Vec3 {
    let boom = Segment::new(target, desired);
    match terrain.sweep_sphere(&boom, probe_radius) {
        Some(t) => boom.point_at(t),
        None => desired,
    }
}

/// Final camera position: desired placement, then occlusion.
pub fn camera_position(terrain: &Terrain, target: Vec3, yaw: f32, settings: &CameraSettings) -> Vec3 {
    let desired = desired_camera_position(target, yaw, settings);
    boom_position(terrain, target, desired, settings.probe_radius)
}
