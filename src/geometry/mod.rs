//! Geometry Core
//!
//! Static triangle-mesh terrain and the queries the dynamics integrator runs
//! against it:
//! - Closest point (with and without the face normal)
//! - Segment intersection (parametric `t` along the segment)
//! - Swept sphere time-of-impact
//!
//! Terrain is a list of independently baked meshes, one per placed terrain
//! piece. Queries are brute-force linear scans over pieces and triangles;
//! results across pieces keep the globally closest / earliest hit.
//!
//! Degenerate queries (zero-length segments, non-positive radii, empty
//! meshes) report "no collision" rather than an error.

mod triangle;
mod mesh;
mod terrain;

pub use triangle::Triangle;
pub use mesh::TriangleMesh;
pub use terrain::Terrain;

use glam::Vec3;

/// A motion interval for a point or sphere center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Unnormalized direction (`end - start`), so `t` stays in `[0, 1]`.
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start + self.direction() * t
    }

    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// Zero-length segments never collide.
    pub fn is_degenerate(&self) -> bool {
        self.direction().length_squared() <= f32::EPSILON * f32::EPSILON
    }
}

/// A point on a surface together with the face normal of its triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Result of a segment query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Fraction along the segment, in `[0, 1]`
    pub t: f32,
    pub point: Vec3,
    /// Face normal of the crossed triangle (winding order, not flipped)
    pub normal: Vec3,
}
