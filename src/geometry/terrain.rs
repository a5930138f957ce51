//! Terrain
//!
//! The collidable world surface: a set of independently baked meshes.
//! Every query scans all pieces and keeps the globally closest point or
//! the smallest `t`, so the answer never depends on how level geometry
//! was split into pieces.

use glam::Vec3;
use super::{Segment, SegmentHit, SurfacePoint, TriangleMesh};

#[derive(Debug, Clone, Default)]
pub struct Terrain {
    pieces: Vec<TriangleMesh>,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pieces(pieces: Vec<TriangleMesh>) -> Self {
        Self { pieces }
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.iter().all(TriangleMesh::is_empty)
    }

    pub fn triangle_count(&self) -> usize {
        self.pieces.iter().map(TriangleMesh::len).sum()
    }

    /// Globally closest point on any piece.
    pub fn closest_point(&self, point: Vec3) -> Option<Vec3> {
        self.closest_point_with_normal(point).map(|hit| hit.point)
    }

    pub fn closest_point_with_normal(&self, point: Vec3) -> Option<SurfacePoint> {
        let mut best: Option<(f32, SurfacePoint)> = None;
        for piece in &self.pieces {
            let Some(hit) = piece.closest_point_with_normal(point) else {
                continue;
            };
            let dist_sq = (hit.point - point).length_squared();
            if best.map_or(true, |(d, _)| dist_sq < d) {
                best = Some((dist_sq, hit));
            }
        }
        best.map(|(_, hit)| hit)
    }

    /// Earliest crossing along the segment across all pieces.
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f32> {
        self.intersect_segment_with_normal(segment).map(|hit| hit.t)
    }

    pub fn intersect_segment_with_normal(&self, segment: &Segment) -> Option<SegmentHit> {
        let mut best: Option<SegmentHit> = None;
        for piece in &self.pieces {
            let Some(hit) = piece.intersect_segment_with_normal(segment) else {
                continue;
            };
            if best.map_or(true, |b| hit.t < b.t) {
                best = Some(hit);
            }
        }
        best
    }

    /// Earliest sphere time of impact across all pieces.
    pub fn sweep_sphere(&self, motion: &Segment, radius: f32) -> Option<f32> {
        let mut best: Option<f32> = None;
        for piece in &self.pieces {
            let Some(t) = piece.sweep_sphere(motion, radius) else {
                continue;
            };
            if best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Triangle;
    use approx::assert_relative_eq;

    /// A large square at height `z`, normal up
    fn floor_at(z: f32) -> TriangleMesh {
        let s = 50.0;
        TriangleMesh::new(vec![
            Triangle::new(Vec3::new(-s, -s, z), Vec3::new(s, -s, z), Vec3::new(s, s, z)),
            Triangle::new(Vec3::new(-s, -s, z), Vec3::new(s, s, z), Vec3::new(-s, s, z)),
        ])
    }

    #[test]
    fn test_closest_across_pieces() {
        let terrain = Terrain::from_pieces(vec![floor_at(0.0), floor_at(10.0)]);
        let p = terrain.closest_point(Vec3::new(1.0, 2.0, 7.0)).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 10.0), 1e-5));

        let p = terrain.closest_point(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_segment_smallest_t_across_pieces() {
        // Piece order must not matter: lower floor first
        let terrain = Terrain::from_pieces(vec![floor_at(0.0), floor_at(5.0)]);
        let seg = Segment::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -10.0));
        let hit = terrain.intersect_segment_with_normal(&seg).unwrap();
        assert_relative_eq!(hit.t, 0.25, epsilon = 1e-6);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_sweep_smallest_t_across_pieces() {
        let terrain = Terrain::from_pieces(vec![floor_at(0.0), floor_at(5.0)]);
        let motion = Segment::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -10.0));
        let t = terrain.sweep_sphere(&motion, 1.0).unwrap();
        // Touches the upper floor when the center reaches z=6
        assert_relative_eq!(t, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_terrain() {
        let terrain = Terrain::from_pieces(vec![TriangleMesh::default()]);
        assert!(terrain.is_empty());
        assert_eq!(terrain.triangle_count(), 0);
        assert_eq!(terrain.closest_point(Vec3::ZERO), None);
    }
}
