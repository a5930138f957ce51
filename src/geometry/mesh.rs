//! Triangle Mesh
//!
//! One baked terrain piece. Vertex data is transformed into world space
//! once at construction and never changes afterwards.

use glam::{Mat4, Vec3};
use super::{Segment, SegmentHit, SurfacePoint, Triangle};

/// An immutable list of world-space triangles.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
}

impl TriangleMesh {
    /// Build from world-space triangles. Degenerate triangles are dropped
    /// since they can never be hit.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let total = triangles.len();
        let triangles: Vec<Triangle> = triangles.into_iter().filter(|t| !t.is_degenerate()).collect();
        if triangles.len() != total {
            log::warn!("dropped {} degenerate triangles while baking mesh", total - triangles.len());
        }
        Self { triangles }
    }

    /// Bake local-space triangles through a placement matrix.
    pub fn bake(local: &[[Vec3; 3]], placement: Mat4) -> Self {
        let triangles = local
            .iter()
            .map(|[a, b, c]| {
                Triangle::new(
                    placement.transform_point3(*a),
                    placement.transform_point3(*b),
                    placement.transform_point3(*c),
                )
            })
            .collect();
        Self::new(triangles)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Nearest point on any triangle. Ties keep the first triangle scanned.
    pub fn closest_point(&self, point: Vec3) -> Option<Vec3> {
        self.closest_point_with_normal(point).map(|hit| hit.point)
    }

    /// Nearest point plus the face normal of the triangle it lies on.
    pub fn closest_point_with_normal(&self, point: Vec3) -> Option<SurfacePoint> {
        let mut best: Option<(f32, SurfacePoint)> = None;
        for tri in &self.triangles {
            let candidate = tri.closest_point(point);
            let dist_sq = (candidate - point).length_squared();
            if best.map_or(true, |(d, _)| dist_sq < d) {
                best = Some((dist_sq, SurfacePoint { point: candidate, normal: tri.normal() }));
            }
        }
        best.map(|(_, hit)| hit)
    }

    /// Earliest crossing along the segment.
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f32> {
        self.intersect_segment_with_normal(segment).map(|hit| hit.t)
    }

    /// Earliest crossing along the segment, with the crossed face's normal.
    pub fn intersect_segment_with_normal(&self, segment: &Segment) -> Option<SegmentHit> {
        if segment.is_degenerate() {
            return None;
        }
        let mut best: Option<SegmentHit> = None;
        for tri in &self.triangles {
            let Some(t) = tri.intersect_segment(segment.start, segment.end) else {
                continue;
            };
            if best.map_or(true, |b| t < b.t) {
                best = Some(SegmentHit { t, point: segment.point_at(t), normal: tri.normal() });
            }
        }
        best
    }

    /// Earliest time of impact of a sphere whose center moves along `motion`.
    pub fn sweep_sphere(&self, motion: &Segment, radius: f32) -> Option<f32> {
        let mut best: Option<f32> = None;
        for tri in &self.triangles {
            let Some(t) = tri.sweep_sphere(motion.start, motion.end, radius) else {
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
    use approx::assert_relative_eq;

    /// Two triangles forming a square floor of half-size 1 at z=0
    fn unit_floor() -> Vec<[Vec3; 3]> {
        vec![
            [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)],
            [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0)],
        ]
    }

    #[test]
    fn test_bake_applies_placement() {
        let placement = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 3.0),
        );
        let mesh = TriangleMesh::bake(&unit_floor(), placement);
        assert_eq!(mesh.len(), 2);

        let p = mesh.closest_point(Vec3::new(11.5, 1.5, 10.0)).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(11.5, 1.5, 3.0), 1e-5));
    }

    #[test]
    fn test_degenerate_triangles_dropped() {
        let mesh = TriangleMesh::new(vec![
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X),
        ]);
        assert_eq!(mesh.len(), 1);
    }

    #[test]
    fn test_empty_mesh_reports_nothing() {
        let mesh = TriangleMesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.closest_point(Vec3::ZERO), None);
        let seg = Segment::new(Vec3::Z, Vec3::NEG_Z);
        assert_eq!(mesh.intersect_segment(&seg), None);
        assert_eq!(mesh.sweep_sphere(&seg, 0.5), None);
    }

    #[test]
    fn test_closest_point_with_normal() {
        let mesh = TriangleMesh::bake(&unit_floor(), Mat4::IDENTITY);
        let hit = mesh.closest_point_with_normal(Vec3::new(0.25, -0.5, 2.0)).unwrap();
        assert!(hit.point.abs_diff_eq(Vec3::new(0.25, -0.5, 0.0), 1e-6));
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_segment_keeps_earliest_hit() {
        // Two stacked floors; a downward segment must report the upper one
        let mut tris = unit_floor();
        tris.extend(unit_floor().into_iter().map(|t| t.map(|v| v + Vec3::new(0.0, 0.0, -2.0))));
        let mesh = TriangleMesh::bake(&tris, Mat4::IDENTITY);

        let seg = Segment::new(Vec3::new(0.2, 0.3, 1.0), Vec3::new(0.2, 0.3, -3.0));
        let hit = mesh.intersect_segment_with_normal(&seg).unwrap();
        assert_relative_eq!(hit.t, 0.25, epsilon = 1e-6);
        assert!(hit.point.abs_diff_eq(Vec3::new(0.2, 0.3, 0.0), 1e-6));
    }

    #[test]
    fn test_sweep_sphere_against_floor() {
        let mesh = TriangleMesh::bake(&unit_floor(), Mat4::IDENTITY);
        let motion = Segment::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 0.0));
        let t = mesh.sweep_sphere(&motion, 0.5).unwrap();
        assert_relative_eq!(t, 0.75, epsilon = 1e-5);
    }
}
