//! Single-triangle queries
//!
//! Closest point uses the Voronoi-region walk (vertex, edge, face regions).
//! Segment intersection is Möller–Trumbore against an unnormalized segment
//! direction so the returned parameter is a fraction of the segment.
//! Triangles are two-sided for segment and sweep tests.

use glam::Vec3;
use serde::{Serialize, Deserialize};

/// Determinant threshold below which a segment is treated as parallel
const PARALLEL_EPSILON: f32 = 1e-9;

/// Twice-area threshold below which a triangle is degenerate
const DEGENERATE_EPSILON: f32 = 1e-12;

/// A world-space triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit face normal from counter-clockwise winding.
    /// Zero for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// True if the triangle has (almost) no area.
    pub fn is_degenerate(&self) -> bool {
        (self.b - self.a).cross(self.c - self.a).length_squared() < DEGENERATE_EPSILON
    }

    /// Nearest point on the triangle to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        // Face region
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }

    /// Fraction `t ∈ [0, 1]` along `start → end` where the segment crosses
    /// the triangle, or `None`.
    pub fn intersect_segment(&self, start: Vec3, end: Vec3) -> Option<f32> {
        let dir = end - start;
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let h = dir.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / det;
        let s = start - self.a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * dir.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (0.0..=1.0).contains(&t).then_some(t)
    }

    /// Earliest fraction `t ∈ [0, 1]` at which a sphere of `radius` moving
    /// from `start` to `end` touches the triangle.
    ///
    /// Returns `Some(0.0)` if the sphere already overlaps at `start`.
    /// Zero-length motion, non-positive radius and degenerate triangles
    /// never collide.
    pub fn sweep_sphere(&self, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
        let d = end - start;
        if radius <= 0.0 || d.length_squared() <= f32::EPSILON * f32::EPSILON || self.is_degenerate() {
            return None;
        }

        let radius_sq = radius * radius;
        if (start - self.closest_point(start)).length_squared() < radius_sq {
            return Some(0.0);
        }

        let mut best = None;

        // Face: the sphere touches the plane with its contact point inside
        let n = self.normal();
        let dist0 = n.dot(start - self.a);
        let rate = n.dot(d);
        if rate.abs() > PARALLEL_EPSILON {
            let side = if dist0 >= 0.0 { 1.0 } else { -1.0 };
            let t = (side * radius - dist0) / rate;
            if (0.0..=1.0).contains(&t) {
                let contact = start + d * t - n * (side * radius);
                if self.contains_coplanar(contact) {
                    best = earliest(best, t);
                }
            }
        }

        // Edges: the center path enters the cylinder around each edge
        for (p0, p1) in [(self.a, self.b), (self.b, self.c), (self.c, self.a)] {
            let e = p1 - p0;
            let m = start - p0;
            let ee = e.dot(e);
            let ed = e.dot(d);
            let em = e.dot(m);

            let qa = ee * d.dot(d) - ed * ed;
            if qa.abs() <= PARALLEL_EPSILON {
                continue;
            }
            let qb = ee * m.dot(d) - em * ed;
            let qc = ee * (m.dot(m) - radius_sq) - em * em;
            let disc = qb * qb - qa * qc;
            if disc < 0.0 {
                continue;
            }
            let t = (-qb - disc.sqrt()) / qa;
            let along = em + t * ed;
            if (0.0..=ee).contains(&along) {
                best = earliest(best, t);
            }
        }

        // Vertices: the center path enters the sphere around each vertex
        let qa = d.dot(d);
        for v in [self.a, self.b, self.c] {
            let m = start - v;
            let qb = m.dot(d);
            let qc = m.dot(m) - radius_sq;
            let disc = qb * qb - qa * qc;
            if disc < 0.0 {
                continue;
            }
            best = earliest(best, (-qb - disc.sqrt()) / qa);
        }

        best
    }

    /// Inside test for a point already on the triangle's plane.
    fn contains_coplanar(&self, p: Vec3) -> bool {
        let n = (self.b - self.a).cross(self.c - self.a);
        (self.b - self.a).cross(p - self.a).dot(n) >= 0.0
            && (self.c - self.b).cross(p - self.b).dot(n) >= 0.0
            && (self.a - self.c).cross(p - self.c).dot(n) >= 0.0
    }
}

fn earliest(best: Option<f32>, t: f32) -> Option<f32> {
    if !(0.0..=1.0).contains(&t) {
        return best;
    }
    match best {
        Some(b) if b <= t => Some(b),
        _ => Some(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor_triangle() -> Triangle {
        // Counter-clockwise seen from +Z, so the normal points up
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        )
    }

    #[test]
    fn test_normal_follows_winding() {
        let tri = floor_triangle();
        assert!(tri.normal().abs_diff_eq(Vec3::Z, 1e-6));

        let flipped = Triangle::new(tri.a, tri.c, tri.b);
        assert!(flipped.normal().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(tri.is_degenerate());
        assert_eq!(tri.normal(), Vec3::ZERO);
        assert_eq!(tri.sweep_sphere(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -5.0), 1.0), None);
    }

    #[test]
    fn test_closest_point_regions() {
        let tri = floor_triangle();

        // Face region: straight down
        let face = tri.closest_point(Vec3::new(1.0, 1.0, 3.0));
        assert!(face.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));

        // Vertex region outside A
        let vertex = tri.closest_point(Vec3::new(-1.0, -1.0, 0.5));
        assert!(vertex.abs_diff_eq(tri.a, 1e-6));

        // Edge region of AB
        let edge = tri.closest_point(Vec3::new(2.0, -3.0, 0.0));
        assert!(edge.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));

        // Edge region of BC (hypotenuse)
        let hyp = tri.closest_point(Vec3::new(3.0, 3.0, 0.0));
        assert!(hyp.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn test_segment_crosses_triangle() {
        let tri = floor_triangle();
        let t = tri
            .intersect_segment(Vec3::new(1.0, 1.0, 2.0), Vec3::new(1.0, 1.0, -2.0))
            .unwrap();
        assert_relative_eq!(t, 0.5, epsilon = 1e-6);

        // Two-sided: from below works too
        let t = tri
            .intersect_segment(Vec3::new(1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, 3.0))
            .unwrap();
        assert_relative_eq!(t, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_segment_misses() {
        let tri = floor_triangle();
        // Stops short of the plane
        assert_eq!(tri.intersect_segment(Vec3::new(1.0, 1.0, 2.0), Vec3::new(1.0, 1.0, 0.5)), None);
        // Passes beside the triangle
        assert_eq!(tri.intersect_segment(Vec3::new(5.0, 5.0, 2.0), Vec3::new(5.0, 5.0, -2.0)), None);
        // Parallel to the plane
        assert_eq!(tri.intersect_segment(Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0)), None);
        // Zero length
        assert_eq!(tri.intersect_segment(Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)), None);
    }

    #[test]
    fn test_sweep_sphere_face() {
        let tri = floor_triangle();
        // Center falls from z=3 to z=-1; touches when center is at z=0.5
        let t = tri
            .sweep_sphere(Vec3::new(1.0, 1.0, 3.0), Vec3::new(1.0, 1.0, -1.0), 0.5)
            .unwrap();
        assert_relative_eq!(t, 2.5 / 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sweep_sphere_edge() {
        let tri = floor_triangle();
        // Moving along +Y at z=0 toward edge AB from y=-3; touches at y=-0.5
        let t = tri
            .sweep_sphere(Vec3::new(2.0, -3.0, 0.0), Vec3::new(2.0, 1.0, 0.0), 0.5)
            .unwrap();
        assert_relative_eq!(t, 2.5 / 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sweep_sphere_vertex() {
        let tri = floor_triangle();
        // Head-on toward vertex A along the X axis, just below the plane
        let t = tri
            .sweep_sphere(Vec3::new(-3.0, 0.0, -0.0001), Vec3::new(-1.0, 0.0, -0.0001), 1.0)
            .unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sweep_sphere_already_touching() {
        let tri = floor_triangle();
        let t = tri.sweep_sphere(Vec3::new(1.0, 1.0, 0.2), Vec3::new(1.0, 1.0, 5.0), 0.5);
        assert_eq!(t, Some(0.0));
    }

    #[test]
    fn test_sweep_sphere_degenerate_queries() {
        let tri = floor_triangle();
        let start = Vec3::new(1.0, 1.0, 3.0);
        assert_eq!(tri.sweep_sphere(start, start, 0.5), None);
        assert_eq!(tri.sweep_sphere(start, Vec3::new(1.0, 1.0, -3.0), 0.0), None);
        // Misses entirely
        assert_eq!(tri.sweep_sphere(Vec3::new(10.0, 10.0, 3.0), Vec3::new(10.0, 10.0, -3.0), 0.5), None);
    }
}
