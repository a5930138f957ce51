//! Terrain fixtures shared by the game system tests.

use glam::Vec3;

use crate::geometry::{Terrain, Triangle, TriangleMesh};

/// Quad from four corners; normal follows the a→b→c winding.
pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> TriangleMesh {
    TriangleMesh::new(vec![Triangle::new(a, b, c), Triangle::new(a, c, d)])
}

/// Square floor of half-size `s` at height `z`, normal +Z.
pub fn floor(z: f32, s: f32) -> TriangleMesh {
    quad(
        Vec3::new(-s, -s, z),
        Vec3::new(s, -s, z),
        Vec3::new(s, s, z),
        Vec3::new(-s, s, z),
    )
}

/// Floor patch covering `[x0, x1] × [-s, s]` at height `z`, normal +Z.
pub fn floor_strip(x0: f32, x1: f32, z: f32, s: f32) -> TriangleMesh {
    quad(
        Vec3::new(x0, -s, z),
        Vec3::new(x1, -s, z),
        Vec3::new(x1, s, z),
        Vec3::new(x0, s, z),
    )
}

/// Ceiling at height `z`, normal -Z.
pub fn ceiling(z: f32, s: f32) -> TriangleMesh {
    quad(
        Vec3::new(-s, -s, z),
        Vec3::new(-s, s, z),
        Vec3::new(s, s, z),
        Vec3::new(s, -s, z),
    )
}

/// Vertical wall in the plane `x = x`, normal -X (facing the origin side
/// when `x > 0`).
pub fn wall_facing_neg_x(x: f32, s: f32) -> TriangleMesh {
    quad(
        Vec3::new(x, -s, -s),
        Vec3::new(x, -s, s),
        Vec3::new(x, s, s),
        Vec3::new(x, s, -s),
    )
}

/// Vertical wall in the plane `x = x`, normal +X.
pub fn wall_facing_pos_x(x: f32, s: f32) -> TriangleMesh {
    quad(
        Vec3::new(x, -s, -s),
        Vec3::new(x, s, -s),
        Vec3::new(x, s, s),
        Vec3::new(x, -s, s),
    )
}

pub fn flat_ground() -> Terrain {
    Terrain::from_pieces(vec![floor(0.0, 100.0)])
}

#[test]
fn test_fixture_normals() {
    let up = floor(0.0, 1.0).triangles()[0].normal();
    assert!(up.abs_diff_eq(Vec3::Z, 1e-6));
    let down = ceiling(2.0, 1.0).triangles()[1].normal();
    assert!(down.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    let neg_x = wall_facing_neg_x(1.0, 1.0).triangles()[1].normal();
    assert!(neg_x.abs_diff_eq(Vec3::NEG_X, 1e-6));
    let pos_x = wall_facing_pos_x(0.0, 1.0).triangles()[0].normal();
    assert!(pos_x.abs_diff_eq(Vec3::X, 1e-6));
}
