//! Deterministic 1D value noise for AI steering.
//!
//! Lattice values are drawn from a `StdRng` seeded by (world seed, entity
//! id, lattice index), then blended with a smoothstep. Same seed and same
//! id always produce the same curve, independent of how many other
//! entities exist or in which order they are updated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::entity::EntityId;

/// Smooth noise in `[-1, 1]` sampled at `t`.
pub fn value_noise(seed: u64, entity: EntityId, t: f64) -> f32 {
    let cell = t.floor();
    let frac = (t - cell) as f32;
    let i = cell as i64;

    let v0 = lattice(seed, entity, i);
    let v1 = lattice(seed, entity, i.wrapping_add(1));
    let s = frac * frac * (3.0 - 2.0 * frac);
    v0 + (v1 - v0) * s
}

fn lattice(seed: u64, entity: EntityId, index: i64) -> f32 {
    let key = mix(seed ^ mix(u64::from(entity.raw()) ^ mix(index as u64)));
    StdRng::seed_from_u64(key).gen_range(-1.0..=1.0)
}

/// splitmix64 finalizer
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
