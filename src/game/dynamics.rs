//! Dynamics Integrator
//!
//! Advances one spherical body against static terrain for one tick.
//! Each body is in one of two states:
//!
//! - `Falling`: integrate gravity (clamped at terminal velocity), move
//!   along the velocity, resolve contacts at the end of the motion.
//! - `Grounded`: move horizontally only, resolve walls, then run a short
//!   downward "bump" probe that glues the body to sloped or stepped ground.
//!   If the probe finds no floor the body starts falling.
//!
//! Contact resolution is continuous along the motion interval: if the
//! center path itself crosses a triangle the body is put back on the near
//! side; otherwise the closest terrain point to the interval end decides
//! whether the sphere overlaps anything, and the contact normal classifies
//! the overlap as floor, ceiling or wall.
//!
//! Only the controllers may force a state change from outside (setting
//! `Falling` to start a jump); everything else happens here.

use glam::{Vec2, Vec3};
use log::{trace, warn};

use super::components::{BodyState, CollisionOutcome, SphericalBody};
use super::transform::Transform;
use super::world::World;
use crate::config::PhysicsSettings;
use crate::geometry::{Segment, Terrain};

/// World up. Gravity points the other way.
pub const UP: Vec3 = Vec3::Z;

/// Below this separation the contact direction is unreliable and the face
/// normal is used instead.
const CONTACT_EPSILON: f32 = 1e-6;

/// How a contact normal is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Floor,
    Ceiling,
    Wall,
}

pub fn classify_contact(normal: Vec3, physics: &PhysicsSettings) -> ContactKind {
    let up = normal.dot(UP);
    if up >= physics.floor_threshold {
        ContactKind::Floor
    } else if up < physics.ceiling_threshold {
        ContactKind::Ceiling
    } else {
        ContactKind::Wall
    }
}

pub fn gravity_vector(physics: &PhysicsSettings) -> Vec3 {
    -UP * physics.gravity
}

/// Advance one body by `dt` and record the outcome on it.
pub fn step_body(
    body: &mut SphericalBody,
    transform: &mut Transform,
    terrain: &Terrain,
    physics: &PhysicsSettings,
    dt: f32,
) -> CollisionOutcome {
    let outcome = match body.state {
        BodyState::Falling => fall(body, transform, terrain, physics, dt),
        BodyState::Grounded => walk(body, transform, terrain, physics, dt),
    };
    body.last_outcome = outcome;
    outcome
}

/// Step every simulated body that no other system drives: the player
/// moves through its controller and hovering enemies are positioned
/// directly.
pub fn step_bodies(world: &mut World, terrain: &Terrain, physics: &PhysicsSettings, dt: f32) {
    for (id, body) in world.bodies.iter_mut() {
        if world.controllers.contains(id) {
            continue;
        }
        if world.enemies.get(id).map_or(false, |ai| !ai.is_physical()) {
            continue;
        }
        let Some(transform) = world.transforms.get_mut(id) else {
            warn!("body {} has no transform, skipping", id);
            continue;
        };
        step_body(body, transform, terrain, physics, dt);
    }
}

fn fall(
    body: &mut SphericalBody,
    transform: &mut Transform,
    terrain: &Terrain,
    physics: &PhysicsSettings,
    dt: f32,
) -> CollisionOutcome {
    body.velocity += gravity_vector(physics) * (body.gravity_scale * dt);
    body.velocity.z = body.velocity.z.max(physics.terminal_velocity);

    let start = transform.position;
    let end = start + body.velocity * dt;
    let (position, outcome) = resolve_motion(body, start, end, terrain, physics);
    transform.position = position;
    outcome
}

fn walk(
    body: &mut SphericalBody,
    transform: &mut Transform,
    terrain: &Terrain,
    physics: &PhysicsSettings,
    dt: f32,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::None;

    let horizontal = body.horizontal_velocity();
    if horizontal != Vec2::ZERO {
        let start = transform.position;
        let end = start + horizontal.extend(0.0) * dt;
        let (position, hit) = resolve_motion(body, start, end, terrain, physics);
        transform.position = position;
        outcome = hit;
    }

    match ground_probe(transform.position, body.radius, terrain, physics) {
        Some(ground) => {
            transform.position = ground + UP * body.radius;
            body.velocity.z = 0.0;
            body.state = BodyState::Grounded;
            CollisionOutcome::Bump
        }
        None => {
            trace!("ground probe missed at {:?}, falling", transform.position);
            body.state = BodyState::Falling;
            match outcome {
                CollisionOutcome::HitCeiling => CollisionOutcome::HitCeiling,
                _ => CollisionOutcome::None,
            }
        }
    }
}

/// Resolve the motion `start → end` against terrain.
/// Returns the corrected position; may zero vertical velocity and ground
/// the body.
fn resolve_motion(
    body: &mut SphericalBody,
    start: Vec3,
    end: Vec3,
    terrain: &Terrain,
    physics: &PhysicsSettings,
) -> (Vec3, CollisionOutcome) {
    let motion = Segment::new(start, end);

    // The center itself passed through a triangle
    if let Some(hit) = terrain.intersect_segment_with_normal(&motion) {
        let normal = facing_against(hit.normal, motion.direction());
        body.velocity.z = 0.0;
        body.state = BodyState::Grounded;
        trace!("center path crossed terrain at t={:.3}, normal {:?}", hit.t, normal);
        return (hit.point + normal * body.radius, CollisionOutcome::HitFloor);
    }

    let Some(contact) = terrain.closest_point_with_normal(end) else {
        return (end, CollisionOutcome::None);
    };
    let offset = end - contact.point;
    let distance = offset.length();
    if distance >= body.radius {
        return (end, CollisionOutcome::None);
    }

    let normal = if distance > CONTACT_EPSILON { offset / distance } else { contact.normal };
    let corrected = end + normal * (body.radius - distance);

    match classify_contact(normal, physics) {
        ContactKind::Floor => {
            body.velocity.z = 0.0;
            body.state = BodyState::Grounded;
            trace!("floor contact at {:?}", contact.point);
            (corrected, CollisionOutcome::HitFloor)
        }
        ContactKind::Ceiling => {
            body.velocity.z = 0.0;
            trace!("ceiling contact at {:?}", contact.point);
            (corrected, CollisionOutcome::HitCeiling)
        }
        ContactKind::Wall => {
            trace!("wall contact at {:?}", contact.point);
            (corrected, CollisionOutcome::None)
        }
    }
}

/// Downward probe under a grounded body. Returns the floor point hit, if
/// the surface there counts as floor.
fn ground_probe(position: Vec3, radius: f32, terrain: &Terrain, physics: &PhysicsSettings) -> Option<Vec3> {
    let probe = Segment::new(position, position - UP * (radius + physics.probe_margin));
    let hit = terrain.intersect_segment_with_normal(&probe)?;
    let normal = facing_against(hit.normal, probe.direction());
    (classify_contact(normal, physics) == ContactKind::Floor).then_some(hit.point)
}

/// Flip a two-sided triangle normal to face back along `direction`.
fn facing_against(normal: Vec3, direction: Vec3) -> Vec3 {
    if normal.dot(direction) > 0.0 {
        -normal
    } else {
        normal
    }
}
