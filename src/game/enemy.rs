//! Enemy AI
//!
//! One state machine per enemy:
//!
//! ```text
//! Wandering ──(player within home radius)──> AlertedBounce ──(grounded)──> AlertedCharge
//!     │                                                                          │
//!     └──(wander timeout)──> Resting <──────────────(grounded)───────────────────┘
//!                               │
//!                               └──(rest timeout)──> Wandering
//! ```
//!
//! `Hovering` and `BrainDead` never leave their state on their own.
//! Physics for enemies runs in the generic body pass before this system;
//! the AI reads the resulting `BodyState` and writes new velocities for the
//! next tick.
//!
//! Thrown enemies are a separate sub-lifecycle: plain straight-line motion
//! until they get close enough to terrain, then they turn back into an
//! ordinary enemy at their recorded respawn position.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use log::{debug, warn};

use super::components::{AiState, BodyState, EnemyAi, SphericalBody};
use super::dynamics::UP;
use super::entity::{EntityError, EntityId};
use super::event::{DamageEvent, Events};
use super::noise::value_noise;
use super::runtime::SimContext;
use super::transform::Transform;
use super::world::World;
use crate::config::{EnemySettings, SimConfig};
use crate::geometry::Terrain;

/// Noise lattice cells per second of world time for wander steering
const WANDER_NOISE_RATE: f64 = 0.5;

/// The player as seen by the AI this tick.
#[derive(Debug, Clone, Copy)]
struct Target {
    id: EntityId,
    position: Vec3,
    radius: f32,
}

/// Run every enemy's state machine, keep physical enemies leashed to home
/// and raise damage for enemies touching the player.
pub fn update_enemies(world: &mut World, events: &mut Events, ctx: &SimContext, config: &SimConfig, dt: f32) {
    let settings = &config.enemy;
    let target = world.player().and_then(|id| {
        let position = world.position(id)?;
        let radius = world.bodies.get(id).map_or(config.player.radius, |b| b.radius);
        Some(Target { id, position, radius })
    });

    for id in world.enemies.ids() {
        let (Some(mut ai), Some(mut body), Some(mut transform)) = (
            world.enemies.get(id).copied(),
            world.bodies.get(id).copied(),
            world.transforms.get(id).copied(),
        ) else {
            warn!("enemy {} is missing its body or transform, skipping", id);
            continue;
        };

        think(id, &mut ai, &mut body, &transform, target, ctx, settings, dt);

        if ai.is_physical() {
            contain_home(&ai, &mut transform.position, settings.home_radius);
        }
        transform.face_towards(ai.facing);

        if let Some(target) = target {
            if transform.position.distance(target.position) < target.radius + body.radius {
                events.damage.send(DamageEvent { target: target.id, source: Some(id), amount: settings.damage });
            }
        }

        world.enemies.insert(id, ai);
        world.bodies.insert(id, body);
        world.transforms.insert(id, transform);
    }
}

#[allow(clippy::too_many_arguments)]
fn think(
    id: EntityId,
    ai: &mut EnemyAi,
    body: &mut SphericalBody,
    transform: &Transform,
    target: Option<Target>,
    ctx: &SimContext,
    settings: &EnemySettings,
    dt: f32,
) {
    let now = ctx.time;
    let position = transform.position;

    match ai.state {
        AiState::Wandering => {
            let spotted = target.filter(|t| t.position.distance(position) < settings.home_radius);
            if let Some(target) = spotted {
                ai.facing = (target.position - position).truncate().normalize_or(ai.facing);
                body.set_horizontal_velocity(Vec2::ZERO);
                body.velocity.z = settings.jump_speed;
                body.state = BodyState::Falling;
                ai.home = position;
                ai.enter(AiState::AlertedBounce, now);
                debug!("enemy {} spotted player {}", id, target.id);
            } else if ai.time_in_state(now) >= f64::from(settings.wander_duration) {
                body.set_horizontal_velocity(Vec2::ZERO);
                ai.enter(AiState::Resting, now);
                debug!("enemy {} resting", id);
            } else {
                let turn = value_noise(ctx.seed, id, now * WANDER_NOISE_RATE) * settings.wander_turn_rate * dt;
                ai.facing = Vec2::from_angle(turn).rotate(ai.facing).normalize_or(Vec2::Y);
                body.set_horizontal_velocity(ai.facing * settings.wander_speed);
            }
        }
        AiState::AlertedBounce => {
            if body.is_grounded() {
                let lunge = ai.facing * settings.lunge_speed;
                body.set_horizontal_velocity(body.horizontal_velocity() + lunge);
                body.velocity.z = settings.jump_speed * settings.lunge_lift;
                body.state = BodyState::Falling;
                ai.enter(AiState::AlertedCharge, now);
                debug!("enemy {} charging", id);
            }
        }
        AiState::AlertedCharge => {
            ai.home = position;
            if body.is_grounded() {
                body.velocity = Vec3::ZERO;
                ai.enter(AiState::Resting, now);
                debug!("enemy {} landed, resting", id);
            }
        }
        AiState::Resting => {
            body.set_horizontal_velocity(Vec2::ZERO);
            if ai.time_in_state(now) >= f64::from(settings.rest_duration) {
                ai.enter(AiState::Wandering, now);
            }
        }
        AiState::BrainDead => {
            body.set_horizontal_velocity(Vec2::ZERO);
        }
        AiState::Hovering => {}
    }
}

/// Pull a position back onto the home circle (horizontal plane) if it
/// strayed beyond `radius`.
fn contain_home(ai: &EnemyAi, position: &mut Vec3, radius: f32) {
    let offset = (*position - ai.home).truncate();
    let distance = offset.length();
    if distance > radius {
        let pulled = ai.home.truncate() + offset * (radius / distance);
        position.x = pulled.x;
        position.y = pulled.y;
    }
}

/// Place hovering enemies on their sinusoid above home.
pub fn position_hovering(world: &mut World, ctx: &SimContext, settings: &EnemySettings) {
    let phase = (TAU as f64 * f64::from(settings.hover_frequency) * ctx.time).sin() as f32;
    for (id, ai) in world.enemies.iter() {
        if ai.state != AiState::Hovering {
            continue;
        }
        let Some(transform) = world.transforms.get_mut(id) else {
            warn!("hovering enemy {} has no transform", id);
            continue;
        };
        transform.position = ai.home + UP * (settings.hover_amplitude * phase);
        if let Some(body) = world.bodies.get_mut(id) {
            body.velocity = Vec3::ZERO;
        }
    }
}

/// Straight-line motion for velocity-only entities (thrown enemies).
pub fn integrate_velocities(world: &mut World, dt: f32) {
    for (id, velocity) in world.velocities.iter() {
        match world.transforms.get_mut(id) {
            Some(transform) => transform.translate(velocity.0 * dt),
            None => warn!("entity {} has a velocity but no transform", id),
        }
    }
}

/// Turn thrown enemies that reached terrain back into ordinary enemies.
pub fn resolve_thrown_enemies(
    world: &mut World,
    terrain: &Terrain,
    ctx: &SimContext,
    config: &SimConfig,
) -> Result<(), EntityError> {
    for id in world.thrown.ids() {
        let (Some(thrown), Some(position)) = (world.thrown.get(id).copied(), world.position(id)) else {
            warn!("thrown enemy {} has no transform, skipping", id);
            continue;
        };
        let Some(contact) = terrain.closest_point(position) else {
            continue;
        };
        if position.distance(contact) < thrown.radius * config.thrown.contact_fraction {
            world.despawn(id);
            let enemy = world.spawn_enemy(thrown.respawn_position, thrown.restore_state, config, ctx.time)?;
            debug!("thrown enemy {} landed, respawned as {}", id, enemy);
        }
    }
    Ok(())
}
