//! Character Controller
//!
//! Turns the input snapshot into player motion and player-driven gameplay:
//! run/sprint with acceleration and idle deceleration, variable-height
//! jumps (heavier gravity once the button is released), the vortex
//! grab-and-throw, coin pickup, respawn and damage.
//!
//! Components are copied out of the world, updated locally and written
//! back at the end, so spawning and despawning other entities mid-update
//! never conflicts with borrows of the player's own tables.

use glam::{Quat, Vec2, Vec3};
use log::{debug, info, trace, warn};

use super::components::{BodyState, CollisionOutcome, HeldEnemy, MoveFlags, ThrownEnemy, Vortex};
use super::dynamics;
use super::entity::{EntityError, EntityId};
use super::event::{Events, RespawnEvent, RespawnReason, SoundCue};
use super::runtime::SimContext;
use super::world::World;
use crate::config::SimConfig;
use crate::geometry::Terrain;
use crate::input::{Axis, Axis2, InputFrame, Verb};

/// One tick of player control. Runs the player's dynamics step itself.
#[allow(clippy::too_many_arguments)]
pub fn update_player(
    world: &mut World,
    terrain: &Terrain,
    events: &mut Events,
    ctx: &SimContext,
    input: &InputFrame,
    config: &SimConfig,
    spawn_point: Vec3,
    dt: f32,
) -> Result<(), EntityError> {
    let Some(player) = world.player() else {
        return Ok(());
    };

    if let Some(reason) = respawn_reason(world, player, input, config) {
        respawn(world, events, player, spawn_point, reason);
        return Ok(());
    }

    let (Some(mut controller), Some(mut body), Some(mut transform)) = (
        world.controllers.get(player).copied(),
        world.bodies.get(player).copied(),
        world.transforms.get(player).copied(),
    ) else {
        warn!("player {} is missing controller, body or transform", player);
        return Ok(());
    };
    let settings = &config.player;

    // Movement intent in view space (x = right, y = forward)
    let mut intent = input.axis2(Axis2::Translate) + Vec2::new(input.axis(Axis::Strafe), input.axis(Axis::Forward));
    controller.flags.set(MoveFlags::MOVING_LEFT, input.is_down(Verb::MoveLeft));
    controller.flags.set(MoveFlags::MOVING_RIGHT, input.is_down(Verb::MoveRight));
    controller.flags.set(MoveFlags::MOVING_BACK, input.is_down(Verb::MoveBack));
    controller.flags.set(MoveFlags::MOVING_FORWARD, input.is_down(Verb::MoveForward));
    if controller.flags.contains(MoveFlags::MOVING_LEFT) {
        intent.x -= 1.0;
    }
    if controller.flags.contains(MoveFlags::MOVING_RIGHT) {
        intent.x += 1.0;
    }
    if controller.flags.contains(MoveFlags::MOVING_BACK) {
        intent.y -= 1.0;
    }
    if controller.flags.contains(MoveFlags::MOVING_FORWARD) {
        intent.y += 1.0;
    }
    let intent = Vec2::from_angle(ctx.camera_yaw).rotate(intent.clamp_length_max(1.0));

    let sprinting = input.is_down(Verb::Sprint);
    controller.flags.set(MoveFlags::SPRINTING, sprinting);
    let target_speed = if sprinting {
        controller.sprint_speed
    } else {
        let t = input.axis(Axis::SprintIntensity);
        controller.move_speed + (controller.sprint_speed - controller.move_speed) * t
    };

    let mut horizontal = body.horizontal_velocity();
    if intent == Vec2::ZERO && body.is_grounded() {
        controller.current_acceleration = Vec3::ZERO;
        horizontal = horizontal.lerp(Vec2::ZERO, (controller.deceleration * dt).min(1.0));
    } else {
        let acceleration = intent * controller.acceleration;
        controller.current_acceleration = acceleration.extend(0.0);
        horizontal = (horizontal + acceleration * dt).clamp_length_max(target_speed);
    }
    body.set_horizontal_velocity(horizontal);
    transform.face_towards(intent);

    // Jump
    if input.just_pressed(Verb::Jump) && body.is_grounded() {
        body.velocity.z = controller.jump_speed;
        body.gravity_scale = 1.0;
        body.state = BodyState::Falling;
        controller.flags.insert(MoveFlags::ALREADY_JUMPED);
        events.sounds.send(SoundCue::Jump);
        trace!("player {} jumped", player);
    } else if input.just_released(Verb::Jump) {
        body.gravity_scale = controller.heavy_fall_scale;
    }

    // Vortex: throw what we hold, or start a charge
    if input.just_pressed(Verb::Shoot) {
        if let Some(held) = controller.held.take() {
            controller.flags.remove(MoveFlags::HOLDING_ENEMY);
            let facing = transform.facing();
            let thrown = ThrownEnemy::new(held, &config.thrown);
            let origin = transform.position + (facing * (body.radius + thrown.radius)).extend(0.0);
            let velocity = (facing * settings.throw_speed).extend(0.0);
            let id = world.spawn_thrown_enemy(origin, velocity, thrown)?;
            events.sounds.send(SoundCue::Shoot);
            debug!("player {} threw enemy as {}", player, id);
        } else if controller.vortex.is_none() {
            controller.vortex = Some(Vortex { elapsed: 0.0 });
        }
    }
    if let Some(mut vortex) = controller.vortex.take() {
        vortex.elapsed += dt;
        let reach = settings.vortex_max_radius * (vortex.elapsed / settings.vortex_travel_time).min(1.0);
        let captured = world
            .enemies
            .iter()
            .find(|(id, _)| world.position(*id).map_or(false, |p| p.distance(transform.position) < reach))
            .map(|(id, ai)| (id, HeldEnemy { respawn_position: ai.home, state: ai.state }));

        if let Some((enemy, held)) = captured {
            world.despawn(enemy);
            controller.held = Some(held);
            controller.flags.insert(MoveFlags::HOLDING_ENEMY);
            debug!("player {} captured enemy {}", player, enemy);
        } else if vortex.elapsed < settings.vortex_travel_time {
            controller.vortex = Some(vortex);
        }
    }

    // Coins
    let picked: Vec<EntityId> = world
        .coins
        .iter()
        .filter(|(id, coin)| {
            world.position(*id).map_or(false, |p| p.distance(transform.position) < body.radius + coin.radius)
        })
        .map(|(id, _)| id)
        .collect();
    for coin in picked {
        world.despawn(coin);
        controller.coins += 1;
        events.sounds.send(SoundCue::Coin);
    }

    let outcome = dynamics::step_body(&mut body, &mut transform, terrain, &config.physics, dt);
    if body.state == BodyState::Grounded {
        controller.flags.remove(MoveFlags::ALREADY_JUMPED);
    }
    trace!("player {} step outcome {:?}", player, outcome);

    world.controllers.insert(player, controller);
    world.bodies.insert(player, body);
    world.transforms.insert(player, transform);
    Ok(())
}

fn respawn_reason(world: &World, player: EntityId, input: &InputFrame, config: &SimConfig) -> Option<RespawnReason> {
    if input.just_pressed(Verb::Reset) {
        return Some(RespawnReason::ResetInput);
    }
    if world.position(player).map_or(false, |p| p.z < config.player.death_plane) {
        return Some(RespawnReason::FellOut);
    }
    if world.controllers.get(player).map_or(false, |c| c.is_dead()) {
        return Some(RespawnReason::Died);
    }
    None
}

/// Put the player back at the spawn point with zero motion and full
/// health. Returns false if the entity is not a complete player.
pub fn respawn(world: &mut World, events: &mut Events, player: EntityId, spawn_point: Vec3, reason: RespawnReason) -> bool {
    let (Some(controller), Some(body), Some(transform)) = (
        world.controllers.get_mut(player),
        world.bodies.get_mut(player),
        world.transforms.get_mut(player),
    ) else {
        warn!("cannot respawn {}: not a complete player", player);
        return false;
    };

    transform.position = spawn_point;
    transform.rotation = Quat::IDENTITY;

    body.velocity = Vec3::ZERO;
    body.state = BodyState::Falling;
    body.gravity_scale = 1.0;
    body.last_outcome = CollisionOutcome::None;

    controller.current_acceleration = Vec3::ZERO;
    controller.set_health(controller.max_health);
    controller.flags = MoveFlags::empty();
    controller.held = None;
    controller.vortex = None;
    controller.last_damage = None;

    events.respawn.send(RespawnEvent { player, reason });
    info!("player {} respawned ({:?})", player, reason);
    true
}

/// Apply damage raised on the previous tick.
pub fn consume_damage(world: &mut World, events: &mut Events, ctx: &SimContext, config: &SimConfig) {
    for damage in events.damage.take_ready() {
        let Some(controller) = world.controllers.get_mut(damage.target) else {
            continue;
        };
        if controller.is_invulnerable(ctx.time, config.player.invulnerability) {
            trace!("{} invulnerable, ignoring damage from {:?}", damage.target, damage.source);
            continue;
        }
        controller.set_health(controller.health - damage.amount);
        controller.last_damage = Some(ctx.time);
        events.sounds.send(SoundCue::Hurt);
        debug!("{} took {} damage, health {}", damage.target, damage.amount, controller.health);
    }
}
