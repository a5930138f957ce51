//! Simulation Runtime
//!
//! Owns the world, the baked terrain, the event queues and the simulation
//! context, and runs the systems in their fixed per-tick order:
//!
//! 1. Character controller (runs the player's own dynamics step)
//! 2. Coin animation
//! 3. Velocity-only integration (thrown enemies)
//! 4. Thrown-enemy terrain contact and respawn
//! 5. Dynamics for every other body
//! 6. Enemy AI
//! 7. Hovering enemy placement
//! 8. Damage consumption
//!
//! Damage raised by the AI in step 6 is only readable after the end-of-tick
//! promote, so it is applied in step 8 of the *next* tick. The
//! invulnerability window timing depends on this one-tick delay.

use std::path::Path;

use glam::{Quat, Vec3};
use log::{debug, info, warn};
use thiserror::Error;

use super::camera;
use super::controller;
use super::dynamics;
use super::enemy;
use super::entity::{EntityError, EntityId};
use super::event::{Events, RespawnEvent, SoundCue};
use super::world::World;
use crate::config::{CoinSettings, ConfigError, SimConfig};
use crate::geometry::Terrain;
use crate::input::{Axis, InputFrame, Verb};
use crate::level::{load_level, LevelData, LevelError};

/// Anything that can stop the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Per-run state threaded through every system.
/// Created at scene load, reset on level reload.
#[derive(Debug, Clone, PartialEq)]
pub struct SimContext {
    /// Seed for all deterministic noise
    pub seed: u64,
    /// Simulated seconds since level load
    pub time: f64,
    /// Ticks run since level load
    pub tick: u64,
    /// While set, frames skip the tick entirely
    pub paused: bool,
    /// Run exactly one tick on the next paused frame
    pub step_requested: bool,
    /// Yaw of the active camera, for view-relative movement
    pub camera_yaw: f32,
}

impl SimContext {
    pub fn new(seed: u64) -> Self {
        Self { seed, time: 0.0, tick: 0, paused: false, step_requested: false, camera_yaw: 0.0 }
    }

    /// Back to time zero; seed and camera are kept.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.tick = 0;
        self.paused = false;
        self.step_requested = false;
    }
}

/// The simulation core: one instance per loaded level.
pub struct Simulation {
    pub world: World,
    pub terrain: Terrain,
    pub events: Events,
    pub context: SimContext,
    pub config: SimConfig,
    /// Where the player (re)spawns
    pub spawn_point: Vec3,
}

impl Simulation {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            world: World::new(),
            terrain: Terrain::new(),
            events: Events::new(),
            context: SimContext::new(seed),
            config,
            spawn_point: Vec3::ZERO,
        }
    }

    /// Build a simulation from a RON config file.
    pub fn from_config_file<P: AsRef<Path>>(path: P, seed: u64) -> Result<Self, SimError> {
        Ok(Self::new(SimConfig::load(path)?, seed))
    }

    /// Load a level file (plain or compressed RON) and start it.
    pub fn load_level_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SimError> {
        let level = load_level(path)?;
        self.load_level(&level)
    }

    /// Replace the whole scene with a level: bake its terrain and spawn the
    /// player, enemies and coins.
    pub fn load_level(&mut self, level: &LevelData) -> Result<(), SimError> {
        self.world.reset();
        self.events.clear_all();
        self.context.reset();
        self.terrain = level.bake_terrain();
        self.spawn_point = level.spawn_point;

        self.world.spawn_player(level.spawn_point, &self.config)?;
        for spawn in &level.enemies {
            self.world.spawn_enemy(spawn.position, spawn.state, &self.config, self.context.time)?;
        }
        for &coin in &level.coins {
            self.world.spawn_coin(coin, &self.config)?;
        }

        info!(
            "level loaded: {} triangles, {} enemies, {} coins",
            self.terrain.triangle_count(),
            level.enemies.len(),
            level.coins.len()
        );
        Ok(())
    }

    /// Host entry point for one frame: handles pause and single-step, then
    /// runs at most one tick. Returns whether a tick ran.
    pub fn frame(&mut self, input: &InputFrame, dt: f32) -> Result<bool, SimError> {
        self.context.camera_yaw = input.axis(Axis::CameraYaw);

        if input.just_pressed(Verb::Pause) {
            self.context.paused = !self.context.paused;
            info!("simulation {}", if self.context.paused { "paused" } else { "resumed" });
        }

        if self.context.paused {
            if input.just_pressed(Verb::Step) {
                self.context.step_requested = true;
            }
            if !self.context.step_requested {
                return Ok(false);
            }
            self.context.step_requested = false;
            debug!("single step at tick {}", self.context.tick);
        }

        self.tick(input, dt)?;
        Ok(true)
    }

    /// Ask for one tick on the next paused frame.
    pub fn request_step(&mut self) {
        self.context.step_requested = true;
    }

    /// Run every system once, in order.
    pub fn tick(&mut self, input: &InputFrame, dt: f32) -> Result<(), SimError> {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("ignoring tick with dt = {}", dt);
            return Ok(());
        }
        self.context.time += f64::from(dt);
        self.context.tick += 1;

        // Host-facing queues only carry the latest tick
        self.events.sounds.clear();
        self.events.respawn.clear();

        // =====================================================================
        // Player
        // =====================================================================
        controller::update_player(
            &mut self.world,
            &self.terrain,
            &mut self.events,
            &self.context,
            input,
            &self.config,
            self.spawn_point,
            dt,
        )?;

        spin_coins(&mut self.world, &self.config.coin, dt);

        // =====================================================================
        // Projectiles and bodies
        // =====================================================================
        enemy::integrate_velocities(&mut self.world, dt);
        enemy::resolve_thrown_enemies(&mut self.world, &self.terrain, &self.context, &self.config)?;
        dynamics::step_bodies(&mut self.world, &self.terrain, &self.config.physics, dt);

        // =====================================================================
        // Enemies
        // =====================================================================
        enemy::update_enemies(&mut self.world, &mut self.events, &self.context, &self.config, dt);
        enemy::position_hovering(&mut self.world, &self.context, &self.config.enemy);

        // =====================================================================
        // Damage (raised last tick)
        // =====================================================================
        controller::consume_damage(&mut self.world, &mut self.events, &self.context, &self.config);
        self.events.damage.promote();

        Ok(())
    }

    /// Sound requests raised by the most recent tick, in order. Requests
    /// not drained before the next tick are dropped.
    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        self.events.sounds.drain().collect()
    }

    /// Respawns of the most recent tick.
    pub fn drain_respawns(&mut self) -> Vec<RespawnEvent> {
        self.events.respawn.drain().collect()
    }

    pub fn player(&self) -> Option<EntityId> {
        self.world.player()
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.world.position(self.player()?)
    }

    /// Whether the player should be drawn this frame (invulnerability blink).
    pub fn player_visible(&self) -> bool {
        let settings = &self.config.player;
        self.player()
            .and_then(|p| self.world.controllers.get(p))
            .map_or(true, |c| c.blink_visible(self.context.time, settings.invulnerability, settings.blink_period))
    }

    /// Third-person camera position following the player.
    pub fn camera_position(&self) -> Option<Vec3> {
        let target = self.player_position()?;
        Some(camera::camera_position(&self.terrain, target, self.context.camera_yaw, &self.config.camera))
    }
}

fn spin_coins(world: &mut World, settings: &CoinSettings, dt: f32) {
    let spin = Quat::from_rotation_z(settings.spin_speed * dt);
    for (id, _) in world.coins.iter() {
        if let Some(transform) = world.transforms.get_mut(id) {
            transform.rotation = (spin * transform.rotation).normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{AiState, ThrownEnemy};
    use crate::level::{EnemySpawn, Placement, TerrainPiece};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn flat_level() -> LevelData {
        let s = 50.0;
        LevelData {
            spawn_point: Vec3::new(0.0, 0.0, 0.6),
            terrain: vec![TerrainPiece {
                triangles: vec![
                    [Vec3::new(-s, -s, 0.0), Vec3::new(s, -s, 0.0), Vec3::new(s, s, 0.0)],
                    [Vec3::new(-s, -s, 0.0), Vec3::new(s, s, 0.0), Vec3::new(-s, s, 0.0)],
                ],
                placement: Placement::default(),
            }],
            enemies: vec![],
            coins: vec![],
        }
    }

    fn sim_with(level: &LevelData, seed: u64) -> Simulation {
        let mut sim = Simulation::new(SimConfig::default(), seed);
        sim.load_level(level).unwrap();
        sim
    }

    fn health(sim: &Simulation) -> i32 {
        sim.world.controllers.get(sim.player().unwrap()).unwrap().health
    }

    #[test]
    fn test_load_level_spawns_everything() {
        let mut level = flat_level();
        level.enemies.push(EnemySpawn { position: Vec3::new(10.0, 0.0, 0.5), state: AiState::Wandering });
        level.enemies.push(EnemySpawn { position: Vec3::new(-10.0, 0.0, 3.0), state: AiState::Hovering });
        level.coins.push(Vec3::new(5.0, 5.0, 0.5));
        let mut sim = sim_with(&level, 1);

        assert_eq!(sim.world.entity_count(), 4);
        assert_eq!(sim.world.enemies.count(), 2);
        assert_eq!(sim.world.coins.count(), 1);
        assert_eq!(sim.terrain.triangle_count(), 2);
        assert_eq!(sim.player_position(), Some(level.spawn_point));

        // Reloading starts over
        sim.tick(&InputFrame::new(), DT).unwrap();
        sim.load_level(&level).unwrap();
        assert_eq!(sim.world.entity_count(), 4);
        assert_eq!(sim.context.tick, 0);
        assert_eq!(sim.context.time, 0.0);
    }

    #[test]
    fn test_damage_lands_one_tick_after_contact() {
        let mut level = flat_level();
        level.enemies.push(EnemySpawn { position: Vec3::new(0.5, 0.0, 0.5), state: AiState::BrainDead });
        let mut sim = sim_with(&level, 2);
        let input = InputFrame::new();

        sim.tick(&input, DT).unwrap();
        assert_eq!(health(&sim), 3, "contact tick only raises the event");
        assert_eq!(sim.events.damage.ready_len(), 1);

        sim.tick(&input, DT).unwrap();
        assert_eq!(health(&sim), 2);
        assert_eq!(sim.drain_sounds(), vec![SoundCue::Hurt]);

        // Still touching, but invulnerable
        for _ in 0..10 {
            sim.tick(&input, DT).unwrap();
        }
        assert_eq!(health(&sim), 2);
    }

    #[test]
    fn test_invulnerability_blink() {
        let mut level = flat_level();
        level.enemies.push(EnemySpawn { position: Vec3::new(0.5, 0.0, 0.5), state: AiState::BrainDead });
        let mut sim = sim_with(&level, 3);
        let input = InputFrame::new();

        assert!(sim.player_visible());
        sim.tick(&input, DT).unwrap();
        sim.tick(&input, DT).unwrap();
        // Damage just landed: first blink half-period is hidden
        assert!(!sim.player_visible());
    }

    #[test]
    fn test_pause_and_single_step() {
        let mut sim = sim_with(&flat_level(), 4);
        let mut input = InputFrame::new();

        input.press(Verb::Pause);
        assert!(!sim.frame(&input, DT).unwrap());
        assert!(sim.context.paused);
        input.advance();
        input.release(Verb::Pause);

        assert!(!sim.frame(&input, DT).unwrap());
        assert_eq!(sim.context.tick, 0);

        input.advance();
        input.press(Verb::Step);
        assert!(sim.frame(&input, DT).unwrap());
        assert_eq!(sim.context.tick, 1);
        assert!(sim.context.paused);

        // Holding Step does not keep stepping
        input.advance();
        assert!(!sim.frame(&input, DT).unwrap());
        assert_eq!(sim.context.tick, 1);

        sim.request_step();
        assert!(sim.frame(&input, DT).unwrap());
        assert_eq!(sim.context.tick, 2);

        input.advance();
        input.release(Verb::Step);
        input.press(Verb::Pause);
        assert!(sim.frame(&input, DT).unwrap());
        assert!(!sim.context.paused);
        assert_eq!(sim.context.tick, 3);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut level = flat_level();
        for i in 0..5 {
            level.enemies.push(EnemySpawn {
                position: Vec3::new(i as f32 * 8.0 - 16.0, 20.0, 0.5),
                state: AiState::Wandering,
            });
        }
        let run = |seed| {
            let mut sim = sim_with(&level, seed);
            let mut input = InputFrame::new();
            input.set_axis(Axis::Forward, 1.0);
            for _ in 0..240 {
                sim.tick(&input, DT).unwrap();
                input.advance();
            }
            sim.world.transforms.iter().map(|(_, t)| t.position).collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_coins_spin_and_get_collected() {
        let mut level = flat_level();
        level.coins.push(Vec3::new(0.0, 3.0, 0.6));
        level.coins.push(Vec3::new(20.0, 0.0, 0.6));
        let mut sim = sim_with(&level, 5);
        let far = sim.world.coins.ids()[1];

        let mut input = InputFrame::new();
        input.set_axis(Axis::Forward, 1.0);
        let mut chimes = 0;
        for _ in 0..120 {
            sim.tick(&input, DT).unwrap();
            chimes += sim.drain_sounds().iter().filter(|c| **c == SoundCue::Coin).count();
            input.advance();
        }

        let controller = sim.world.controllers.get(sim.player().unwrap()).unwrap();
        assert_eq!(controller.coins, 1);
        assert_eq!(chimes, 1);
        let spun = sim.world.transforms.get(far).unwrap().rotation;
        assert!(spun.angle_between(Quat::IDENTITY) > 0.1);
    }

    #[test]
    fn test_camera_follows_player() {
        let sim = sim_with(&flat_level(), 6);
        let camera = sim.camera_position().unwrap();
        let player = sim.player_position().unwrap();
        assert_relative_eq!(camera.y, player.y - sim.config.camera.distance, epsilon = 1e-4);
        assert!(camera.z > player.z);
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.ron");
        let level_path = dir.path().join("level.ron");
        SimConfig::default().save(&config_path).unwrap();
        crate::level::save_level(&flat_level(), &level_path).unwrap();

        let mut sim = Simulation::from_config_file(&config_path, 8).unwrap();
        sim.load_level_file(&level_path).unwrap();
        assert_eq!(sim.player_position(), Some(flat_level().spawn_point));

        let missing = sim.load_level_file(dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(SimError::Level(LevelError::Io(_)))));
        assert!(matches!(
            Simulation::from_config_file(dir.path().join("missing.ron"), 0),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_respawn_events_drained() {
        let mut sim = sim_with(&flat_level(), 9);
        let mut input = InputFrame::new();
        input.press(Verb::Reset);
        sim.tick(&input, DT).unwrap();
        let respawns = sim.drain_respawns();
        assert_eq!(respawns.len(), 1);
        assert!(sim.drain_respawns().is_empty());
    }

    #[test]
    fn test_event_queues_hold_last_tick_only() {
        let mut sim = sim_with(&flat_level(), 10);
        let mut input = InputFrame::new();
        input.press(Verb::Reset);
        sim.tick(&input, DT).unwrap();
        assert_eq!(sim.events.respawn.len(), 1);

        // Not drained; Reset still held so no new respawn
        input.advance();
        for _ in 0..50 {
            sim.tick(&input, DT).unwrap();
        }
        assert!(sim.drain_respawns().is_empty());
        assert!(sim.drain_sounds().is_empty());
    }

    #[test]
    fn test_id_exhaustion_aborts_tick() {
        let mut sim = sim_with(&flat_level(), 11);
        let thrown = ThrownEnemy {
            respawn_position: Vec3::new(5.0, 0.0, 0.5),
            radius: 0.5,
            restore_state: AiState::Wandering,
        };
        // Close enough to the ground to land this tick
        let projectile = sim.world.spawn_thrown_enemy(Vec3::new(5.0, 0.0, 0.3), Vec3::ZERO, thrown).unwrap();
        sim.world.skip_ids_to(u32::MAX);

        let result = sim.tick(&InputFrame::new(), DT);
        assert!(matches!(result, Err(SimError::Entity(EntityError::Exhausted(_)))));

        // Nothing half-built: only the player remains, in every table it belongs to
        let player = sim.player().unwrap();
        assert!(!sim.world.is_alive(projectile));
        assert_eq!(sim.world.entity_count(), 1);
        assert!(sim.world.enemies.is_empty());
        assert!(sim.world.thrown.is_empty());
        assert!(sim.world.velocities.is_empty());
        assert_eq!(sim.world.transforms.ids(), vec![player]);
        assert_eq!(sim.world.bodies.ids(), vec![player]);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut sim = sim_with(&flat_level(), 7);
        sim.tick(&InputFrame::new(), f32::NAN).unwrap();
        sim.tick(&InputFrame::new(), 0.0).unwrap();
        assert_eq!(sim.context.tick, 0);
    }
}
