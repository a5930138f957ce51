//! Simulation tuning
//!
//! Every tunable constant of the physics, player, enemy and camera logic
//! lives in `SimConfig`. It is stored as RON (Rusty Object Notation) so
//! designers can tweak values without recompiling. Every section carries
//! `#[serde(default)]`, so a file only needs the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// World physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Gravity magnitude (units/s²), applied along -Z
    pub gravity: f32,
    /// Lower bound on vertical velocity (negative)
    pub terminal_velocity: f32,
    /// Extra reach of the grounded downward probe beyond the radius
    pub probe_margin: f32,
    /// Contact normals with `dot(up) >= floor_threshold` are floors
    pub floor_threshold: f32,
    /// Contact normals with `dot(up) < ceiling_threshold` are ceilings
    pub ceiling_threshold: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 19.6,               // Two g's
            terminal_velocity: -100_000.0,
            probe_margin: 0.1,
            floor_threshold: 0.5,
            ceiling_threshold: -0.1,
        }
    }
}

/// Player movement and mechanics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub radius: f32,
    pub acceleration: f32,
    /// Blend rate toward zero horizontal speed when idle on the ground
    pub deceleration: f32,
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub jump_speed: f32,
    /// Gravity multiplier once the jump button is released
    pub heavy_fall_scale: f32,
    pub max_health: i32,
    /// Seconds of damage immunity after a hit
    pub invulnerability: f32,
    /// Blink half-period while invulnerable (seconds)
    pub blink_period: f32,
    /// Falling below this height respawns the player
    pub death_plane: f32,
    /// Seconds for a vortex charge to reach full radius
    pub vortex_travel_time: f32,
    pub vortex_max_radius: f32,
    /// Launch speed of a thrown enemy
    pub throw_speed: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            radius: 0.6,
            acceleration: 60.0,
            deceleration: 10.0,
            move_speed: 6.0,
            sprint_speed: 10.0,
            jump_speed: 9.0,
            heavy_fall_scale: 2.2,
            max_health: 3,
            invulnerability: 1.5,
            blink_period: 0.1,
            death_plane: -50.0,
            vortex_travel_time: 0.5,
            vortex_max_radius: 3.0,
            throw_speed: 25.0,
        }
    }
}

/// Enemy behavior tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub radius: f32,
    /// Leash radius around the home anchor, also the alert distance
    pub home_radius: f32,
    pub jump_speed: f32,
    pub lunge_speed: f32,
    /// Vertical impulse of the lunge as a fraction of `jump_speed`
    pub lunge_lift: f32,
    pub wander_speed: f32,
    /// Maximum wander turn rate (radians/s)
    pub wander_turn_rate: f32,
    pub wander_duration: f32,
    pub rest_duration: f32,
    pub hover_amplitude: f32,
    /// Hover oscillation frequency (Hz)
    pub hover_frequency: f32,
    /// Damage dealt on contact with the player
    pub damage: i32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            radius: 0.5,
            home_radius: 4.0,
            jump_speed: 6.0,
            lunge_speed: 20.0,
            lunge_lift: 0.5,
            wander_speed: 2.0,
            wander_turn_rate: 2.0,
            wander_duration: 5.0,
            rest_duration: 0.75,
            hover_amplitude: 0.5,
            hover_frequency: 1.0,
            damage: 1,
        }
    }
}

/// Thrown enemy projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrownSettings {
    pub radius: f32,
    /// Lands once terrain is within `radius * contact_fraction`
    pub contact_fraction: f32,
}

impl Default for ThrownSettings {
    fn default() -> Self {
        Self { radius: 0.5, contact_fraction: 0.8 }
    }
}

/// Coin pickups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSettings {
    pub radius: f32,
    /// Spin animation speed (radians/s)
    pub spin_speed: f32,
}

impl Default for CoinSettings {
    fn default() -> Self {
        Self { radius: 0.5, spin_speed: 3.0 }
    }
}

/// Third-person camera boom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Radius of the sphere swept along the boom
    pub probe_radius: f32,
    pub distance: f32,
    /// Look-at height above the player center
    pub height: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self { probe_radius: 0.3, distance: 6.0, height: 2.0 }
    }
}

/// All simulation tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsSettings,
    pub player: PlayerSettings,
    pub enemy: EnemySettings,
    pub thrown: ThrownSettings,
    pub coin: CoinSettings,
    pub camera: CameraSettings,
}

impl SimConfig {
    /// Load and validate a RON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Reject values that would break the integrator or state machines.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        require_finite("physics.gravity", p.gravity)?;
        require(p.terminal_velocity < 0.0, "physics.terminal_velocity must be negative")?;
        require_non_negative("physics.probe_margin", p.probe_margin)?;
        require(
            p.ceiling_threshold < p.floor_threshold,
            "physics.ceiling_threshold must be below physics.floor_threshold",
        )?;

        let pl = &self.player;
        require_positive("player.radius", pl.radius)?;
        require_non_negative("player.acceleration", pl.acceleration)?;
        require_non_negative("player.deceleration", pl.deceleration)?;
        require_positive("player.move_speed", pl.move_speed)?;
        require(pl.sprint_speed >= pl.move_speed, "player.sprint_speed must be at least player.move_speed")?;
        require_non_negative("player.jump_speed", pl.jump_speed)?;
        require_non_negative("player.heavy_fall_scale", pl.heavy_fall_scale)?;
        require(pl.max_health > 0, "player.max_health must be positive")?;
        require_non_negative("player.invulnerability", pl.invulnerability)?;
        require_non_negative("player.blink_period", pl.blink_period)?;
        require_finite("player.death_plane", pl.death_plane)?;
        require_positive("player.vortex_travel_time", pl.vortex_travel_time)?;
        require_non_negative("player.vortex_max_radius", pl.vortex_max_radius)?;
        require_non_negative("player.throw_speed", pl.throw_speed)?;

        let e = &self.enemy;
        require_positive("enemy.radius", e.radius)?;
        require_positive("enemy.home_radius", e.home_radius)?;
        require_non_negative("enemy.jump_speed", e.jump_speed)?;
        require_non_negative("enemy.lunge_speed", e.lunge_speed)?;
        require_non_negative("enemy.lunge_lift", e.lunge_lift)?;
        require_non_negative("enemy.wander_speed", e.wander_speed)?;
        require_non_negative("enemy.wander_turn_rate", e.wander_turn_rate)?;
        require_non_negative("enemy.wander_duration", e.wander_duration)?;
        require_non_negative("enemy.rest_duration", e.rest_duration)?;
        require_finite("enemy.hover_amplitude", e.hover_amplitude)?;
        require_non_negative("enemy.hover_frequency", e.hover_frequency)?;
        require(e.damage >= 0, "enemy.damage must not be negative")?;

        require_positive("thrown.radius", self.thrown.radius)?;
        require(
            self.thrown.contact_fraction > 0.0 && self.thrown.contact_fraction <= 1.0,
            "thrown.contact_fraction must be in (0, 1]",
        )?;
        require_positive("coin.radius", self.coin.radius)?;
        require_finite("coin.spin_speed", self.coin.spin_speed)?;
        require_positive("camera.probe_radius", self.camera.probe_radius)?;
        require_non_negative("camera.distance", self.camera.distance)?;
        require_finite("camera.height", self.camera.height)?;
        Ok(())
    }
}

fn require(ok: bool, message: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

fn require_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    require(value.is_finite(), &format!("{} must be finite (got {})", name, value))
}

fn require_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    require(value.is_finite() && value > 0.0, &format!("{} must be positive (got {})", name, value))
}

fn require_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    require(value.is_finite() && value >= 0.0, &format!("{} must not be negative (got {})", name, value))
}
