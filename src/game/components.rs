//! Game Components
//!
//! All the component types the simulation core uses.
//! Components are plain data structs - behavior lives in systems.

use glam::{Vec2, Vec3};
use serde::{Serialize, Deserialize};

use crate::config::{EnemySettings, PlayerSettings, ThrownSettings};

// =============================================================================
// Physics / Movement
// =============================================================================

/// Collision mode of a spherical body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyState {
    /// Resting on floor geometry, glued down by the bump probe
    Grounded,
    /// Airborne, integrating gravity
    #[default]
    Falling,
}

/// What the integrator reported for the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionOutcome {
    #[default]
    None,
    /// Grounded body snapped back onto the ground by the downward probe
    Bump,
    HitFloor,
    HitCeiling,
}

/// A physically simulated sphere (player, live enemy, camera probe).
/// Always paired with a `Transform`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalBody {
    pub velocity: Vec3,
    pub radius: f32,
    /// Multiplier on the global gravity constant
    pub gravity_scale: f32,
    pub state: BodyState,
    pub last_outcome: CollisionOutcome,
}

impl SphericalBody {
    pub fn new(radius: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            radius,
            gravity_scale: 1.0,
            state: BodyState::Falling,
            last_outcome: CollisionOutcome::None,
        }
    }

    pub fn with_state(mut self, state: BodyState) -> Self {
        self.state = state;
        self
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    pub fn is_grounded(&self) -> bool {
        self.state == BodyState::Grounded
    }

    pub fn horizontal_velocity(&self) -> Vec2 {
        self.velocity.truncate()
    }

    pub fn set_horizontal_velocity(&mut self, v: Vec2) {
        self.velocity.x = v.x;
        self.velocity.y = v.y;
    }
}

/// Velocity for entities moved by plain integration (no collision response).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

// =============================================================================
// Entity Type Markers
// =============================================================================

/// Marks the player entity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;

/// Marks collectible coins
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coin {
    pub radius: f32,
}

// =============================================================================
// Enemy AI
// =============================================================================

/// Enemy behavior states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    /// Inert: no horizontal motion (thrown or stunned enemies)
    BrainDead,
    /// Roaming around the home anchor, steered by noise
    #[default]
    Wandering,
    /// Short pause between wander bouts
    Resting,
    /// Floating on a sinusoid above home, no physics
    Hovering,
    /// Spotted the player, hopping in place before the lunge
    AlertedBounce,
    /// Lunging toward where the player was
    AlertedCharge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyAi {
    pub state: AiState,
    /// Anchor the enemy is leashed to
    pub home: Vec3,
    /// Horizontal unit facing
    pub facing: Vec2,
    /// World time the current state was entered
    pub state_entered: f64,
}

impl EnemyAi {
    pub fn new(state: AiState, home: Vec3, now: f64) -> Self {
        Self { state, home, facing: Vec2::Y, state_entered: now }
    }

    /// Switch state and restart the state timer.
    pub fn enter(&mut self, state: AiState, now: f64) {
        self.state = state;
        self.state_entered = now;
    }

    pub fn time_in_state(&self, now: f64) -> f64 {
        now - self.state_entered
    }

    /// Hovering enemies are positioned directly, never integrated.
    pub fn is_physical(&self) -> bool {
        self.state != AiState::Hovering
    }
}

/// A held enemy that was thrown; flies until it touches terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrownEnemy {
    /// Where the enemy comes back once the throw lands
    pub respawn_position: Vec3,
    pub radius: f32,
    /// AI state restored on respawn
    pub restore_state: AiState,
}

impl ThrownEnemy {
    pub fn new(held: HeldEnemy, settings: &ThrownSettings) -> Self {
        Self {
            respawn_position: held.respawn_position,
            radius: settings.radius,
            restore_state: held.state,
        }
    }
}

// =============================================================================
// Character Controller
// =============================================================================

bitflags::bitflags! {
    /// Movement and action flags of the character controller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct MoveFlags: u8 {
        const MOVING_LEFT = 0b0000_0001;
        const MOVING_RIGHT = 0b0000_0010;
        const MOVING_BACK = 0b0000_0100;
        const MOVING_FORWARD = 0b0000_1000;
        /// Set on takeoff, cleared on the tick the body becomes Grounded
        const ALREADY_JUMPED = 0b0001_0000;
        const SPRINTING = 0b0010_0000;
        const HOLDING_ENEMY = 0b0100_0000;

        const MOVEMENT = Self::MOVING_LEFT.bits()
            | Self::MOVING_RIGHT.bits()
            | Self::MOVING_BACK.bits()
            | Self::MOVING_FORWARD.bits();
    }
}

/// An enemy captured by the vortex, waiting to be thrown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeldEnemy {
    pub respawn_position: Vec3,
    pub state: AiState,
}

/// An active grab charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vortex {
    /// Seconds since the charge started
    pub elapsed: f32,
}

/// Player-only tuning and runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterController {
    // Tuning (copied from PlayerSettings at spawn)
    pub acceleration: f32,
    pub deceleration: f32,
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub jump_speed: f32,
    pub heavy_fall_scale: f32,
    pub max_health: i32,

    // Runtime state
    /// Clamped to `[0, max_health]`
    pub health: i32,
    /// Acceleration applied on the last tick
    pub current_acceleration: Vec3,
    pub flags: MoveFlags,
    pub held: Option<HeldEnemy>,
    pub vortex: Option<Vortex>,
    /// World time of the last damage taken
    pub last_damage: Option<f64>,
    pub coins: u32,
}

impl CharacterController {
    pub fn new(settings: &PlayerSettings) -> Self {
        Self {
            acceleration: settings.acceleration,
            deceleration: settings.deceleration,
            move_speed: settings.move_speed,
            sprint_speed: settings.sprint_speed,
            jump_speed: settings.jump_speed,
            heavy_fall_scale: settings.heavy_fall_scale,
            max_health: settings.max_health,
            health: settings.max_health,
            current_acceleration: Vec3::ZERO,
            flags: MoveFlags::empty(),
            held: None,
            vortex: None,
            last_damage: None,
            coins: 0,
        }
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// True while the post-damage invulnerability window is open.
    pub fn is_invulnerable(&self, now: f64, window: f32) -> bool {
        self.last_damage.map_or(false, |t| now - t < f64::from(window))
    }

    /// Blink phase for the render layer: false on "off" half-periods
    /// while invulnerable.
    pub fn blink_visible(&self, now: f64, window: f32, period: f32) -> bool {
        match self.last_damage {
            Some(t) if self.is_invulnerable(now, window) && period > 0.0 => {
                let phase = ((now - t) / f64::from(period)).floor() as i64;
                phase % 2 == 1
            }
            _ => true,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }
}

/// Build the body for a newly spawned enemy.
pub fn enemy_body(settings: &EnemySettings, state: AiState) -> SphericalBody {
    let body = SphericalBody::new(settings.radius);
    match state {
        AiState::Hovering => body.with_gravity_scale(0.0),
        _ => body,
    }
}
