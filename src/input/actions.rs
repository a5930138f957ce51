//! Verb definitions
//!
//! Device-agnostic names for everything the simulation reads. Key and
//! button bindings live in the host.

use serde::{Serialize, Deserialize};

/// Boolean verbs (held or not held this frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verb {
    Jump,
    /// Throw the held enemy, or start a vortex charge
    Shoot,
    /// Send the player back to the spawn point
    Reset,
    Sprint,

    // Digital movement (keyboard); each adds ±1 to the movement intent
    MoveLeft,
    MoveRight,
    MoveBack,
    MoveForward,

    // Orchestration
    Pause,
    /// Advance exactly one tick while paused
    Step,
}

impl Verb {
    pub const ALL: [Verb; 10] = [
        Verb::Jump,
        Verb::Shoot,
        Verb::Reset,
        Verb::Sprint,
        Verb::MoveLeft,
        Verb::MoveRight,
        Verb::MoveBack,
        Verb::MoveForward,
        Verb::Pause,
        Verb::Step,
    ];
}

/// Scalar verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Forward/back in `[-1, 1]`
    Forward,
    /// Right/left in `[-1, 1]`
    Strafe,
    /// Blend between move and sprint speed, `[0, 1]`
    SprintIntensity,
    /// Active camera yaw in radians (not clamped)
    CameraYaw,
}

impl Axis {
    /// Valid range of the axis value, if it has one.
    pub fn range(self) -> Option<(f32, f32)> {
        match self {
            Axis::Forward | Axis::Strafe => Some((-1.0, 1.0)),
            Axis::SprintIntensity => Some((0.0, 1.0)),
            Axis::CameraYaw => None,
        }
    }
}

/// 2D verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis2 {
    /// Stick-style movement, x = strafe, y = forward
    Translate,
    /// Mouse motion since last frame; cleared on `advance()`
    MouseDelta,
}
