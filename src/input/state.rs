//! Per-frame input state

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Serialize, Deserialize};

use super::{Axis, Axis2, Verb};

/// Snapshot of every verb for one frame, plus last frame's held set for
/// edge detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    held: BTreeSet<Verb>,
    previous: BTreeSet<Verb>,
    axes: BTreeMap<Axis, f32>,
    axes2: BTreeMap<Axis2, Vec2>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: this frame's held set becomes "previous".
    /// Scalar and stick axes persist; mouse delta is per-frame and resets.
    pub fn advance(&mut self) {
        self.previous = self.held.clone();
        self.axes2.remove(&Axis2::MouseDelta);
    }

    pub fn press(&mut self, verb: Verb) {
        self.held.insert(verb);
    }

    pub fn release(&mut self, verb: Verb) {
        self.held.remove(&verb);
    }

    /// Release everything (held verbs only).
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Set a scalar axis, clamped to its valid range. Non-finite values
    /// read as zero.
    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        let value = if value.is_finite() { value } else { 0.0 };
        let value = match axis.range() {
            Some((lo, hi)) => value.clamp(lo, hi),
            None => value,
        };
        self.axes.insert(axis, value);
    }

    pub fn set_axis2(&mut self, axis: Axis2, value: Vec2) {
        let value = if value.is_finite() { value } else { Vec2::ZERO };
        self.axes2.insert(axis, value);
    }

    /// Check if a verb is currently held down
    pub fn is_down(&self, verb: Verb) -> bool {
        self.held.contains(&verb)
    }

    /// Held now, not held last frame
    pub fn just_pressed(&self, verb: Verb) -> bool {
        self.held.contains(&verb) && !self.previous.contains(&verb)
    }

    /// Held last frame, not held now
    pub fn just_released(&self, verb: Verb) -> bool {
        !self.held.contains(&verb) && self.previous.contains(&verb)
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes.get(&axis).copied().unwrap_or(0.0)
    }

    pub fn axis2(&self, axis: Axis2) -> Vec2 {
        self.axes2.get(&axis).copied().unwrap_or(Vec2::ZERO)
    }
}
