//! Recorded input for headless replays
//!
//! A script is a list of steps; each step holds a set of verbs and axis
//! values for a number of consecutive frames. Stored as RON:
//!
//! ```ron
//! (steps: [
//!     (frames: 30, axes: [(Forward, 1.0)]),
//!     (frames: 1, held: [Jump]),
//!     (frames: 60),
//! ])
//! ```

use glam::Vec2;
use serde::{Serialize, Deserialize};

use super::{Axis, Axis2, InputFrame, Verb};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub frames: u32,
    #[serde(default)]
    pub held: Vec<Verb>,
    #[serde(default)]
    pub axes: Vec<(Axis, f32)>,
    #[serde(default)]
    pub translate: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn from_ron_str(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    pub fn total_frames(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.frames)).sum()
    }

    /// Expand into one `InputFrame` per frame, with edges relative to the
    /// previous frame of the script. Axes reset at each step boundary.
    pub fn expand(&self) -> Vec<InputFrame> {
        let mut frames = Vec::new();
        let mut input = InputFrame::new();

        for step in &self.steps {
            for _ in 0..step.frames {
                input.advance();
                clear_step(&mut input);
                for &verb in &step.held {
                    input.press(verb);
                }
                for &(axis, value) in &step.axes {
                    input.set_axis(axis, value);
                }
                if let Some(translate) = step.translate {
                    input.set_axis2(Axis2::Translate, translate);
                }
                frames.push(input.clone());
            }
        }
        frames
    }
}

/// Drop held verbs and axis values, keeping the edge history.
fn clear_step(input: &mut InputFrame) {
    input.release_all();
    for axis in [Axis::Forward, Axis::Strafe, Axis::SprintIntensity, Axis::CameraYaw] {
        input.set_axis(axis, 0.0);
    }
    input.set_axis2(Axis2::Translate, Vec2::ZERO);
}
