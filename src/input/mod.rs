//! Input snapshot consumed by the simulation
//!
//! The simulation never reads devices. The host fills an `InputFrame` each
//! frame with named verbs: boolean buttons, scalar axes and 2D axes. Edge
//! detection (just pressed / just released) compares against the previous
//! frame, so the host must call `advance()` once per frame before writing
//! the new state.

mod actions;
mod script;
mod state;

pub use actions::*;
pub use script::{InputScript, ScriptStep};
pub use state::*;
