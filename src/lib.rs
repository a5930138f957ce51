//! Platformer simulation core
//!
//! Per-frame simulation for a 3D platformer: spheres moving against static
//! triangle-mesh terrain, a player character controller, enemy AI state
//! machines and the tick that runs them in a fixed order.
//!
//! The core is headless. A host feeds it an `InputFrame` per frame, reads
//! back transforms for rendering and drains sound cues for audio.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod game;
pub mod geometry;
pub mod input;
pub mod level;

pub use config::SimConfig;
pub use game::{SimContext, SimError, Simulation};
pub use input::InputFrame;
pub use level::LevelData;
