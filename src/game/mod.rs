//! Game Simulation Module
//!
//! A lightweight ECS-style simulation core for a 3D platformer.
//!
//! Key concepts:
//! - Entity: Monotonic id, never reused
//! - Component: Plain data structs attached to entities
//! - World: Container for all entities and their components
//! - Event: Decoupled communication between systems
//! - Systems: Plain functions over the world (dynamics, controller, enemy AI)
//!
//! Design philosophy:
//! - Simple over flexible (we know what game we're making)
//! - Deterministic: ordered tables, seeded noise, fixed system order
//! - No runtime type registration (compile-time known components)

pub mod entity;
pub mod component;
pub mod world;
pub mod event;
pub mod transform;
pub mod components;
pub mod dynamics;
pub mod controller;
pub mod enemy;
pub mod noise;
pub mod camera;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use entity::{EntityError, EntityId};
pub use world::World;
pub use event::{Events, SoundCue};
pub use transform::Transform;
pub use runtime::{SimContext, SimError, Simulation};
