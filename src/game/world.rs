//! Game World
//!
//! The World is the central container for all simulation state:
//! - Entity allocation and lifetime tracking
//! - One component table per component kind
//!
//! Component tables are typed fields rather than a type-keyed map: the set
//! of component kinds is known at compile time. Entities are only created
//! through the spawn helpers below, which insert every paired component at
//! once (an enemy always has a transform and a body), so systems never see
//! half-built entities.

use glam::Vec3;
use log::{debug, info};

use super::component::ComponentStorage;
use super::components::*;
use super::entity::{EntityAllocator, EntityError, EntityId};
use super::transform::Transform;
use crate::config::SimConfig;

/// The simulation world containing all entities and their components.
#[derive(Debug, Default)]
pub struct World {
    entities: EntityAllocator,

    // =========================================================================
    // Core Components
    // =========================================================================

    pub transforms: ComponentStorage<Transform>,

    /// Collision-simulated spheres
    pub bodies: ComponentStorage<SphericalBody>,

    /// Plain integrated velocity (thrown projectiles)
    pub velocities: ComponentStorage<Velocity>,

    // =========================================================================
    // Gameplay Components
    // =========================================================================

    pub players: ComponentStorage<Player>,

    pub controllers: ComponentStorage<CharacterController>,

    pub enemies: ComponentStorage<EnemyAi>,

    pub thrown: ComponentStorage<ThrownEnemy>,

    pub coins: ComponentStorage<Coin>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Spawn a bare entity with a transform.
    pub fn spawn_at(&mut self, position: Vec3) -> Result<EntityId, EntityError> {
        let entity = self.entities.allocate()?;
        self.transforms.insert(entity, Transform::from_position(position));
        Ok(entity)
    }

    /// Remove an entity from every component table in one step.
    /// Returns false if it was already gone.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.entities.free(entity) {
            return false;
        }

        self.transforms.remove(entity);
        self.bodies.remove(entity);
        self.velocities.remove(entity);
        self.players.remove(entity);
        self.controllers.remove(entity);
        self.enemies.remove(entity);
        self.thrown.remove(entity);
        self.coins.remove(entity);

        debug!("despawned entity {}", entity);
        true
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Clear every table and restart ids at zero (level load).
    pub fn reset(&mut self) {
        self.entities.reset();
        self.transforms.clear();
        self.bodies.clear();
        self.velocities.clear();
        self.players.clear();
        self.controllers.clear();
        self.enemies.clear();
        self.thrown.clear();
        self.coins.clear();
    }

    /// The player entity, if one is spawned.
    pub fn player(&self) -> Option<EntityId> {
        self.players.iter().next().map(|(id, _)| id)
    }

    pub fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.transforms.get(entity).map(|t| t.position)
    }

    // =========================================================================
    // Convenience Spawners
    // =========================================================================

    /// Spawn the player with controller, body and transform.
    pub fn spawn_player(&mut self, position: Vec3, config: &SimConfig) -> Result<EntityId, EntityError> {
        let entity = self.spawn_at(position)?;
        self.players.insert(entity, Player);
        self.controllers.insert(entity, CharacterController::new(&config.player));
        self.bodies.insert(entity, SphericalBody::new(config.player.radius));
        info!("spawned player {} at {:?}", entity, position);
        Ok(entity)
    }

    /// Spawn an enemy anchored at its spawn position.
    pub fn spawn_enemy(
        &mut self,
        position: Vec3,
        state: AiState,
        config: &SimConfig,
        now: f64,
    ) -> Result<EntityId, EntityError> {
        let entity = self.spawn_at(position)?;
        self.enemies.insert(entity, EnemyAi::new(state, position, now));
        self.bodies.insert(entity, enemy_body(&config.enemy, state));
        debug!("spawned enemy {} ({:?}) at {:?}", entity, state, position);
        Ok(entity)
    }

    /// Spawn a thrown enemy flying with a fixed velocity.
    pub fn spawn_thrown_enemy(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        thrown: ThrownEnemy,
    ) -> Result<EntityId, EntityError> {
        let entity = self.spawn_at(position)?;
        self.thrown.insert(entity, thrown);
        self.velocities.insert(entity, Velocity(velocity));
        debug!("spawned thrown enemy {} at {:?}", entity, position);
        Ok(entity)
    }

    pub fn spawn_coin(&mut self, position: Vec3, config: &SimConfig) -> Result<EntityId, EntityError> {
        let entity = self.spawn_at(position)?;
        self.coins.insert(entity, Coin { radius: config.coin.radius });
        Ok(entity)
    }

    /// Spawn a free collision sphere (camera probe).
    pub fn spawn_body(&mut self, position: Vec3, body: SphericalBody) -> Result<EntityId, EntityError> {
        let entity = self.spawn_at(position)?;
        self.bodies.insert(entity, body);
        Ok(entity)
    }

    #[cfg(test)]
    pub(crate) fn skip_ids_to(&mut self, next: u32) {
        self.entities.skip_to(next);
    }
}
