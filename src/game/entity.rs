//! Entity Identifiers
//!
//! Entities are bare 32-bit handles handed out in increasing order.
//! Ids are never reused while a scene is loaded: a thrown enemy that
//! respawns comes back under a fresh id, so stale references to the old
//! one can never match the new one.
//!
//! Running out of ids is fatal. The allocator reports it as an error
//! instead of wrapping back to zero.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Opaque handle for a game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Raw numeric value (for logging and external bookkeeping).
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("entity id space exhausted after {0} allocations")]
    Exhausted(u32),
}

/// Hands out ids and tracks which ones are alive.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Next id to hand out
    next: u32,
    /// Ids allocated and not yet freed
    alive: BTreeSet<EntityId>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id. Fails once incrementing would wrap.
    pub fn allocate(&mut self) -> Result<EntityId, EntityError> {
        let id = EntityId(self.next);
        self.next = self.next.checked_add(1).ok_or(EntityError::Exhausted(self.next))?;
        self.alive.insert(id);
        Ok(id)
    }

    /// Mark an id as dead. Returns true if it was alive.
    pub fn free(&mut self, id: EntityId) -> bool {
        self.alive.remove(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.contains(&id)
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of ids handed out since the last reset.
    pub fn issued(&self) -> u32 {
        self.next
    }

    /// Forget every entity and restart numbering at zero (scene load).
    pub fn reset(&mut self) {
        self.alive.clear();
        self.next = 0;
    }

    #[cfg(test)]
    pub(crate) fn starting_at(next: u32) -> Self {
        Self { next, alive: BTreeSet::new() }
    }

    /// Jump the counter forward, keeping live entities.
    #[cfg(test)]
    pub(crate) fn skip_to(&mut self, next: u32) {
        self.next = self.next.max(next);
    }
}

#[cfg(test)]
pub(crate) fn test_id(raw: u32) -> EntityId {
    EntityId(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let mut alloc = EntityAllocator::new();

        let e1 = alloc.allocate().unwrap();
        let e2 = alloc.allocate().unwrap();
        assert_eq!(e1.raw(), 0);
        assert_eq!(e2.raw(), 1);
        assert_eq!(alloc.alive_count(), 2);

        assert!(alloc.free(e1));
        assert!(!alloc.free(e1));
        assert_eq!(alloc.alive_count(), 1);
        assert!(!alloc.is_alive(e1));
        assert!(alloc.is_alive(e2));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate().unwrap();
        alloc.free(e1);

        let e2 = alloc.allocate().unwrap();
        assert_ne!(e1, e2);
        assert!(e2 > e1);
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let mut alloc = EntityAllocator::new();
        for _ in 0..5 {
            alloc.allocate().unwrap();
        }
        alloc.reset();
        assert_eq!(alloc.alive_count(), 0);
        assert_eq!(alloc.issued(), 0);
        assert_eq!(alloc.allocate().unwrap().raw(), 0);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut alloc = EntityAllocator::starting_at(u32::MAX - 1);
        let last = alloc.allocate().unwrap();
        assert_eq!(last.raw(), u32::MAX - 1);
        assert_eq!(alloc.allocate(), Err(EntityError::Exhausted(u32::MAX)));
        // Nothing was handed out by the failed call
        assert_eq!(alloc.alive_count(), 1);
    }
}
