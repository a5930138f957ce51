//! Event System
//!
//! Events let systems talk without calling each other directly.
//!
//! Example flow:
//! 1. Enemy AI sees an enemy overlapping the player → sends DamageEvent
//! 2. Next tick, damage consumption reads it → reduces health, opens the
//!    invulnerability window, requests the hurt sound
//! 3. The host drains SoundCue requests after the frame and plays them
//!
//! Damage goes through a `DelayedQueue`: events sent during tick N only
//! become readable during tick N+1. The one-tick delay fixes the timing of
//! the invulnerability window relative to the collision that caused it.

use serde::{Serialize, Deserialize};

use super::entity::EntityId;

/// A queue for events of a single type.
/// Events are collected during the frame and drained at specific points.
#[derive(Debug, Clone)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-stage queue: sent events wait one `promote()` before they are ready.
#[derive(Debug, Clone)]
pub struct DelayedQueue<T> {
    /// Sent this tick
    pending: Vec<T>,
    /// Sent last tick, readable now
    ready: Vec<T>,
}

impl<T> DelayedQueue<T> {
    pub fn new() -> Self {
        Self { pending: Vec::new(), ready: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.pending.push(event);
    }

    /// Take everything sent before the last `promote()`.
    pub fn take_ready(&mut self) -> Vec<T> {
        std::mem::take(&mut self.ready)
    }

    /// End-of-tick: this tick's events become next tick's ready set.
    /// Ready events nobody consumed are dropped.
    pub fn promote(&mut self) {
        self.ready = std::mem::take(&mut self.pending);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.ready.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.ready.clear();
    }
}

impl<T> Default for DelayedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all simulation events.
#[derive(Debug, Default)]
pub struct Events {
    /// Damage dealt to the player (one tick delayed)
    pub damage: DelayedQueue<DamageEvent>,

    /// Fire-and-forget sound requests for the audio layer
    pub sounds: EventQueue<SoundCue>,

    /// Player respawned this frame
    pub respawn: EventQueue<RespawnEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues (on level load)
    pub fn clear_all(&mut self) {
        self.damage.clear();
        self.sounds.clear();
        self.respawn.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// Damage dealt to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: EntityId,
    /// Entity dealing damage
    pub source: Option<EntityId>,
    pub amount: i32,
}

/// Named sound effects the simulation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    Shoot,
    Coin,
    Hurt,
}

/// Why the player was sent back to the spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnReason {
    ResetInput,
    FellOut,
    Died,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnEvent {
    pub player: EntityId,
    pub reason: RespawnReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::test_id;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();

        queue.send(1);
        queue.send(2);
        queue.send(3);

        assert_eq!(queue.len(), 3);

        let collected: Vec<_> = queue.drain().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delayed_queue_waits_one_promote() {
        let mut queue: DelayedQueue<i32> = DelayedQueue::new();

        queue.send(1);
        assert!(queue.take_ready().is_empty());
        assert_eq!(queue.pending_len(), 1);

        queue.promote();
        assert_eq!(queue.ready_len(), 1);
        queue.send(2);
        assert_eq!(queue.take_ready(), vec![1]);

        queue.promote();
        assert_eq!(queue.take_ready(), vec![2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_unconsumed_ready_events_dropped() {
        let mut queue: DelayedQueue<i32> = DelayedQueue::new();
        queue.send(1);
        queue.promote();
        queue.promote();
        assert!(queue.take_ready().is_empty());
    }

    #[test]
    fn test_events_container() {
        let mut events = Events::new();

        events.damage.send(DamageEvent { target: test_id(0), source: None, amount: 1 });
        events.sounds.send(SoundCue::Hurt);

        assert_eq!(events.damage.pending_len(), 1);
        assert_eq!(events.sounds.len(), 1);

        events.clear_all();
        assert!(events.damage.is_empty());
        assert!(events.sounds.is_empty());
    }
}
