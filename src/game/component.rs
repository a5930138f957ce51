//! Component Storage
//!
//! Components are plain data attached to entities. `ComponentStorage<T>`
//! maps entity ids to component values; an entity "has" a component kind
//! exactly when its id has an entry in that kind's table.
//!
//! Ids grow monotonically and are never recycled, so a dense array indexed
//! by id would keep growing for the whole scene. An ordered map keeps the
//! table sparse and still iterates in ascending id order, which keeps every
//! system deterministic for a given seed.

use std::collections::BTreeMap;

use super::entity::EntityId;

/// Sparse storage for a single component type.
#[derive(Debug, Clone)]
pub struct ComponentStorage<T> {
    data: BTreeMap<EntityId, T>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    /// Insert a component for an entity.
    /// Replaces any existing component.
    pub fn insert(&mut self, entity: EntityId, component: T) -> Option<T> {
        self.data.insert(entity, component)
    }

    /// Remove a component from an entity.
    /// Returns the removed component if it existed.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        self.data.remove(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.data.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.data.get_mut(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.data.contains_key(&entity)
    }

    /// Iterate over all (id, component) pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.data.iter().map(|(id, c)| (*id, c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.data.iter_mut().map(|(id, c)| (*id, c))
    }

    /// Snapshot of the ids in this table.
    /// Systems that spawn or despawn while walking a table iterate this.
    pub fn ids(&self) -> Vec<EntityId> {
        self.data.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of entities that have this component.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::test_id;

    #[test]
    fn test_insert_and_get() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let entity = test_id(5);

        assert_eq!(storage.insert(entity, 42), None);
        assert_eq!(storage.get(entity), Some(&42));
        assert!(storage.contains(entity));

        // Replacing hands back the old value
        assert_eq!(storage.insert(entity, 7), Some(42));
    }

    #[test]
    fn test_remove() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let entity = test_id(3);

        storage.insert(entity, 100);
        assert_eq!(storage.remove(entity), Some(100));
        assert!(!storage.contains(entity));
        assert_eq!(storage.remove(entity), None);
    }

    #[test]
    fn test_sparse_ids() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        storage.insert(test_id(1_000_000), 999);

        assert_eq!(storage.get(test_id(1_000_000)), Some(&999));
        assert!(!storage.contains(test_id(50)));
        assert_eq!(storage.count(), 1);
    }

    #[test]
    fn test_iteration_ascending() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();

        storage.insert(test_id(5), "five");
        storage.insert(test_id(0), "zero");
        storage.insert(test_id(2), "two");

        let items: Vec<_> = storage.iter().map(|(id, v)| (id.raw(), *v)).collect();
        assert_eq!(items, vec![(0, "zero"), (2, "two"), (5, "five")]);
        assert_eq!(storage.ids().len(), 3);
    }
}
