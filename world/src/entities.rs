//! Registry of the live non-player entities.

use std::collections::BTreeMap;

use marble_maze_core::{EntityDescriptor, EntityId, EntityKind, EntitySnapshot, Position};

/// Live entity materialized from a descriptor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntityState {
    /// Identifier allocated by the world for the entity.
    pub(crate) id: EntityId,
    /// Kind of the entity.
    pub(crate) kind: EntityKind,
    /// Location of the entity.
    pub(crate) position: Position,
}

impl EntityState {
    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
        }
    }
}

/// Stores entities and manages identifier allocation.
///
/// Identifiers are never reused, so contacts reported against an entity from a
/// previous level can never resolve to a new one.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, EntityState>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, descriptor: EntityDescriptor) -> EntityState {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));
        let state = EntityState {
            id,
            kind: descriptor.kind(),
            position: descriptor.position(),
        };
        let _ = self.entries.insert(id, state);
        state
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entries.get(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<EntityState> {
        self.entries.remove(&id)
    }

    /// Destroys every entity, returning how many were removed.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EntityState> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star_at(column: u32, row: u32) -> EntityDescriptor {
        EntityDescriptor::new(EntityKind::Star, Position::tile_center(column, row))
    }

    #[test]
    fn identifiers_are_not_reused_after_clear() {
        let mut registry = EntityRegistry::new();
        let first = registry.spawn(star_at(1, 1));
        assert_eq!(registry.clear(), 1);
        let second = registry.spawn(star_at(1, 1));

        assert_ne!(first.id, second.id);
        assert!(registry.get(first.id).is_none());
        assert!(registry.get(second.id).is_some());
    }

    #[test]
    fn remove_returns_the_entity_once() {
        let mut registry = EntityRegistry::new();
        let star = registry.spawn(star_at(2, 3));

        let removed = registry.remove(star.id).expect("star is live");
        assert_eq!(removed.kind, EntityKind::Star);
        assert!(registry.remove(star.id).is_none());
        assert_eq!(registry.iter().count(), 0);
    }
}
