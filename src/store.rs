use std::collections::HashMap;

use crate::model::{Entity, EntityId, EntityPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Merged,
}

/// What a delete request turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Canceled,
}

/// Canonical entity collection, keyed by id.
///
/// The store knows nothing about the derived views; callers that own an
/// index or a result cache are responsible for invalidating them after a
/// mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    entities: HashMap<EntityId, Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            entities: entities.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Insert when absent, otherwise shallow-merge the patch.
    pub fn upsert(&mut self, patch: EntityPatch) -> Upserted {
        match self.entities.get_mut(&patch.id) {
            Some(existing) => {
                patch.apply_to(existing);
                Upserted::Merged
            }
            None => {
                let entity = patch.into_entity();
                self.entities.insert(entity.id.clone(), entity);
                Upserted::Inserted
            }
        }
    }

    pub fn upsert_entity(&mut self, entity: Entity) -> Upserted {
        self.upsert(EntityPatch::from(entity))
    }

    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        self.entities.remove(id)
    }

    /// Entities with attached work that are not canceled yet are flagged
    /// instead of removed.
    pub fn remove_or_cancel(&mut self, id: &str) -> Option<Removal> {
        let entity = self.entities.get_mut(id)?;
        if entity.has_work() && !entity.canceled {
            entity.canceled = true;
            return Some(Removal::Canceled);
        }
        self.entities.remove(id);
        Some(Removal::Removed)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
