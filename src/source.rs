use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::model::{
    Descriptor, Entity, EntityKind, EntityPatch, LookupTables, Person, TaskRef, TaskStatus,
    TaskType,
};
use crate::scope::Scope;

/// An entity with the tasks attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity: Entity,
    #[serde(default)]
    pub tasks: Vec<TaskRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parents {
    #[serde(default)]
    pub episodes: Vec<Entity>,
    #[serde(default)]
    pub sequences: Vec<Entity>,
}

/// Everything a list needs to replace its canonical data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadPayload {
    pub records: Vec<EntityRecord>,
    pub parents: Parents,
}

/// Data-access collaborator. Implementations own transport and storage;
/// the list engine only ever sees materialized entities.
pub trait EntitySource: Send + Sync {
    fn fetch_entities(&self, scope: &Scope, kind: EntityKind)
        -> Result<Vec<EntityRecord>, SourceError>;

    fn fetch_parents(&self, scope: &Scope) -> Result<Parents, SourceError>;

    fn create(&self, entity: &Entity) -> Result<Entity, SourceError>;

    fn update(&self, patch: &EntityPatch) -> Result<Entity, SourceError>;

    fn remove(&self, id: &str) -> Result<(), SourceError>;

    fn restore(&self, id: &str) -> Result<Entity, SourceError>;
}

/// Fetch entities and parent tables in one go.
pub fn fetch_payload(
    source: &dyn EntitySource,
    scope: &Scope,
    kind: EntityKind,
) -> Result<LoadPayload, SourceError> {
    let parents = source.fetch_parents(scope)?;
    let records = source.fetch_entities(scope, kind)?;
    Ok(LoadPayload { records, parents })
}

/// Serialized production: lookup tables, entities and tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub task_types: Vec<TaskType>,
    #[serde(default)]
    pub task_statuses: Vec<TaskStatus>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
    #[serde(default)]
    pub episodes: Vec<Entity>,
    #[serde(default)]
    pub sequences: Vec<Entity>,
    #[serde(default)]
    pub shots: Vec<Entity>,
    #[serde(default)]
    pub tasks: Vec<TaskRef>,
}

impl SnapshotDocument {
    fn collection(&self, kind: EntityKind) -> &Vec<Entity> {
        match kind {
            EntityKind::Episode => &self.episodes,
            EntityKind::Sequence => &self.sequences,
            EntityKind::Shot => &self.shots,
        }
    }

    fn collection_mut(&mut self, kind: EntityKind) -> &mut Vec<Entity> {
        match kind {
            EntityKind::Episode => &mut self.episodes,
            EntityKind::Sequence => &mut self.sequences,
            EntityKind::Shot => &mut self.shots,
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.episodes
            .iter_mut()
            .chain(self.sequences.iter_mut())
            .chain(self.shots.iter_mut())
            .find(|e| e.id == id)
    }

    /// Episode of an entity, looking through its sequence for shots.
    fn episode_of<'a>(&'a self, entity: &'a Entity) -> Option<&'a str> {
        match entity.kind {
            EntityKind::Episode => Some(entity.id.as_str()),
            EntityKind::Sequence => entity.episode_id.as_deref().or(entity.parent_id.as_deref()),
            EntityKind::Shot => entity.episode_id.as_deref().or_else(|| {
                let sequence_id = entity.sequence_id.as_deref().or(entity.parent_id.as_deref())?;
                self.sequences
                    .iter()
                    .find(|s| s.id == sequence_id)
                    .and_then(|s| s.episode_id.as_deref().or(s.parent_id.as_deref()))
            }),
        }
    }

    fn in_scope(&self, entity: &Entity, scope: &Scope) -> bool {
        let production_ok = entity
            .production_id
            .as_deref()
            .map_or(true, |p| p == scope.production_id);
        let episode_ok = match scope.episode_id.as_deref() {
            None => true,
            Some(episode_id) => self.episode_of(entity) == Some(episode_id),
        };
        production_ok && episode_ok
    }
}

/// In-process source backed by a JSON snapshot. Mutations only touch the
/// in-memory document.
#[derive(Debug, Default)]
pub struct JsonSnapshot {
    doc: Mutex<SnapshotDocument>,
}

impl JsonSnapshot {
    pub fn new(doc: SnapshotDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SourceError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let t0 = Instant::now();
        let text = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            bytes = text.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn lookups(&self) -> LookupTables {
        let doc = self.doc.lock();
        LookupTables::new(
            doc.task_types.clone(),
            doc.task_statuses.clone(),
            doc.people.clone(),
            doc.descriptors.clone(),
        )
    }

    pub fn document(&self) -> SnapshotDocument {
        self.doc.lock().clone()
    }
}

impl EntitySource for JsonSnapshot {
    fn fetch_entities(
        &self,
        scope: &Scope,
        kind: EntityKind,
    ) -> Result<Vec<EntityRecord>, SourceError> {
        let doc = self.doc.lock();
        let mut tasks_by_entity: HashMap<&str, Vec<TaskRef>> = HashMap::new();
        for task in &doc.tasks {
            tasks_by_entity
                .entry(task.entity_id.as_str())
                .or_default()
                .push(task.clone());
        }
        Ok(doc
            .collection(kind)
            .iter()
            .filter(|e| doc.in_scope(e, scope))
            .map(|e| EntityRecord {
                entity: e.clone(),
                tasks: tasks_by_entity.remove(e.id.as_str()).unwrap_or_default(),
            })
            .collect())
    }

    fn fetch_parents(&self, scope: &Scope) -> Result<Parents, SourceError> {
        let doc = self.doc.lock();
        let episodes = doc
            .episodes
            .iter()
            .filter(|e| {
                e.production_id
                    .as_deref()
                    .map_or(true, |p| p == scope.production_id)
            })
            .cloned()
            .collect();
        let sequences = doc
            .sequences
            .iter()
            .filter(|s| doc.in_scope(s, scope))
            .cloned()
            .collect();
        Ok(Parents {
            episodes,
            sequences,
        })
    }

    fn create(&self, entity: &Entity) -> Result<Entity, SourceError> {
        let mut doc = self.doc.lock();
        if doc.find_mut(&entity.id).is_some() {
            return Err(SourceError::Transport(format!(
                "entity {} already exists",
                entity.id
            )));
        }
        let mut created = entity.clone();
        if created.id.is_empty() {
            let n = doc.collection(entity.kind).len() + 1;
            created.id = format!("{}-{}", entity.kind, n);
        }
        doc.collection_mut(entity.kind).push(created.clone());
        Ok(created)
    }

    fn update(&self, patch: &EntityPatch) -> Result<Entity, SourceError> {
        let mut doc = self.doc.lock();
        let entity = doc
            .find_mut(&patch.id)
            .ok_or_else(|| SourceError::NotFound(patch.id.clone()))?;
        patch.clone().apply_to(entity);
        Ok(entity.clone())
    }

    fn remove(&self, id: &str) -> Result<(), SourceError> {
        let mut doc = self.doc.lock();
        let has_tasks = doc.tasks.iter().any(|t| t.entity_id == id);
        let entity = doc
            .find_mut(id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        if has_tasks && !entity.canceled {
            entity.canceled = true;
            return Ok(());
        }
        let kind = entity.kind;
        doc.collection_mut(kind).retain(|e| e.id != id);
        doc.tasks.retain(|t| t.entity_id != id);
        Ok(())
    }

    fn restore(&self, id: &str) -> Result<Entity, SourceError> {
        let mut doc = self.doc.lock();
        let entity = doc
            .find_mut(id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        entity.canceled = false;
        Ok(entity.clone())
    }
}
