use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

pub type EntityId = String;
pub type TaskId = String;
pub type TaskTypeId = String;
pub type TaskStatusId = String;
pub type PersonId = String;

/// Tasks known to a list, keyed by task id.
pub type TaskIndex = HashMap<TaskId, TaskRef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Episode,
    Sequence,
    Shot,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Episode => "episode",
            Self::Sequence => "sequence",
            Self::Shot => "shot",
        }
    }

    /// Kind of the direct parent in the production hierarchy.
    pub fn parent_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Episode => None,
            Self::Sequence => Some(Self::Episode),
            Self::Shot => Some(Self::Sequence),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shot, sequence or episode.
///
/// Ancestor names are denormalized for display and natural ordering. Open
/// ended metadata lives in `data`, never as extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub production_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub sequence_id: Option<EntityId>,
    #[serde(default)]
    pub sequence_name: Option<String>,
    #[serde(default)]
    pub episode_id: Option<EntityId>,
    #[serde(default)]
    pub episode_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nb_frames: u64,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
    /// task type id -> task id, at most one task per type.
    #[serde(default)]
    pub validations: BTreeMap<TaskTypeId, TaskId>,
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub canceled: bool,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            production_id: None,
            parent_id: None,
            sequence_id: None,
            sequence_name: None,
            episode_id: None,
            episode_name: None,
            description: None,
            nb_frames: 0,
            data: BTreeMap::new(),
            tasks: Vec::new(),
            validations: BTreeMap::new(),
            time_spent: 0,
            canceled: false,
        }
    }

    /// Name of the direct parent, if denormalized.
    pub fn parent_name(&self) -> Option<&str> {
        match self.kind {
            EntityKind::Shot => self.sequence_name.as_deref(),
            EntityKind::Sequence => self.episode_name.as_deref(),
            EntityKind::Episode => None,
        }
    }

    /// `EP01 / SQ01 / SH010` style label.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(ep) = self.episode_name.as_deref() {
            parts.push(ep);
        }
        if self.kind == EntityKind::Shot {
            if let Some(sq) = self.sequence_name.as_deref() {
                parts.push(sq);
            }
        }
        parts.push(&self.name);
        parts.join(" / ")
    }

    pub fn has_work(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Link a task to this entity. A task of an already present type
    /// replaces the previous validation entry; its id is returned.
    pub fn link_task(&mut self, task: &TaskRef) -> Option<TaskId> {
        let superseded = self
            .validations
            .insert(task.task_type_id.clone(), task.id.clone())
            .filter(|previous| *previous != task.id);
        if let Some(previous) = &superseded {
            self.tasks.retain(|id| id != previous);
        }
        if !self.tasks.contains(&task.id) {
            self.tasks.push(task.id.clone());
        }
        superseded
    }

    /// Unlink a task. Returns false when the task was not linked.
    pub fn unlink_task(&mut self, task: &TaskRef) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|id| *id != task.id);
        if self.validations.get(&task.task_type_id) == Some(&task.id) {
            self.validations.remove(&task.task_type_id);
        }
        self.tasks.len() != before
    }
}

/// Shallow update of an entity: `Some` fields overwrite, `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    pub id: EntityId,
    #[serde(default)]
    pub kind: Option<EntityKind>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub production_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub sequence_id: Option<EntityId>,
    #[serde(default)]
    pub sequence_name: Option<String>,
    #[serde(default)]
    pub episode_id: Option<EntityId>,
    #[serde(default)]
    pub episode_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nb_frames: Option<u64>,
    #[serde(default)]
    pub data: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskId>>,
    #[serde(default)]
    pub validations: Option<BTreeMap<TaskTypeId, TaskId>>,
    #[serde(default)]
    pub time_spent: Option<u64>,
    #[serde(default)]
    pub canceled: Option<bool>,
}

impl EntityPatch {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn apply_to(self, target: &mut Entity) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { target.$field = value; })*
            };
        }
        macro_rules! merge_opt {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { target.$field = Some(value); })*
            };
        }
        merge!(kind, name, nb_frames, data, tasks, validations, time_spent, canceled);
        merge_opt!(
            production_id,
            parent_id,
            sequence_id,
            sequence_name,
            episode_id,
            episode_name,
            description
        );
    }

    /// Entity built from this patch alone (insert path of an upsert).
    pub fn into_entity(self) -> Entity {
        let mut entity = Entity::new(
            self.id.clone(),
            self.kind.unwrap_or(EntityKind::Shot),
            String::new(),
        );
        self.apply_to(&mut entity);
        entity
    }
}

impl From<Entity> for EntityPatch {
    fn from(e: Entity) -> Self {
        Self {
            id: e.id,
            kind: Some(e.kind),
            name: Some(e.name),
            production_id: e.production_id,
            parent_id: e.parent_id,
            sequence_id: e.sequence_id,
            sequence_name: e.sequence_name,
            episode_id: e.episode_id,
            episode_name: e.episode_name,
            description: e.description,
            nb_frames: Some(e.nb_frames),
            data: Some(e.data),
            tasks: Some(e.tasks),
            validations: Some(e.validations),
            time_spent: Some(e.time_spent),
            canceled: Some(e.canceled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: TaskId,
    pub entity_id: EntityId,
    pub task_type_id: TaskTypeId,
    pub task_status_id: TaskStatusId,
    #[serde(default)]
    pub assignees: Vec<PersonId>,
    #[serde(default)]
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: TaskTypeId,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: TaskStatusId,
    pub short_name: String,
    #[serde(default)]
    pub is_done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

/// Production metadata field carried in `Entity::data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: String,
    pub name: String,
    pub field_name: String,
    pub entity_type: EntityKind,
}

/// Lookup tables populated outside the list engine.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub task_types: HashMap<TaskTypeId, TaskType>,
    pub task_statuses: HashMap<TaskStatusId, TaskStatus>,
    pub people: HashMap<PersonId, Person>,
    pub descriptors: Vec<Descriptor>,
}

impl LookupTables {
    pub fn new(
        task_types: Vec<TaskType>,
        task_statuses: Vec<TaskStatus>,
        people: Vec<Person>,
        descriptors: Vec<Descriptor>,
    ) -> Self {
        Self {
            task_types: task_types.into_iter().map(|t| (t.id.clone(), t)).collect(),
            task_statuses: task_statuses
                .into_iter()
                .map(|s| (s.id.clone(), s))
                .collect(),
            people: people.into_iter().map(|p| (p.id.clone(), p)).collect(),
            descriptors,
        }
    }

    pub fn descriptors_for(&self, kind: EntityKind) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter().filter(move |d| d.entity_type == kind)
    }

    pub fn person_name(&self, id: &str) -> Option<&str> {
        self.people.get(id).map(|p| p.name.as_str())
    }

    pub fn status_short_name(&self, id: &str) -> Option<&str> {
        self.task_statuses.get(id).map(|s| s.short_name.as_str())
    }
}

/// Status short name of the entity's task of the given type.
pub fn validation_status<'a>(
    entity: &Entity,
    task_type_id: &str,
    tasks: &'a TaskIndex,
    lookups: &'a LookupTables,
) -> Option<&'a str> {
    let task_id = entity.validations.get(task_type_id)?;
    let task = tasks.get(task_id)?;
    lookups.status_short_name(&task.task_status_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, task_type: &str) -> TaskRef {
        TaskRef {
            id: id.to_string(),
            entity_id: "sh1".to_string(),
            task_type_id: task_type.to_string(),
            task_status_id: "wip".to_string(),
            assignees: vec![],
            duration: 0,
        }
    }

    #[test]
    fn link_task_replaces_same_type() {
        let mut shot = Entity::new("sh1", EntityKind::Shot, "SH010");
        assert_eq!(shot.link_task(&task("t1", "anim")), None);
        assert_eq!(shot.link_task(&task("t2", "anim")), Some("t1".to_string()));
        assert_eq!(shot.link_task(&task("t2", "anim")), None);
        assert_eq!(shot.link_task(&task("t3", "comp")), None);
        assert_eq!(shot.validations.len(), 2);
        assert_eq!(shot.validations["anim"], "t2");
        assert_eq!(shot.tasks, vec!["t2".to_string(), "t3".to_string()]);
    }

    #[test]
    fn unlink_task_drops_validation() {
        let mut shot = Entity::new("sh1", EntityKind::Shot, "SH010");
        let t = task("t1", "anim");
        shot.link_task(&t);
        assert!(shot.unlink_task(&t));
        assert!(shot.validations.is_empty());
        assert!(!shot.unlink_task(&t));
    }

    #[test]
    fn patch_is_shallow() {
        let mut shot = Entity::new("sh1", EntityKind::Shot, "SH010");
        shot.description = Some("first".into());
        shot.nb_frames = 24;
        let mut patch = EntityPatch::new("sh1");
        patch.name = Some("SH020".into());
        patch.apply_to(&mut shot);
        assert_eq!(shot.name, "SH020");
        assert_eq!(shot.description.as_deref(), Some("first"));
        assert_eq!(shot.nb_frames, 24);
    }

    #[test]
    fn full_name_includes_ancestors() {
        let mut shot = Entity::new("sh1", EntityKind::Shot, "SH010");
        shot.sequence_name = Some("SQ01".into());
        assert_eq!(shot.full_name(), "SQ01 / SH010");
        shot.episode_name = Some("E01".into());
        assert_eq!(shot.full_name(), "E01 / SQ01 / SH010");
    }
}
