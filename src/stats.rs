use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Entity, EntityId, TaskIndex, TaskStatusId, TaskTypeId};

/// Scalar aggregates over a set of entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListStats {
    pub count: usize,
    pub total_time_spent: u64,
    pub total_frames: u64,
}

pub fn summarize<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> ListStats {
    entities
        .into_iter()
        .fold(ListStats::default(), |mut acc, entity| {
            acc.count += 1;
            acc.total_time_spent += entity.time_spent;
            acc.total_frames += entity.nb_frames;
            acc
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKey {
    Sequence,
    Episode,
}

impl ParentKey {
    fn of<'a>(&self, entity: &'a Entity) -> Option<&'a EntityId> {
        match self {
            Self::Sequence => entity.sequence_id.as_ref(),
            Self::Episode => entity.episode_id.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub count: u64,
    pub frames: u64,
}

impl StatusCount {
    fn add(&mut self, frames: u64) {
        self.count += 1;
        self.frames += frames;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskTypeStats {
    pub by_status: BTreeMap<TaskStatusId, StatusCount>,
    pub all: StatusCount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentStats {
    pub by_task_type: BTreeMap<TaskTypeId, TaskTypeStats>,
}

impl ParentStats {
    fn record(&mut self, task_type_id: &str, status_id: &str, frames: u64) {
        let entry = self
            .by_task_type
            .entry(task_type_id.to_string())
            .or_default();
        entry
            .by_status
            .entry(status_id.to_string())
            .or_default()
            .add(frames);
        entry.all.add(frames);
    }

    pub fn status(&self, task_type_id: &str, status_id: &str) -> StatusCount {
        self.by_task_type
            .get(task_type_id)
            .and_then(|t| t.by_status.get(status_id))
            .copied()
            .unwrap_or_default()
    }
}

/// Task status counts per parent and task type, plus the same breakdown
/// over every parent under `all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsBreakdown {
    pub parents: BTreeMap<EntityId, ParentStats>,
    pub all: ParentStats,
}

pub fn by_parent<'a>(
    entities: impl IntoIterator<Item = &'a Entity>,
    key: ParentKey,
    tasks: &TaskIndex,
) -> StatsBreakdown {
    let mut breakdown = StatsBreakdown::default();
    for entity in entities {
        if entity.canceled {
            continue;
        }
        let Some(parent_id) = key.of(entity) else {
            continue;
        };
        for task_id in entity.validations.values() {
            let Some(task) = tasks.get(task_id) else {
                continue;
            };
            breakdown
                .parents
                .entry(parent_id.clone())
                .or_default()
                .record(&task.task_type_id, &task.task_status_id, entity.nb_frames);
            breakdown
                .all
                .record(&task.task_type_id, &task.task_status_id, entity.nb_frames);
        }
    }
    breakdown
}
