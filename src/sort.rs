use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{validation_status, Entity, LookupTables, TaskIndex, TaskTypeId};
use crate::normalize::fold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Parent,
    Episode,
    Description,
    TimeSpent,
    Frames,
    Descriptor(String),
    /// Status short name of the entity's task of this type.
    TaskStatus(TaskTypeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

/// Parse `name`, `frames:desc`, `descriptor:camera`, `task:Animation:desc`.
/// Task types may be given by name or id.
pub fn parse_sort_spec(text: &str, lookups: &LookupTables) -> Option<SortSpec> {
    let mut parts: Vec<&str> = text.split(':').map(str::trim).collect();
    let direction = match parts.last().map(|p| p.to_ascii_lowercase()).as_deref() {
        Some("desc") => {
            parts.pop();
            SortDirection::Descending
        }
        Some("asc") => {
            parts.pop();
            SortDirection::Ascending
        }
        _ => SortDirection::Ascending,
    };
    let field = match parts.as_slice() {
        ["name"] => SortField::Name,
        ["parent"] | ["sequence"] => SortField::Parent,
        ["episode"] => SortField::Episode,
        ["description"] => SortField::Description,
        ["time_spent"] | ["time"] => SortField::TimeSpent,
        ["frames"] | ["nb_frames"] => SortField::Frames,
        ["descriptor", field] if !field.is_empty() => SortField::Descriptor(field.to_string()),
        ["task", task_type] => {
            let wanted = fold(task_type);
            let found = lookups
                .task_types
                .values()
                .find(|t| t.id == *task_type || fold(&t.name) == wanted)?;
            SortField::TaskStatus(found.id.clone())
        }
        _ => return None,
    };
    Some(SortSpec { field, direction })
}

/// Compare two optional values, pushing `None` to the end regardless of
/// sort direction.
fn cmp_opt_none_last<T: Ord>(a: Option<T>, b: Option<T>, desc: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(va), Some(vb)) => {
            if desc {
                vb.cmp(&va)
            } else {
                va.cmp(&vb)
            }
        }
    }
}

fn folded_opt(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(fold)
}

fn text_cmp(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Natural order: episode, then sequence, then name, then id.
pub fn natural_cmp(a: &Entity, b: &Entity) -> Ordering {
    cmp_opt_none_last(
        folded_opt(a.episode_name.as_deref()),
        folded_opt(b.episode_name.as_deref()),
        false,
    )
    .then_with(|| {
        cmp_opt_none_last(
            folded_opt(a.sequence_name.as_deref()),
            folded_opt(b.sequence_name.as_deref()),
            false,
        )
    })
    .then_with(|| text_cmp(&a.name, &b.name))
    .then_with(|| a.id.cmp(&b.id))
}

/// Lookups needed to resolve sort keys that are not stored on the entity.
pub struct SortContext<'a> {
    pub tasks: &'a TaskIndex,
    pub lookups: &'a LookupTables,
}

fn spec_cmp(a: &Entity, b: &Entity, spec: &SortSpec, ctx: &SortContext<'_>) -> Ordering {
    let desc = spec.direction == SortDirection::Descending;
    match &spec.field {
        SortField::Name => {
            let primary = text_cmp(&a.name, &b.name);
            if desc {
                primary.reverse()
            } else {
                primary
            }
        }
        SortField::Parent => cmp_opt_none_last(
            folded_opt(a.parent_name()),
            folded_opt(b.parent_name()),
            desc,
        ),
        SortField::Episode => cmp_opt_none_last(
            folded_opt(a.episode_name.as_deref()),
            folded_opt(b.episode_name.as_deref()),
            desc,
        ),
        SortField::Description => cmp_opt_none_last(
            folded_opt(a.description.as_deref()),
            folded_opt(b.description.as_deref()),
            desc,
        ),
        SortField::TimeSpent => {
            cmp_opt_none_last(Some(a.time_spent), Some(b.time_spent), desc)
        }
        SortField::Frames => cmp_opt_none_last(Some(a.nb_frames), Some(b.nb_frames), desc),
        SortField::Descriptor(field) => cmp_opt_none_last(
            folded_opt(a.data.get(field).map(String::as_str)),
            folded_opt(b.data.get(field).map(String::as_str)),
            desc,
        ),
        SortField::TaskStatus(task_type_id) => cmp_opt_none_last(
            folded_opt(validation_status(a, task_type_id, ctx.tasks, ctx.lookups)),
            folded_opt(validation_status(b, task_type_id, ctx.tasks, ctx.lookups)),
            desc,
        ),
    }
}

/// Order `entities` by `specs`, each spec breaking ties of the previous one,
/// then by natural order and id. An empty spec list yields natural order.
/// The input slice is left untouched.
pub fn sort_entities<'a>(
    entities: &[&'a Entity],
    specs: &[SortSpec],
    ctx: &SortContext<'_>,
) -> Vec<&'a Entity> {
    let mut sorted = entities.to_vec();
    sorted.sort_by(|a, b| {
        specs
            .iter()
            .map(|spec| spec_cmp(a, b, spec, ctx))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| natural_cmp(a, b))
    });
    sorted
}

/// Order validation columns by task type priority, then name, then id.
/// Task types missing from the lookup table are left out.
pub fn sort_validation_columns(
    task_type_ids: impl IntoIterator<Item = TaskTypeId>,
    lookups: &LookupTables,
) -> Vec<TaskTypeId> {
    let mut seen = HashSet::new();
    let mut columns: Vec<TaskTypeId> = task_type_ids
        .into_iter()
        .filter(|id| lookups.task_types.contains_key(id) && seen.insert(id.clone()))
        .collect();
    columns.sort_by(|a, b| {
        let ta = &lookups.task_types[a];
        let tb = &lookups.task_types[b];
        ta.priority
            .cmp(&tb.priority)
            .then_with(|| text_cmp(&ta.name, &tb.name))
            .then_with(|| a.cmp(b))
    });
    columns
}
