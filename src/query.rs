use std::collections::HashSet;

use crate::index::search_surface;
use crate::model::{
    Entity, EntityKind, LookupTables, PersonId, TaskIndex, TaskStatusId, TaskTypeId,
};
use crate::normalize::{fold, tokenize};

const STATUS_FIELDS: &[&str] = &["status"];
const ASSIGNEE_FIELDS: &[&str] = &["assignee", "person"];

/// `field:value`, `field=value` or `@name`, possibly negated with `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredToken {
    pub field: String,
    pub value: String,
    pub negated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Folded keyword tokens, fed to the search index.
    pub keywords: Vec<String>,
    pub structured: Vec<StructuredToken>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.structured.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPredicate {
    Keyword(String),
    Descriptor {
        field_name: String,
        value: String,
        negated: bool,
    },
    TaskStatus {
        /// `None` matches any task of the entity.
        task_type_id: Option<TaskTypeId>,
        status_ids: HashSet<TaskStatusId>,
        negated: bool,
    },
    Assignee {
        person_ids: HashSet<PersonId>,
        negated: bool,
    },
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_query(query: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in query.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn structured_token(raw: &str) -> Option<StructuredToken> {
    let (negated, body) = match raw.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, raw),
    };

    if let Some(name) = body.strip_prefix('@') {
        if name.is_empty() {
            return None;
        }
        return Some(StructuredToken {
            field: ASSIGNEE_FIELDS[0].to_string(),
            value: name.trim().to_string(),
            negated,
        });
    }

    let split = body.find([':', '='])?;
    let field = body[..split].trim();
    let value = body[split + 1..].trim();
    if field.is_empty() || value.is_empty() {
        return None;
    }
    Some(StructuredToken {
        field: field.to_string(),
        value: value.to_string(),
        negated,
    })
}

pub fn parse_query(query: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();
    for raw in split_query(query.trim()) {
        match structured_token(&raw) {
            Some(token) => parsed.structured.push(token),
            None => parsed.keywords.extend(tokenize(&raw)),
        }
    }
    parsed
}

/// Resolve structured tokens against the lookup tables. Tokens naming an
/// unknown field, status or person are dropped.
pub fn build_predicates(
    parsed: &ParsedQuery,
    kind: EntityKind,
    lookups: &LookupTables,
) -> Vec<FilterPredicate> {
    parsed
        .structured
        .iter()
        .filter_map(|token| {
            let predicate = resolve(token, kind, lookups);
            if predicate.is_none() {
                tracing::debug!(
                    field = %token.field,
                    value = %token.value,
                    "dropping unresolvable filter token"
                );
            }
            predicate
        })
        .collect()
}

/// Keyword predicates, for callers that filter without an index.
pub fn keyword_predicates(parsed: &ParsedQuery) -> Vec<FilterPredicate> {
    parsed
        .keywords
        .iter()
        .cloned()
        .map(FilterPredicate::Keyword)
        .collect()
}

fn status_ids(value: &str, lookups: &LookupTables) -> HashSet<TaskStatusId> {
    let wanted = fold(value);
    lookups
        .task_statuses
        .values()
        .filter(|s| fold(&s.short_name) == wanted)
        .map(|s| s.id.clone())
        .collect()
}

fn resolve(
    token: &StructuredToken,
    kind: EntityKind,
    lookups: &LookupTables,
) -> Option<FilterPredicate> {
    let field = fold(&token.field);
    let negated = token.negated;

    if STATUS_FIELDS.contains(&field.as_str()) {
        let status_ids = status_ids(&token.value, lookups);
        return (!status_ids.is_empty()).then_some(FilterPredicate::TaskStatus {
            task_type_id: None,
            status_ids,
            negated,
        });
    }

    if ASSIGNEE_FIELDS.contains(&field.as_str()) {
        let wanted = fold(&token.value);
        let person_ids: HashSet<PersonId> = lookups
            .people
            .values()
            .filter(|p| fold(&p.name).contains(&wanted))
            .map(|p| p.id.clone())
            .collect();
        return (!person_ids.is_empty()).then_some(FilterPredicate::Assignee {
            person_ids,
            negated,
        });
    }

    if let Some(task_type) = lookups
        .task_types
        .values()
        .find(|t| fold(&t.name) == field || t.id == token.field)
    {
        let status_ids = status_ids(&token.value, lookups);
        return (!status_ids.is_empty()).then_some(FilterPredicate::TaskStatus {
            task_type_id: Some(task_type.id.clone()),
            status_ids,
            negated,
        });
    }

    lookups
        .descriptors_for(kind)
        .find(|d| fold(&d.field_name) == field || fold(&d.name) == field)
        .map(|d| FilterPredicate::Descriptor {
            field_name: d.field_name.clone(),
            value: fold(&token.value),
            negated,
        })
}

fn matches(
    entity: &Entity,
    predicate: &FilterPredicate,
    tasks: &TaskIndex,
    lookups: &LookupTables,
) -> bool {
    match predicate {
        FilterPredicate::Keyword(keyword) => search_surface(entity, tasks, lookups)
            .iter()
            .any(|token| token.starts_with(keyword.as_str())),
        FilterPredicate::Descriptor {
            field_name,
            value,
            negated,
        } => {
            let hit = entity
                .data
                .get(field_name)
                .is_some_and(|v| fold(v) == *value);
            hit != *negated
        }
        FilterPredicate::TaskStatus {
            task_type_id,
            status_ids,
            negated,
        } => {
            let hit = match task_type_id {
                Some(task_type_id) => entity
                    .validations
                    .get(task_type_id)
                    .and_then(|task_id| tasks.get(task_id))
                    .is_some_and(|task| status_ids.contains(&task.task_status_id)),
                None => entity
                    .tasks
                    .iter()
                    .filter_map(|task_id| tasks.get(task_id))
                    .any(|task| status_ids.contains(&task.task_status_id)),
            };
            hit != *negated
        }
        FilterPredicate::Assignee {
            person_ids,
            negated,
        } => {
            let hit = entity
                .tasks
                .iter()
                .filter_map(|task_id| tasks.get(task_id))
                .any(|task| task.assignees.iter().any(|p| person_ids.contains(p)));
            hit != *negated
        }
    }
}

/// Keep the candidates satisfying every predicate, in their original order.
pub fn apply_filters<'a>(
    candidates: Vec<&'a Entity>,
    predicates: &[FilterPredicate],
    tasks: &TaskIndex,
    lookups: &LookupTables,
) -> Vec<&'a Entity> {
    if predicates.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|entity| {
            predicates
                .iter()
                .all(|predicate| matches(entity, predicate, tasks, lookups))
        })
        .collect()
}
