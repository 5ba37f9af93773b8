use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::time::Instant;

use crate::model::{Entity, EntityId, LookupTables, TaskIndex};
use crate::normalize::{increment_string, tokenize};

/// Outcome of a keyword lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHits {
    /// No keywords: callers use the unfiltered canonical set.
    Unconstrained,
    Matches(HashSet<EntityId>),
}

impl SearchHits {
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Matches(ids) => ids.contains(id),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Unconstrained)
    }
}

/// Folded tokens of everything a user can find an entity by: its name,
/// ancestor names, descriptor values and the names of people assigned to
/// its tasks. Unknown tasks or people are skipped.
pub fn search_surface(entity: &Entity, tasks: &TaskIndex, lookups: &LookupTables) -> Vec<String> {
    let mut tokens = tokenize(&entity.name);
    for ancestor in [&entity.sequence_name, &entity.episode_name]
        .into_iter()
        .flatten()
    {
        tokens.extend(tokenize(ancestor));
    }
    for value in entity.data.values() {
        tokens.extend(tokenize(value));
    }
    for task_id in &entity.tasks {
        let Some(task) = tasks.get(task_id) else {
            continue;
        };
        for person_id in &task.assignees {
            if let Some(name) = lookups.person_name(person_id) {
                tokens.extend(tokenize(name));
            }
        }
    }
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}

/// Inverted index from folded token to entity ids.
///
/// Tokens are kept ordered so that a keyword matches every token it
/// prefixes (typing `sh01` finds `sh010` and `sh015`).
#[derive(Default, Clone)]
pub struct SearchIndex {
    tokens: BTreeMap<String, HashSet<EntityId>>,
    /// id -> tokens, for single-entity patches
    by_entity: HashMap<EntityId, Vec<String>>,
}

impl fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("entities", &self.by_entity.len())
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl SearchIndex {
    pub fn build<'a>(
        entities: impl IntoIterator<Item = &'a Entity>,
        tasks: &TaskIndex,
        lookups: &LookupTables,
    ) -> Self {
        let t0 = Instant::now();
        let mut index = SearchIndex::default();
        for entity in entities {
            index.insert(entity, tasks, lookups);
        }
        tracing::debug!(
            entities = index.by_entity.len(),
            tokens = index.tokens.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "search index built"
        );
        index
    }

    fn insert(&mut self, entity: &Entity, tasks: &TaskIndex, lookups: &LookupTables) {
        let surface = search_surface(entity, tasks, lookups);
        for token in &surface {
            self.tokens
                .entry(token.clone())
                .or_default()
                .insert(entity.id.clone());
        }
        self.by_entity.insert(entity.id.clone(), surface);
    }

    /// Re-index one entity after an isolated edit.
    pub fn patch(&mut self, entity: &Entity, tasks: &TaskIndex, lookups: &LookupTables) {
        self.remove(&entity.id);
        self.insert(entity, tasks, lookups);
    }

    pub fn remove(&mut self, id: &str) {
        let Some(surface) = self.by_entity.remove(id) else {
            return;
        };
        for token in surface {
            if let Some(ids) = self.tokens.get_mut(&token) {
                ids.remove(id);
                if ids.is_empty() {
                    self.tokens.remove(&token);
                }
            }
        }
    }

    /// AND across keywords; each keyword matches the tokens it prefixes.
    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> SearchHits {
        if keywords.is_empty() {
            return SearchHits::Unconstrained;
        }

        let mut acc: Option<HashSet<EntityId>> = None;
        for keyword in keywords {
            let hits = self.prefix_hits(keyword.as_ref());
            let next = match acc {
                None => hits,
                Some(prev) => prev.intersection(&hits).cloned().collect(),
            };
            if next.is_empty() {
                return SearchHits::Matches(HashSet::new());
            }
            acc = Some(next);
        }
        SearchHits::Matches(acc.unwrap_or_default())
    }

    fn prefix_hits(&self, keyword: &str) -> HashSet<EntityId> {
        let upper = match increment_string(keyword) {
            Some(end) => Excluded(end),
            None => Unbounded,
        };
        let mut hits = HashSet::new();
        for (_, ids) in self
            .tokens
            .range::<String, _>((Included(keyword.to_string()), upper))
        {
            hits.extend(ids.iter().cloned());
        }
        hits
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}
