use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cache::ResultCache;
use crate::config::{perf_log_enabled, ListConfig};
use crate::error::{ListError, ListResult, SourceError};
use crate::index::SearchIndex;
use crate::model::{
    validation_status, Entity, EntityId, EntityKind, EntityPatch, LookupTables, TaskIndex, TaskRef,
    TaskTypeId,
};
use crate::normalize::fold;
use crate::query::{apply_filters, build_predicates, parse_query, FilterPredicate, ParsedQuery};
use crate::scope::{LoadPhase, LoadState, LoadTicket, Scope};
use crate::selection::SelectionGrid;
use crate::sort::{natural_cmp, sort_entities, sort_validation_columns, SortContext, SortSpec};
use crate::source::{fetch_payload, EntitySource, LoadPayload, Parents};
use crate::stats::{by_parent, summarize, ListStats, ParentKey, StatsBreakdown};
use crate::store::{EntityStore, Removal, Upserted};
use crate::window::DisplayWindow;

fn perf_log(message: impl AsRef<str>) {
    if perf_log_enabled() {
        tracing::info!(target: "shotlist::perf", "{}", message.as_ref());
    }
}

fn ms(t0: Instant) -> f64 {
    t0.elapsed().as_secs_f64() * 1000.0
}

/// Optional columns worth showing because some loaded entity fills them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnFlags {
    pub fps: bool,
    pub frames: bool,
    pub frame_in: bool,
    pub frame_out: bool,
    pub time: bool,
    pub description: bool,
}

impl ColumnFlags {
    /// Only ever turns flags on.
    fn observe(&mut self, entity: &Entity) {
        let filled = |key: &str| entity.data.get(key).is_some_and(|v| !v.is_empty());
        self.fps |= filled("fps");
        self.frame_in |= filled("frame_in");
        self.frame_out |= filled("frame_out");
        self.frames |= entity.nb_frames > 0;
        self.time |= entity.time_spent > 0;
        self.description |= entity.description.as_deref().is_some_and(|d| !d.is_empty());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub name: String,
    pub query: String,
}

/// Consecutive displayed entities sharing a parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentGroup<'a> {
    pub parent_name: Option<&'a str>,
    pub entities: Vec<&'a Entity>,
}

/// Copy parent ids and names onto `entity`. `parent_id` wins over stale
/// ancestor ids; names of unknown parents are cleared when the parent moved
/// and kept otherwise.
fn denormalize(
    entity: &mut Entity,
    episodes: &HashMap<EntityId, Entity>,
    sequences: &HashMap<EntityId, Entity>,
) {
    let previous_episode = entity.episode_id.clone();
    match entity.kind {
        EntityKind::Episode => {}
        EntityKind::Sequence => {
            if let Some(parent) = entity.parent_id.clone() {
                entity.episode_id = Some(parent);
            }
        }
        EntityKind::Shot => {
            if let Some(parent) = entity.parent_id.clone() {
                if entity.sequence_id.as_ref() != Some(&parent) {
                    entity.sequence_name = None;
                    entity.sequence_id = Some(parent);
                }
            }
            if let Some(sequence) = entity.sequence_id.as_ref().and_then(|id| sequences.get(id)) {
                entity.sequence_name = Some(sequence.name.clone());
                if let Some(episode_id) = sequence
                    .episode_id
                    .clone()
                    .or_else(|| sequence.parent_id.clone())
                {
                    entity.episode_id = Some(episode_id);
                }
            }
        }
    }
    if entity.episode_id != previous_episode {
        entity.episode_name = None;
    }
    if let Some(episode) = entity.episode_id.as_ref().and_then(|id| episodes.get(id)) {
        entity.episode_name = Some(episode.name.clone());
    }
    if entity.parent_id.is_none() {
        entity.parent_id = match entity.kind {
            EntityKind::Shot => entity.sequence_id.clone(),
            EntityKind::Sequence => entity.episode_id.clone(),
            EntityKind::Episode => None,
        };
    }
}

/// Patch from an entity returned by a source. Task links and the time spent
/// derived from them stay local.
fn canonical_patch(entity: Entity) -> EntityPatch {
    EntityPatch {
        tasks: None,
        validations: None,
        time_spent: None,
        ..EntityPatch::from(entity)
    }
}

fn sort_assignees(task: &mut TaskRef, lookups: &LookupTables) {
    task.assignees.sort_by(|a, b| {
        let name_a = lookups.person_name(a).map(fold);
        let name_b = lookups.person_name(b).map(fold);
        match (name_a, name_b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| a.cmp(b))
    });
}

fn time_spent(entity: &Entity, tasks: &TaskIndex) -> u64 {
    entity
        .tasks
        .iter()
        .filter_map(|id| tasks.get(id))
        .map(|t| t.duration)
        .sum()
}

/// Filtered, sorted and windowed view over one scope's entities.
///
/// Every mutation entry point leaves the derived state (index, result,
/// window, validation columns, selection grid, stats) consistent with the
/// store before returning.
#[derive(Debug)]
pub struct EntityList {
    kind: EntityKind,
    scope: Scope,
    config: ListConfig,
    lookups: LookupTables,

    store: EntityStore,
    tasks: TaskIndex,
    episodes: HashMap<EntityId, Entity>,
    sequences: HashMap<EntityId, Entity>,

    index: SearchIndex,
    index_stale: bool,
    cache: ResultCache,

    query: String,
    parsed: ParsedQuery,
    predicates: Vec<FilterPredicate>,
    sorting: Vec<SortSpec>,
    result: Vec<EntityId>,

    window: DisplayWindow,
    columns: Vec<TaskTypeId>,
    filled_columns: BTreeSet<TaskTypeId>,
    grid: SelectionGrid,
    stats: ListStats,
    flags: ColumnFlags,

    load: LoadState,
    saved_searches: Vec<SavedSearch>,
}

impl EntityList {
    pub fn new(kind: EntityKind, scope: Scope, config: ListConfig, lookups: LookupTables) -> Self {
        let page_size = match kind {
            EntityKind::Shot => config.page_size,
            EntityKind::Sequence | EntityKind::Episode => config.parent_page_size(),
        };
        Self {
            kind,
            scope,
            config,
            lookups,
            store: EntityStore::new(),
            tasks: TaskIndex::new(),
            episodes: HashMap::new(),
            sequences: HashMap::new(),
            index: SearchIndex::default(),
            index_stale: false,
            cache: ResultCache::new(),
            query: String::new(),
            parsed: ParsedQuery::default(),
            predicates: Vec::new(),
            sorting: Vec::new(),
            result: Vec::new(),
            window: DisplayWindow::new(page_size),
            columns: Vec::new(),
            filled_columns: BTreeSet::new(),
            grid: SelectionGrid::default(),
            stats: ListStats::default(),
            flags: ColumnFlags::default(),
            load: LoadState::default(),
            saved_searches: Vec::new(),
        }
    }

    // ── pipeline ──

    fn ensure_index(&mut self) {
        if self.index_stale {
            self.index = SearchIndex::build(self.store.iter(), &self.tasks, &self.lookups);
            self.index_stale = false;
        }
    }

    /// Recompute the full result for the current query and sorting,
    /// reusing the cached one when nothing changed since.
    fn refresh_result(&mut self) {
        self.ensure_index();
        if let Some(ids) = self.cache.lookup(&self.query, &self.sorting) {
            self.result = ids.to_vec();
            tracing::debug!(query = %self.query, results = self.result.len(), "result cache hit");
            return;
        }

        let t0 = Instant::now();
        let store = &self.store;
        let canonical = self.cache.canonical_or_insert_with(|| {
            let mut all: Vec<&Entity> = store.iter().collect();
            all.sort_by(|a, b| natural_cmp(a, b));
            all.into_iter().map(|e| e.id.clone()).collect()
        });
        let hits = self.index.search(&self.parsed.keywords);
        let candidates: Vec<&Entity> = canonical
            .iter()
            .filter(|id| hits.contains(id))
            .filter_map(|id| store.get(id))
            .collect();
        let candidate_count = candidates.len();

        let filter_start = Instant::now();
        let filtered = apply_filters(candidates, &self.predicates, &self.tasks, &self.lookups);
        let filter_ms = ms(filter_start);

        let sort_start = Instant::now();
        let ordered = if self.sorting.is_empty() {
            filtered
        } else {
            let ctx = SortContext {
                tasks: &self.tasks,
                lookups: &self.lookups,
            };
            sort_entities(&filtered, &self.sorting, &ctx)
        };
        let sort_ms = ms(sort_start);

        let ids: Vec<EntityId> = ordered.iter().map(|e| e.id.clone()).collect();
        self.cache.store(&self.query, &self.sorting, ids.clone());
        self.result = ids;

        tracing::debug!(
            kind = %self.kind,
            query = %self.query,
            candidates = candidate_count,
            results = self.result.len(),
            filter_ms,
            sort_ms,
            total_ms = ms(t0),
            "result recomputed"
        );
        perf_log(format!(
            "pipeline kind={} candidates={} results={} filter_ms={:.2} sort_ms={:.2} total_ms={:.2}",
            self.kind,
            candidate_count,
            self.result.len(),
            filter_ms,
            sort_ms,
            ms(t0)
        ));
    }

    /// Back to the first page: fresh columns, fresh grid.
    fn reset_window(&mut self) {
        self.window.reset(self.result.len());
        self.columns = self.compute_columns();
        self.grid = SelectionGrid::build(self.window.len(), self.columns.len());
        self.refresh_view();
    }

    /// Validation columns of the task types present on the first page.
    fn compute_columns(&self) -> Vec<TaskTypeId> {
        let first_page = self.window.len().min(self.window.page_size());
        let present = self
            .result
            .iter()
            .take(first_page)
            .filter_map(|id| self.store.get(id))
            .flat_map(|e| e.validations.keys().cloned());
        sort_validation_columns(present, &self.lookups)
    }

    /// Stats and filled columns of the displayed window.
    fn refresh_view(&mut self) {
        let displayed = self.displayed();
        let stats = summarize(displayed.iter().copied());
        let filled: BTreeSet<TaskTypeId> = self
            .columns
            .iter()
            .filter(|c| displayed.iter().any(|e| e.validations.contains_key(*c)))
            .cloned()
            .collect();
        self.stats = stats;
        self.filled_columns = filled;
    }

    /// Columns may have changed after a task edit. A different column axis
    /// invalidates the selection.
    fn refresh_columns(&mut self) {
        let columns = self.compute_columns();
        if columns != self.columns {
            self.columns = columns;
            self.grid = SelectionGrid::build(self.window.len(), self.columns.len());
        }
        self.refresh_view();
    }

    /// Full recompute after a structural change of the store.
    fn rebuild(&mut self) {
        self.cache.invalidate();
        self.index_stale = true;
        self.refresh_result();
        self.reset_window();
    }

    // ── search, sort, window ──

    pub fn apply_search(&mut self, query: &str) {
        self.query = query.trim().to_string();
        self.parsed = parse_query(&self.query);
        self.predicates = match self.kind {
            EntityKind::Shot => build_predicates(&self.parsed, self.kind, &self.lookups),
            EntityKind::Sequence | EntityKind::Episode => Vec::new(),
        };
        self.refresh_result();
        self.reset_window();
    }

    pub fn apply_sort(&mut self, sorting: Vec<SortSpec>) {
        self.sorting = sorting;
        self.refresh_result();
        self.reset_window();
    }

    /// Reveal one more page. Returns the new window length.
    pub fn grow_window(&mut self) -> usize {
        let previous = self.window.len();
        let len = self.window.grow(self.result.len());
        if len != previous {
            self.grid = self.grid.resize(previous, len, self.columns.len());
            self.refresh_view();
        }
        len
    }

    // ── selection ──

    pub fn toggle_selection(&mut self, x: usize, y: usize) -> bool {
        self.grid.toggle(x, y)
    }

    pub fn set_selection(&mut self, x: usize, y: usize, value: bool) -> bool {
        self.grid.set(x, y, value)
    }

    pub fn select_many(&mut self, cells: &[(usize, usize)], value: bool) {
        for &(x, y) in cells {
            self.grid.set(x, y, value);
        }
    }

    pub fn clear_selection(&mut self) {
        self.grid.clear();
    }

    /// Tasks behind the selected cells. Empty cells are skipped.
    pub fn selected_tasks(&self) -> Vec<&TaskRef> {
        let displayed = self.displayed();
        self.grid
            .selected()
            .into_iter()
            .filter_map(|(x, y)| {
                let entity = displayed.get(x)?;
                let column = self.columns.get(y)?;
                let task_id = entity.validations.get(column)?;
                self.tasks.get(task_id)
            })
            .collect()
    }

    // ── views ──

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn lookups(&self) -> &LookupTables {
        &self.lookups
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.store.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&TaskRef> {
        self.tasks.get(id)
    }

    /// Status short name of the entity's task in a validation column.
    pub fn validation_status(&self, entity: &Entity, task_type_id: &str) -> Option<&str> {
        validation_status(entity, task_type_id, &self.tasks, &self.lookups)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sorting(&self) -> &[SortSpec] {
        &self.sorting
    }

    /// Full filtered and sorted result.
    pub fn result(&self) -> Vec<&Entity> {
        self.result.iter().filter_map(|id| self.store.get(id)).collect()
    }

    pub fn result_len(&self) -> usize {
        self.result.len()
    }

    pub fn displayed(&self) -> Vec<&Entity> {
        self.result
            .iter()
            .take(self.window.len())
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn validation_columns(&self) -> &[TaskTypeId] {
        &self.columns
    }

    pub fn filled_columns(&self) -> &BTreeSet<TaskTypeId> {
        &self.filled_columns
    }

    pub fn selection(&self) -> &SelectionGrid {
        &self.grid
    }

    /// Aggregates over the displayed window.
    pub fn stats(&self) -> ListStats {
        self.stats
    }

    /// Aggregates over the full result.
    pub fn result_stats(&self) -> ListStats {
        summarize(self.result())
    }

    pub fn column_flags(&self) -> ColumnFlags {
        self.flags
    }

    /// Status breakdown per sequence or episode over every loaded entity
    /// passing the current structured filters.
    pub fn breakdown(&self, key: ParentKey) -> StatsBreakdown {
        let all: Vec<&Entity> = self.store.iter().collect();
        let narrowed = apply_filters(all, &self.predicates, &self.tasks, &self.lookups);
        by_parent(narrowed, key, &self.tasks)
    }

    pub fn displayed_by_parent(&self) -> Vec<ParentGroup<'_>> {
        let mut groups: Vec<ParentGroup<'_>> = Vec::new();
        for entity in self.displayed() {
            let parent_name = entity.parent_name();
            match groups.last_mut() {
                Some(group) if group.parent_name == parent_name => group.entities.push(entity),
                _ => groups.push(ParentGroup {
                    parent_name,
                    entities: vec![entity],
                }),
            }
        }
        groups
    }

    /// Loaded entities with a task waiting for approval, in natural order.
    pub fn pending(&self) -> Vec<&Entity> {
        let wanted = fold(&self.config.pending_status);
        let mut pending: Vec<&Entity> = self
            .store
            .iter()
            .filter(|e| {
                e.tasks.iter().filter_map(|id| self.tasks.get(id)).any(|t| {
                    self.lookups
                        .status_short_name(&t.task_status_id)
                        .is_some_and(|s| fold(s) == wanted)
                })
            })
            .collect();
        pending.sort_by(|a, b| natural_cmp(a, b));
        pending
    }

    // ── saved searches ──

    /// Returns false when a search with this name already exists.
    pub fn save_search(&mut self, name: &str, query: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.saved_searches.iter().any(|s| s.name == name) {
            return false;
        }
        self.saved_searches.push(SavedSearch {
            name: name.to_string(),
            query: query.trim().to_string(),
        });
        self.saved_searches
            .sort_by(|a, b| fold(&a.name).cmp(&fold(&b.name)).then_with(|| a.name.cmp(&b.name)));
        true
    }

    pub fn remove_search(&mut self, name: &str) -> bool {
        let before = self.saved_searches.len();
        self.saved_searches.retain(|s| s.name != name);
        self.saved_searches.len() != before
    }

    pub fn saved_searches(&self) -> &[SavedSearch] {
        &self.saved_searches
    }

    // ── load lifecycle ──

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_loading()
    }

    pub fn begin_load(&mut self) -> ListResult<LoadTicket> {
        if self.load.is_loading() {
            tracing::debug!(scope = %self.scope, "load already running");
            return Err(ListError::AlreadyLoading(self.scope.clone()));
        }
        self.load.generation += 1;
        self.load.phase = LoadPhase::Loading;
        self.load.error = None;
        Ok(LoadTicket {
            scope: self.scope.clone(),
            generation: self.load.generation,
        })
    }

    /// Apply a load completion. Outdated tickets change nothing. A failed
    /// load keeps the last good data.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<LoadPayload, SourceError>,
    ) -> ListResult<()> {
        if ticket.scope != self.scope || ticket.generation != self.load.generation {
            tracing::debug!(
                scope = %self.scope,
                expected = self.load.generation,
                got = ticket.generation,
                "discarding stale load"
            );
            return Err(ListError::StaleLoad {
                expected: self.load.generation,
                got: ticket.generation,
            });
        }
        match outcome {
            Ok(payload) => {
                self.replace_data(payload);
                self.load.phase = LoadPhase::Ready;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(scope = %self.scope, error = %err, "load failed");
                self.load.phase = LoadPhase::Error;
                self.load.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Fetch and apply in one call, for single-threaded hosts.
    pub fn load_from(&mut self, source: &dyn EntitySource) -> ListResult<()> {
        let ticket = self.begin_load()?;
        let outcome = fetch_payload(source, &self.scope, self.kind);
        self.finish_load(ticket, outcome)
    }

    /// Drop all data and supersede any running load.
    pub fn reset(&mut self) {
        self.load.generation += 1;
        self.load.phase = LoadPhase::Idle;
        self.load.error = None;
        self.store.clear();
        self.tasks.clear();
        self.episodes.clear();
        self.sequences.clear();
        self.flags = ColumnFlags::default();
        self.grid = SelectionGrid::default();
        self.rebuild();
    }

    fn replace_data(&mut self, payload: LoadPayload) {
        let t0 = Instant::now();
        let LoadPayload { records, parents } = payload;
        self.set_parents(parents);

        let mut tasks = TaskIndex::new();
        let mut entities = Vec::with_capacity(records.len());
        let mut flags = ColumnFlags::default();
        for record in records {
            let mut entity = record.entity;
            if !record.tasks.is_empty() {
                entity.tasks.clear();
                entity.validations.clear();
                for mut task in record.tasks {
                    sort_assignees(&mut task, &self.lookups);
                    if let Some(superseded) = entity.link_task(&task) {
                        tasks.remove(&superseded);
                    }
                    tasks.insert(task.id.clone(), task);
                }
                entity.time_spent = time_spent(&entity, &tasks);
            }
            denormalize(&mut entity, &self.episodes, &self.sequences);
            flags.observe(&entity);
            entities.push(entity);
        }

        let count = entities.len();
        self.store = EntityStore::from_entities(entities);
        self.tasks = tasks;
        self.flags = flags;
        self.rebuild();
        tracing::debug!(
            scope = %self.scope,
            kind = %self.kind,
            entities = count,
            tasks = self.tasks.len(),
            total_ms = ms(t0),
            "list data replaced"
        );
    }

    fn set_parents(&mut self, parents: Parents) {
        self.episodes = parents
            .episodes
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        self.sequences = parents
            .sequences
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
    }

    // ── mutations ──

    /// Insert or shallow-merge an entity. A merge patches the index in place
    /// and leaves the displayed rows where they are; an insert recomputes
    /// the whole view.
    pub fn upsert(&mut self, patch: EntityPatch) -> Upserted {
        let id = patch.id.clone();
        let outcome = self.store.upsert(patch);
        if let Some(entity) = self.store.get_mut(&id) {
            denormalize(entity, &self.episodes, &self.sequences);
            self.flags.observe(entity);
        }
        match outcome {
            Upserted::Inserted => self.rebuild(),
            Upserted::Merged => {
                self.cache.invalidate();
                if let Some(entity) = self.store.get(&id) {
                    self.index.patch(entity, &self.tasks, &self.lookups);
                }
                self.refresh_columns();
            }
        }
        tracing::debug!(id = %id, outcome = ?outcome, "entity upserted");
        outcome
    }

    /// Link a task to its entity, replacing any task of the same type.
    pub fn attach_task(&mut self, mut task: TaskRef) -> ListResult<()> {
        let entity_id = task.entity_id.clone();
        let Some(entity) = self.store.get_mut(&entity_id) else {
            return Err(ListError::UnknownEntity(entity_id));
        };
        sort_assignees(&mut task, &self.lookups);
        if let Some(superseded) = entity.link_task(&task) {
            self.tasks.remove(&superseded);
        }
        self.tasks.insert(task.id.clone(), task);
        self.after_task_change(&entity_id)
    }

    /// Unlink a task. Nothing changes when the task or its entity is unknown.
    pub fn detach_task(&mut self, task_id: &str) -> ListResult<()> {
        let Some(task) = self.tasks.get(task_id) else {
            return Err(ListError::UnknownTask(task_id.to_string()));
        };
        let Some(entity) = self.store.get_mut(&task.entity_id) else {
            return Err(ListError::UnknownEntity(task.entity_id.clone()));
        };
        entity.unlink_task(task);
        let entity_id = task.entity_id.clone();
        self.tasks.remove(task_id);
        self.after_task_change(&entity_id)
    }

    fn after_task_change(&mut self, entity_id: &str) -> ListResult<()> {
        let Some(entity) = self.store.get_mut(entity_id) else {
            return Err(ListError::UnknownEntity(entity_id.to_string()));
        };
        entity.time_spent = time_spent(entity, &self.tasks);
        self.flags.observe(entity);
        self.cache.invalidate();
        if let Some(entity) = self.store.get(entity_id) {
            self.index.patch(entity, &self.tasks, &self.lookups);
        }
        self.refresh_columns();
        Ok(())
    }

    /// Cancel an entity with attached work, remove it otherwise.
    pub fn delete(&mut self, id: &str) -> ListResult<Removal> {
        let removal = self
            .store
            .remove_or_cancel(id)
            .ok_or_else(|| ListError::UnknownEntity(id.to_string()))?;
        match removal {
            Removal::Canceled => {
                self.cache.invalidate();
                self.refresh_view();
            }
            Removal::Removed => self.after_removal(id),
        }
        tracing::debug!(id, removal = ?removal, "entity deleted");
        Ok(removal)
    }

    pub fn restore(&mut self, id: &str) -> ListResult<()> {
        let entity = self
            .store
            .get_mut(id)
            .ok_or_else(|| ListError::UnknownEntity(id.to_string()))?;
        entity.canceled = false;
        self.cache.invalidate();
        self.index_stale = true;
        self.ensure_index();
        self.refresh_view();
        Ok(())
    }

    /// Unconditional removal.
    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        let entity = self.store.remove(id)?;
        self.after_removal(id);
        tracing::debug!(id, "entity removed");
        Some(entity)
    }

    /// Drop every trace of a removed entity. The window keeps its length
    /// while more results are available and other rows keep their
    /// selection.
    fn after_removal(&mut self, id: &str) {
        self.tasks.retain(|_, task| task.entity_id != id);
        self.index.remove(id);
        self.cache.invalidate();

        if let Some(position) = self.result.iter().position(|e| e == id) {
            self.result.remove(position);
            if position < self.window.len() {
                self.grid.remove_row(position);
            }
            let rows = self.grid.rows();
            let len = self.window.clamp(self.result.len());
            self.grid = self.grid.resize(rows, len, self.columns.len());
        }
        self.refresh_columns();
    }

    // ── collaborator-backed mutations ──

    pub fn create_with(&mut self, source: &dyn EntitySource, entity: Entity) -> ListResult<EntityId> {
        let created = source.create(&entity)?;
        let id = created.id.clone();
        self.upsert(created.into());
        Ok(id)
    }

    /// Send `patch` to the source and merge the entity it returns. An entity
    /// unknown to this list is inserted.
    pub fn update_with(&mut self, source: &dyn EntitySource, patch: EntityPatch) -> ListResult<()> {
        let updated = source.update(&patch)?;
        self.upsert(canonical_patch(updated));
        Ok(())
    }

    pub fn delete_with(&mut self, source: &dyn EntitySource, id: &str) -> ListResult<Removal> {
        if !self.store.contains(id) {
            return Err(ListError::UnknownEntity(id.to_string()));
        }
        source.remove(id)?;
        self.delete(id)
    }

    pub fn restore_with(&mut self, source: &dyn EntitySource, id: &str) -> ListResult<()> {
        if !self.store.contains(id) {
            return Err(ListError::UnknownEntity(id.to_string()));
        }
        let restored = source.restore(id)?;
        self.upsert(canonical_patch(restored));
        self.restore(id)
    }
}
