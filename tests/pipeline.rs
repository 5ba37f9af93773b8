use shotlist::error::{ListError, SourceError};
use shotlist::model::{Entity, EntityKind, EntityPatch, TaskRef};
use shotlist::scope::LoadPhase;
use shotlist::source::{fetch_payload, EntityRecord, Parents};
use shotlist::stats::{ParentKey, StatusCount};
use shotlist::store::{Removal, Upserted};
use shotlist::{
    EntityList, EntitySource, JsonSnapshot, ListConfig, Scope, ScopeRegistry, SortField, SortSpec,
};

const SNAPSHOT: &str = r#"{
    "task_types": [
        {"id": "anim", "name": "Animation", "priority": 1},
        {"id": "comp", "name": "Compositing", "priority": 2},
        {"id": "fx", "name": "FX", "priority": 3}
    ],
    "task_statuses": [
        {"id": "st-wip", "short_name": "wip"},
        {"id": "st-wfa", "short_name": "wfa"},
        {"id": "st-done", "short_name": "done", "is_done": true}
    ],
    "people": [{"id": "p1", "name": "Ann Lee"}],
    "sequences": [
        {"id": "sq1", "kind": "sequence", "name": "SQ01", "production_id": "p1"},
        {"id": "sq2", "kind": "sequence", "name": "SQ02", "production_id": "p1"}
    ],
    "shots": [
        {"id": "sh1", "kind": "shot", "name": "SH010", "production_id": "p1", "parent_id": "sq1",
         "nb_frames": 10, "description": "hero shot"},
        {"id": "sh2", "kind": "shot", "name": "SH020", "production_id": "p1", "parent_id": "sq1",
         "nb_frames": 20, "data": {"fps": "24"}},
        {"id": "sh3", "kind": "shot", "name": "SH010", "production_id": "p1", "parent_id": "sq2",
         "nb_frames": 30},
        {"id": "sh4", "kind": "shot", "name": "SH020", "production_id": "p1", "parent_id": "sq2",
         "nb_frames": 40},
        {"id": "sh5", "kind": "shot", "name": "SH030", "production_id": "p1", "parent_id": "sq2",
         "nb_frames": 50}
    ],
    "tasks": [
        {"id": "t1", "entity_id": "sh1", "task_type_id": "anim", "task_status_id": "st-wfa",
         "assignees": ["p1"], "duration": 10},
        {"id": "t2", "entity_id": "sh1", "task_type_id": "comp", "task_status_id": "st-wip",
         "duration": 5},
        {"id": "t3", "entity_id": "sh2", "task_type_id": "anim", "task_status_id": "st-wip"},
        {"id": "t4", "entity_id": "sh3", "task_type_id": "anim", "task_status_id": "st-done"}
    ]
}"#;

// ── fixtures ──

fn config() -> ListConfig {
    ListConfig {
        page_size: 2,
        ..ListConfig::default()
    }
}

fn scope() -> Scope {
    Scope::production("p1")
}

fn snapshot() -> JsonSnapshot {
    JsonSnapshot::from_json(SNAPSHOT).unwrap()
}

fn loaded(kind: EntityKind) -> (EntityList, JsonSnapshot) {
    let source = snapshot();
    let mut list = EntityList::new(kind, scope(), config(), source.lookups());
    list.load_from(&source).unwrap();
    (list, source)
}

fn ids(entities: &[&Entity]) -> Vec<String> {
    entities.iter().map(|e| e.id.clone()).collect()
}

fn displayed(list: &EntityList) -> Vec<String> {
    ids(&list.displayed())
}

fn result(list: &EntityList) -> Vec<String> {
    ids(&list.result())
}

struct OfflineSource;

impl EntitySource for OfflineSource {
    fn fetch_entities(
        &self,
        _scope: &Scope,
        _kind: EntityKind,
    ) -> Result<Vec<EntityRecord>, SourceError> {
        Err(SourceError::Transport("offline".into()))
    }

    fn fetch_parents(&self, _scope: &Scope) -> Result<Parents, SourceError> {
        Err(SourceError::Transport("offline".into()))
    }

    fn create(&self, _entity: &Entity) -> Result<Entity, SourceError> {
        Err(SourceError::Transport("offline".into()))
    }

    fn update(&self, _patch: &EntityPatch) -> Result<Entity, SourceError> {
        Err(SourceError::Transport("offline".into()))
    }

    fn remove(&self, _id: &str) -> Result<(), SourceError> {
        Err(SourceError::Transport("offline".into()))
    }

    fn restore(&self, _id: &str) -> Result<Entity, SourceError> {
        Err(SourceError::Transport("offline".into()))
    }
}

// ── load ──

#[test]
fn load_denormalizes_and_orders_naturally() {
    let (list, _) = loaded(EntityKind::Shot);
    assert_eq!(result(&list), vec!["sh1", "sh2", "sh3", "sh4", "sh5"]);
    assert_eq!(displayed(&list), vec!["sh1", "sh2"]);

    let sh3 = list.get("sh3").unwrap();
    assert_eq!(sh3.sequence_name.as_deref(), Some("SQ02"));
    assert_eq!(sh3.sequence_id.as_deref(), Some("sq2"));
    assert_eq!(list.get("sh1").unwrap().time_spent, 15);

    assert_eq!(list.validation_columns(), ["anim", "comp"]);
    assert_eq!(list.selection().rows(), 2);
    assert_eq!(list.selection().cols(), 2);
    assert_eq!(list.load_state().phase, LoadPhase::Ready);
}

#[test]
fn column_flags_follow_loaded_values() {
    let (list, _) = loaded(EntityKind::Shot);
    let flags = list.column_flags();
    assert!(flags.fps);
    assert!(flags.description);
    assert!(flags.frames);
    assert!(flags.time);
    assert!(!flags.frame_in);
    assert!(!flags.frame_out);
}

#[test]
fn overlapping_load_is_rejected() {
    let source = snapshot();
    let mut list = EntityList::new(EntityKind::Shot, scope(), config(), source.lookups());
    let _ticket = list.begin_load().unwrap();
    match list.begin_load() {
        Err(ListError::AlreadyLoading(s)) => assert_eq!(s, scope()),
        other => panic!("expected AlreadyLoading, got {:?}", other),
    }
}

#[test]
fn stale_completion_is_discarded() {
    let source = snapshot();
    let mut list = EntityList::new(EntityKind::Shot, scope(), config(), source.lookups());
    let stale = list.begin_load().unwrap();
    list.reset();
    let current = list.begin_load().unwrap();

    let payload = fetch_payload(&source, &scope(), EntityKind::Shot);
    match list.finish_load(stale, payload) {
        Err(ListError::StaleLoad { expected, got }) => {
            assert_eq!(expected, current.generation);
            assert!(got < expected);
        }
        other => panic!("expected StaleLoad, got {:?}", other),
    }
    assert!(list.is_empty());
    assert!(list.is_loading());

    let payload = fetch_payload(&source, &scope(), EntityKind::Shot);
    list.finish_load(current, payload).unwrap();
    assert_eq!(list.len(), 5);
}

#[test]
fn failed_load_keeps_last_good_data() {
    let (mut list, _) = loaded(EntityKind::Shot);
    match list.load_from(&OfflineSource) {
        Err(ListError::Source(SourceError::Transport(msg))) => assert_eq!(msg, "offline"),
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(result(&list).len(), 5);
    assert_eq!(displayed(&list), vec!["sh1", "sh2"]);
    assert_eq!(list.load_state().phase, LoadPhase::Error);
    assert!(list.load_state().error.is_some());
    assert!(!list.is_loading());
}

#[test]
fn registry_loads_each_scope_under_its_own_lock() {
    let source = snapshot();
    let registry = ScopeRegistry::new(EntityKind::Shot, config(), source.lookups());
    registry.load(&scope(), &source).unwrap();
    assert_eq!(registry.list(&scope()).lock().len(), 5);

    let other = Scope::episode("p1", "missing");
    assert!(registry.load(&other, &OfflineSource).is_err());
    let list = registry.list(&other);
    assert_eq!(list.lock().load_state().phase, LoadPhase::Error);
    assert!(list.lock().is_empty());
}

// ── search, sort, window ──

#[test]
fn natural_order_groups_by_sequence_then_name() {
    let mut list = EntityList::new(EntityKind::Shot, scope(), config(), Default::default());
    for (id, name) in [("1", "b"), ("2", "a")] {
        let mut entity = Entity::new(id, EntityKind::Shot, name);
        entity.sequence_name = Some("SQ01".into());
        assert_eq!(list.upsert(entity.into()), Upserted::Inserted);
    }
    assert_eq!(displayed(&list), vec!["2", "1"]);
}

#[test]
fn window_grows_by_page_and_clamps() {
    let (mut list, _) = loaded(EntityKind::Shot);
    assert_eq!(list.window_len(), 2);
    assert_eq!(list.grow_window(), 4);
    assert_eq!(list.grow_window(), 5);
    assert_eq!(list.grow_window(), 5);
    assert_eq!(list.selection().rows(), 5);
    assert_eq!(list.stats().count, 5);
    assert_eq!(list.stats().total_frames, 150);
}

#[test]
fn growth_keeps_selection() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.toggle_selection(1, 0);
    list.grow_window();
    assert_eq!(list.selection().rows(), 4);
    assert_eq!(list.selection().selected(), vec![(1, 0)]);
    // Out of range toggles are ignored.
    assert!(!list.toggle_selection(9, 0));
}

#[test]
fn status_filter_keeps_matching_entities() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.apply_search("status:wfa");
    assert_eq!(result(&list), vec!["sh1"]);
    list.apply_search("-status:wfa sq01");
    assert_eq!(result(&list), vec!["sh2"]);
    list.apply_search("animation:done");
    assert_eq!(result(&list), vec!["sh3"]);
}

#[test]
fn unknown_keyword_gives_empty_view() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.apply_search("nothing-like-this");
    assert!(list.displayed().is_empty());
    assert_eq!(list.selection().rows(), 0);
    assert_eq!(list.stats().count, 0);
}

#[test]
fn new_search_resets_window_and_selection() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.grow_window();
    list.toggle_selection(0, 0);
    list.apply_search("sq02");
    assert_eq!(result(&list), vec!["sh3", "sh4", "sh5"]);
    assert_eq!(list.window_len(), 2);
    assert!(list.selection().selected().is_empty());
    assert_eq!(list.validation_columns(), ["anim"]);
}

#[test]
fn assignee_alias_and_keyword_search() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.apply_search("@ann");
    assert_eq!(result(&list), vec!["sh1"]);
    list.apply_search("lee");
    assert_eq!(result(&list), vec!["sh1"]);
}

#[test]
fn task_status_sort_puts_missing_last() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.apply_sort(vec![SortSpec::ascending(SortField::TaskStatus("anim".into()))]);
    assert_eq!(result(&list), vec!["sh3", "sh1", "sh2", "sh4", "sh5"]);
    list.apply_sort(vec![SortSpec::descending(SortField::Frames)]);
    assert_eq!(result(&list), vec!["sh5", "sh4", "sh3", "sh2", "sh1"]);
    assert_eq!(list.window_len(), 2);
}

#[test]
fn stats_cover_window_and_result() {
    let (list, _) = loaded(EntityKind::Shot);
    assert_eq!(list.stats().count, 2);
    assert_eq!(list.stats().total_frames, 30);
    assert_eq!(list.stats().total_time_spent, 15);
    assert_eq!(list.result_stats().count, 5);
    assert_eq!(list.result_stats().total_frames, 150);
}

#[test]
fn filled_columns_track_displayed_rows() {
    let (mut list, _) = loaded(EntityKind::Shot);
    assert!(list.filled_columns().contains("comp"));
    list.apply_search("sq02");
    assert!(!list.filled_columns().contains("comp"));
    assert!(list.filled_columns().contains("anim"));
}

#[test]
fn displayed_rows_group_by_parent() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.grow_window();
    let groups = list.displayed_by_parent();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].parent_name, Some("SQ01"));
    assert_eq!(ids(&groups[0].entities), vec!["sh1", "sh2"]);
    assert_eq!(groups[1].parent_name, Some("SQ02"));
    assert_eq!(ids(&groups[1].entities), vec!["sh3", "sh4"]);
}

#[test]
fn selected_cells_resolve_to_tasks() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.select_many(&[(0, 0), (0, 1), (1, 1)], true);
    let tasks: Vec<&str> = list.selected_tasks().iter().map(|t| t.id.as_str()).collect();
    // (1, 1) is an empty cell: sh2 has no compositing task.
    assert_eq!(tasks, vec!["t1", "t2"]);
    list.clear_selection();
    assert!(list.selected_tasks().is_empty());
}

#[test]
fn sequence_lists_use_keywords_and_larger_pages() {
    let (mut list, _) = loaded(EntityKind::Sequence);
    assert_eq!(displayed(&list), vec!["sq1", "sq2"]);
    list.apply_search("status:wfa");
    assert_eq!(result(&list), vec!["sq1", "sq2"]);
    list.apply_search("sq02");
    assert_eq!(result(&list), vec!["sq2"]);
}

// ── mutations ──

#[test]
fn merge_keeps_rows_and_patches_index() {
    let (mut list, _) = loaded(EntityKind::Shot);
    let mut patch = EntityPatch::new("sh2");
    patch.name = Some("ZZZ".into());
    assert_eq!(list.upsert(patch), Upserted::Merged);
    assert_eq!(displayed(&list), vec!["sh1", "sh2"]);
    list.apply_search("zzz");
    assert_eq!(result(&list), vec!["sh2"]);
}

#[test]
fn insert_recomputes_view_with_parent_names() {
    let (mut list, _) = loaded(EntityKind::Shot);
    let mut shot = Entity::new("sh6", EntityKind::Shot, "SH015");
    shot.parent_id = Some("sq1".into());
    assert_eq!(list.upsert(shot.into()), Upserted::Inserted);
    assert_eq!(displayed(&list), vec!["sh1", "sh6"]);
    assert_eq!(list.get("sh6").unwrap().sequence_name.as_deref(), Some("SQ01"));
}

#[test]
fn delete_cancels_worked_entities_then_removes() {
    let (mut list, _) = loaded(EntityKind::Shot);
    assert_eq!(list.delete("sh1").unwrap(), Removal::Canceled);
    assert!(list.get("sh1").unwrap().canceled);
    assert_eq!(result(&list).len(), 5);

    assert_eq!(list.delete("sh1").unwrap(), Removal::Removed);
    assert!(list.get("sh1").is_none());
    assert!(list.task("t1").is_none());
    assert_eq!(list.delete("sh5").unwrap(), Removal::Removed);
    assert_eq!(result(&list), vec!["sh2", "sh3", "sh4"]);
    assert!(matches!(list.delete("sh5"), Err(ListError::UnknownEntity(_))));
}

#[test]
fn restore_clears_cancel_flag() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.delete("sh1").unwrap();
    list.restore("sh1").unwrap();
    assert!(!list.get("sh1").unwrap().canceled);
    assert!(matches!(list.restore("nope"), Err(ListError::UnknownEntity(_))));
}

#[test]
fn remove_keeps_window_length_and_other_selections() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.set_selection(0, 1, true);
    list.set_selection(1, 0, true);
    let removed = list.remove("sh2").unwrap();
    assert_eq!(removed.id, "sh2");
    assert_eq!(displayed(&list), vec!["sh1", "sh3"]);
    assert_eq!(list.validation_columns(), ["anim", "comp"]);
    assert_eq!(list.selection().rows(), 2);
    assert_eq!(list.selection().selected(), vec![(0, 1)]);
    assert!(list.remove("sh2").is_none());
}

#[test]
fn remove_recomputes_columns_of_first_page() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.set_selection(1, 0, true);
    list.remove("sh1").unwrap();
    assert_eq!(displayed(&list), vec!["sh2", "sh3"]);
    assert_eq!(list.validation_columns(), ["anim"]);
    assert_eq!(list.selection().cols(), 1);
    assert!(list.selection().selected().is_empty());

    list.apply_search("");
    assert_eq!(list.validation_columns(), ["anim"]);
}

#[test]
fn attach_of_same_type_forgets_replaced_task() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.attach_task(TaskRef {
        id: "t9".into(),
        entity_id: "sh1".into(),
        task_type_id: "anim".into(),
        task_status_id: "st-done".into(),
        assignees: vec![],
        duration: 3,
    })
    .unwrap();
    assert!(list.task("t1").is_none());
    let sh1 = list.get("sh1").unwrap();
    assert_eq!(sh1.validations["anim"], "t9");
    assert_eq!(sh1.tasks, vec!["t2".to_string(), "t9".to_string()]);
    assert_eq!(sh1.time_spent, 8);
    assert!(matches!(list.detach_task("t1"), Err(ListError::UnknownTask(_))));

    list.apply_search("status:wfa");
    assert!(result(&list).is_empty());
}

#[test]
fn attach_and_detach_update_columns_and_index() {
    let (mut list, _) = loaded(EntityKind::Shot);
    list.toggle_selection(0, 0);
    list.attach_task(TaskRef {
        id: "t9".into(),
        entity_id: "sh2".into(),
        task_type_id: "fx".into(),
        task_status_id: "st-wip".into(),
        assignees: vec!["p1".into()],
        duration: 7,
    })
    .unwrap();
    assert_eq!(list.validation_columns(), ["anim", "comp", "fx"]);
    assert_eq!(list.selection().cols(), 3);
    assert!(list.selection().selected().is_empty());
    assert_eq!(list.get("sh2").unwrap().time_spent, 7);

    list.apply_search("lee");
    assert_eq!(result(&list), vec!["sh1", "sh2"]);

    list.detach_task("t9").unwrap();
    assert_eq!(list.validation_columns(), ["anim", "comp"]);
    assert_eq!(list.get("sh2").unwrap().time_spent, 0);
    assert!(matches!(list.detach_task("t9"), Err(ListError::UnknownTask(_))));
    assert!(matches!(
        list.attach_task(TaskRef {
            id: "t10".into(),
            entity_id: "ghost".into(),
            task_type_id: "fx".into(),
            task_status_id: "st-wip".into(),
            assignees: vec![],
            duration: 0,
        }),
        Err(ListError::UnknownEntity(_))
    ));
}

#[test]
fn collaborator_mutations_reach_both_sides() {
    let (mut list, source) = loaded(EntityKind::Shot);

    let mut shot = Entity::new("", EntityKind::Shot, "SH040");
    shot.parent_id = Some("sq2".into());
    shot.production_id = Some("p1".into());
    let id = list.create_with(&source, shot).unwrap();
    assert_eq!(list.get(&id).unwrap().sequence_name.as_deref(), Some("SQ02"));
    assert!(source.document().shots.iter().any(|s| s.id == id));

    let mut patch = EntityPatch::new("sh5");
    patch.nb_frames = Some(99);
    list.update_with(&source, patch).unwrap();
    assert_eq!(list.get("sh5").unwrap().nb_frames, 99);

    assert_eq!(list.delete_with(&source, "sh1").unwrap(), Removal::Canceled);
    list.restore_with(&source, "sh1").unwrap();
    assert!(!list.get("sh1").unwrap().canceled);

    assert!(matches!(
        list.update_with(&OfflineSource, EntityPatch::new("sh5")),
        Err(ListError::Source(_))
    ));
    assert!(matches!(
        list.delete_with(&source, "ghost"),
        Err(ListError::UnknownEntity(_))
    ));
}

#[test]
fn reparented_shot_follows_its_new_sequence() {
    let (mut list, source) = loaded(EntityKind::Shot);
    let mut patch = EntityPatch::new("sh5");
    patch.parent_id = Some("sq1".into());
    list.update_with(&source, patch).unwrap();

    let sh5 = list.get("sh5").unwrap();
    assert_eq!(sh5.sequence_id.as_deref(), Some("sq1"));
    assert_eq!(sh5.sequence_name.as_deref(), Some("SQ01"));

    list.apply_search("sq01");
    assert_eq!(result(&list), vec!["sh1", "sh2", "sh5"]);
    list.apply_search("sq02");
    assert_eq!(result(&list), vec!["sh3", "sh4"]);
}

#[test]
fn reparenting_to_unknown_sequence_clears_stale_name() {
    let (mut list, _) = loaded(EntityKind::Shot);
    let mut patch = EntityPatch::new("sh5");
    patch.parent_id = Some("sq9".into());
    list.upsert(patch);
    let sh5 = list.get("sh5").unwrap();
    assert_eq!(sh5.sequence_id.as_deref(), Some("sq9"));
    assert_eq!(sh5.sequence_name, None);
}

/// Source that normalizes names the way a server would.
struct NormalizingSource(JsonSnapshot);

impl EntitySource for NormalizingSource {
    fn fetch_entities(
        &self,
        scope: &Scope,
        kind: EntityKind,
    ) -> Result<Vec<EntityRecord>, SourceError> {
        self.0.fetch_entities(scope, kind)
    }

    fn fetch_parents(&self, scope: &Scope) -> Result<Parents, SourceError> {
        self.0.fetch_parents(scope)
    }

    fn create(&self, entity: &Entity) -> Result<Entity, SourceError> {
        self.0.create(entity)
    }

    fn update(&self, patch: &EntityPatch) -> Result<Entity, SourceError> {
        let mut patch = patch.clone();
        patch.name = patch.name.map(|n| n.trim().to_uppercase());
        self.0.update(&patch)
    }

    fn remove(&self, id: &str) -> Result<(), SourceError> {
        self.0.remove(id)
    }

    fn restore(&self, id: &str) -> Result<Entity, SourceError> {
        self.0.restore(id)
    }
}

#[test]
fn update_keeps_entity_returned_by_source() {
    let (mut list, source) = loaded(EntityKind::Shot);
    let source = NormalizingSource(source);
    let mut patch = EntityPatch::new("sh1");
    patch.name = Some(" sh099 ".into());
    list.update_with(&source, patch).unwrap();

    let sh1 = list.get("sh1").unwrap();
    assert_eq!(sh1.name, "SH099");
    assert_eq!(sh1.validations.len(), 2);
    assert_eq!(sh1.time_spent, 15);
    list.apply_search("sh099");
    assert_eq!(result(&list), vec!["sh1"]);
}

#[test]
fn update_of_entity_missing_locally_inserts_it() {
    let (mut list, source) = loaded(EntityKind::Shot);
    list.remove("sh5").unwrap();
    let mut patch = EntityPatch::new("sh5");
    patch.nb_frames = Some(12);
    list.update_with(&source, patch).unwrap();

    let sh5 = list.get("sh5").unwrap();
    assert_eq!(sh5.nb_frames, 12);
    assert_eq!(sh5.sequence_name.as_deref(), Some("SQ02"));
    assert_eq!(result(&list).len(), 5);
    assert!(matches!(
        list.update_with(&source, EntityPatch::new("ghost")),
        Err(ListError::Source(SourceError::NotFound(_)))
    ));
}

// ── derived views ──

#[test]
fn pending_lists_entities_waiting_for_approval() {
    let (list, _) = loaded(EntityKind::Shot);
    assert_eq!(ids(&list.pending()), vec!["sh1"]);
}

#[test]
fn breakdown_per_sequence() {
    let (list, _) = loaded(EntityKind::Shot);
    let stats = list.breakdown(ParentKey::Sequence);
    assert_eq!(
        stats.parents["sq1"].status("anim", "st-wfa"),
        StatusCount { count: 1, frames: 10 }
    );
    assert_eq!(
        stats.parents["sq1"].status("anim", "st-wip"),
        StatusCount { count: 1, frames: 20 }
    );
    assert_eq!(stats.parents["sq2"].status("anim", "st-done").count, 1);
    assert_eq!(stats.all.by_task_type["anim"].all.count, 3);
}

#[test]
fn saved_searches_stay_sorted_by_name() {
    let (mut list, _) = loaded(EntityKind::Shot);
    assert!(list.save_search("waiting", "status:wfa"));
    assert!(list.save_search("Anim", "animation:wip"));
    assert!(!list.save_search("waiting", "status:wip"));
    let names: Vec<&str> = list.saved_searches().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Anim", "waiting"]);
    assert_eq!(list.saved_searches()[1].query, "status:wfa");
    assert!(list.remove_search("Anim"));
    assert!(!list.remove_search("Anim"));
}
