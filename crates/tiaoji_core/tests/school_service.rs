use std::collections::BTreeMap;
use tiaoji_core::{
    InMemoryStore, JsonFileStore, NewSchool, RecordStore, RecruitmentCount, SchoolService,
    SchoolValidationError, ScoreRange, ScoreYear, ServiceError, StoreError,
};

fn named(name: &str) -> NewSchool {
    NewSchool::new(name)
}

fn with_2024(name: &str, max: i32, min: i32) -> NewSchool {
    let mut scores = BTreeMap::new();
    scores.insert(ScoreYear::Y2024, ScoreRange::new(max, min));
    NewSchool {
        scores,
        ..NewSchool::new(name)
    }
}

fn ids(service: &SchoolService<&InMemoryStore>) -> Vec<u64> {
    service
        .load()
        .unwrap()
        .records()
        .iter()
        .map(|school| school.id)
        .collect()
}

#[test]
fn add_then_delete_keeps_ids_monotonic() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();

    let a = service.add_school(&mut collection, named("A大学")).unwrap();
    let b = service.add_school(&mut collection, named("B大学")).unwrap();
    assert_eq!((a.id, b.id), (1, 2));

    assert!(service.delete_one(&mut collection, 1).unwrap());
    let c = service.add_school(&mut collection, named("C大学")).unwrap();
    assert_eq!(c.id, 3);
    assert_eq!(ids(&service), vec![2, 3]);
}

#[test]
fn deleting_highest_id_does_not_reuse_it_in_same_session() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();

    service.add_school(&mut collection, named("A大学")).unwrap();
    service.add_school(&mut collection, named("B大学")).unwrap();
    assert!(service.delete_one(&mut collection, 2).unwrap());

    let next = service.add_school(&mut collection, named("C大学")).unwrap();
    assert_eq!(next.id, 3);
}

#[test]
fn add_assigns_timestamp_and_zero_fills_scores() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();

    let school = service
        .add_school(&mut collection, with_2024("  甲大学 ", 380, 350))
        .unwrap();

    assert_eq!(school.name, "甲大学");
    assert_eq!(school.created_at.len(), "2024-03-01 10:00:00".len());
    assert_eq!(school.scores.get(ScoreYear::Y2024), ScoreRange::new(380, 350));
    assert_eq!(school.scores.get(ScoreYear::Y2022), ScoreRange::default());
    assert_eq!(store.persisted(), vec![school]);
}

#[test]
fn blank_name_is_rejected_without_persisting() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();

    let err = service.add_school(&mut collection, named("  ")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(SchoolValidationError::EmptyName)
    ));
    assert!(collection.is_empty());
    assert_eq!(store.save_count(), 0);
}

#[test]
fn delete_absent_id_reports_false_and_skips_save() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();
    service.add_school(&mut collection, named("A大学")).unwrap();
    let before = collection.clone();

    assert!(!service.delete_one(&mut collection, 42).unwrap());
    assert_eq!(collection, before);
    assert_eq!(store.save_count(), 1);
}

#[test]
fn batch_delete_is_independent_of_id_order() {
    let seed = |store: &InMemoryStore| {
        let service = SchoolService::new(store);
        let mut collection = service.load().unwrap();
        for name in ["A", "B", "C", "D", "E"] {
            service.add_school(&mut collection, named(name)).unwrap();
        }
        collection
    };

    let forward_store = InMemoryStore::new();
    let mut forward = seed(&forward_store);
    let removed = SchoolService::new(&forward_store)
        .delete_batch(&mut forward, [1, 3, 5])
        .unwrap();
    assert_eq!(removed, 3);

    let backward_store = InMemoryStore::new();
    let mut backward = seed(&backward_store);
    SchoolService::new(&backward_store)
        .delete_batch(&mut backward, [5, 3, 1, 3, 99])
        .unwrap();

    assert_eq!(forward.records(), backward.records());
    assert_eq!(forward_store.persisted(), backward_store.persisted());
    let remaining = forward.records().iter().map(|s| s.id).collect::<Vec<_>>();
    assert_eq!(remaining, vec![2, 4]);
}

#[test]
fn batch_delete_with_no_matches_is_a_no_op() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();
    service.add_school(&mut collection, named("A")).unwrap();

    assert_eq!(service.delete_batch(&mut collection, [7, 8]).unwrap(), 0);
    assert_eq!(service.delete_batch(&mut collection, Vec::new()).unwrap(), 0);
    assert_eq!(store.save_count(), 1);
}

#[test]
fn delete_below_thresholds_removes_low_score_lines() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();
    service
        .add_school(&mut collection, with_2024("高分", 380, 350))
        .unwrap();
    service
        .add_school(&mut collection, with_2024("低分", 320, 290))
        .unwrap();
    service
        .add_school(&mut collection, with_2024("中分", 340, 310))
        .unwrap();

    assert_eq!(service.delete_below_thresholds(&mut collection, 0, 0).unwrap(), 0);
    let removed = service
        .delete_below_thresholds(&mut collection, 300, 0)
        .unwrap();
    assert_eq!(removed, 1);
    let names = collection
        .records()
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["高分", "中分"]);
}

#[test]
fn delete_all_always_persists_and_keeps_id_counter() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();
    assert!(service.delete_all(&mut collection).unwrap());
    assert_eq!(store.save_count(), 1);

    service.add_school(&mut collection, named("A")).unwrap();
    assert!(service.delete_all(&mut collection).unwrap());
    assert!(store.persisted().is_empty());

    let next = service.add_school(&mut collection, named("B")).unwrap();
    assert_eq!(next.id, 2);
}

#[test]
fn failed_save_leaves_collection_unchanged() {
    let store = InMemoryStore::new();
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();
    service.add_school(&mut collection, named("A")).unwrap();
    service.add_school(&mut collection, named("B")).unwrap();
    let before = collection.clone();

    store.set_fail_writes(true);
    assert!(matches!(
        service.add_school(&mut collection, named("C")),
        Err(ServiceError::Store(StoreError::Io { .. }))
    ));
    assert!(service.delete_one(&mut collection, 1).is_err());
    assert!(service.delete_batch(&mut collection, [1, 2]).is_err());
    assert!(service.delete_all(&mut collection).is_err());

    assert_eq!(collection, before);
    assert_eq!(store.persisted(), before.records().to_vec());

    store.set_fail_writes(false);
    let c = service.add_school(&mut collection, named("C")).unwrap();
    assert_eq!(c.id, 3);
}

#[test]
fn file_store_survives_reload_between_services() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    {
        let service = SchoolService::new(&store);
        let mut collection = service.load().unwrap();
        let mut input = named("甲大学");
        input.recruitment_count = RecruitmentCount::Range("2-4".to_string());
        service.add_school(&mut collection, input).unwrap();
        service.add_school(&mut collection, named("乙大学")).unwrap();
    }

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(
        reloaded.records()[0].recruitment_count,
        RecruitmentCount::Range("2-4".to_string())
    );
    assert_eq!(reloaded.next_id(), 3);
}

#[test]
fn save_pass_through_writes_current_records() {
    let source = InMemoryStore::new();
    let service = SchoolService::new(&source);
    let mut collection = service.load().unwrap();
    service.add_school(&mut collection, named("A")).unwrap();

    let target = InMemoryStore::new();
    SchoolService::new(&target).save(&collection).unwrap();
    assert_eq!(target.persisted(), collection.records().to_vec());
}

#[test]
fn exhausted_id_space_is_rejected_without_persisting() {
    let last = NewSchool::new("末位大学").into_school(u64::MAX, "2024-03-01 10:00:00");
    let store = InMemoryStore::with_records(vec![last]);
    let service = SchoolService::new(&store);
    let mut collection = service.load().unwrap();

    let err = service.add_school(&mut collection, named("新大学")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(SchoolValidationError::IdConflict(id)) if id == u64::MAX
    ));
    assert_eq!(collection.len(), 1);
    assert_eq!(store.save_count(), 0);
}
