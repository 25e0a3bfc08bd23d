use std::fs;
use tiaoji_core::{JsonFileStore, NewSchool, RecordStore, RecruitmentCount, School, StoreError};

fn school(id: u64, name: &str) -> School {
    let mut input = NewSchool::new(name);
    input.recruitment_count = if id % 2 == 0 {
        RecruitmentCount::Range("2-4".to_string())
    } else {
        RecruitmentCount::Exact(id as u32)
    };
    input.into_school(id, "2024-03-01 10:00:00")
}

#[test]
fn absent_file_loads_as_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path().join("never-created"));

    let collection = store.load().unwrap();
    assert!(collection.is_empty());
    assert_eq!(collection.next_id(), 1);
}

#[test]
fn save_then_load_roundtrips_and_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path().join("nested").join("data"));
    let records = vec![school(1, "甲大学"), school(2, "乙大学"), school(5, "丙大学")];

    store.save(&records).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.records(), records.as_slice());
    assert_eq!(loaded.last_assigned_id(), 5);
}

#[test]
fn persisted_file_is_pretty_printed_utf8_array() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    store.save(&[school(1, "甲大学")]).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("[\n    {"));
    assert!(text.contains("\"name\": \"甲大学\""));
}

#[test]
fn corrupt_file_is_reported_and_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    fs::write(store.path(), "[{\"id\": 1, \"name\": ").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::CorruptState { .. }));
    assert_eq!(
        fs::read_to_string(store.path()).unwrap(),
        "[{\"id\": 1, \"name\": "
    );
}

#[test]
fn duplicate_ids_on_disk_are_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    let text = serde_json::to_string(&vec![school(1, "甲大学"), school(1, "乙大学")]).unwrap();
    fs::write(store.path(), text).unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::CorruptState { ref message, .. } if message.contains("duplicate")));
}

#[test]
fn abandoned_staged_write_leaves_previous_collection_intact() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    let previous = vec![school(1, "甲大学"), school(2, "乙大学")];
    store.save(&previous).unwrap();

    let staged = store.stage(&[school(3, "丙大学")]).unwrap();
    let temp_path = staged.temp_path().to_path_buf();
    assert!(temp_path.exists());
    // Crash between temp write and rename: the temp file stays behind.
    std::mem::forget(staged);

    let loaded = store.load().unwrap();
    assert_eq!(loaded.records(), previous.as_slice());
    assert!(temp_path.exists());
}

#[test]
fn dropped_staged_write_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    store.save(&[school(1, "甲大学")]).unwrap();

    let staged = store.stage(&[]).unwrap();
    let temp_path = staged.temp_path().to_path_buf();
    drop(staged);

    assert!(!temp_path.exists());
    assert_eq!(store.load().unwrap().len(), 1);
}

#[test]
fn committed_staged_write_replaces_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    store.save(&[school(1, "甲大学")]).unwrap();

    store.stage(&[school(2, "乙大学")]).unwrap().commit().unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.records()[0].id, 2);
    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn save_failure_is_returned_as_value() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let store = JsonFileStore::in_dir(&blocker);

    let err = store.save(&[school(1, "甲大学")]).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(!err.to_string().is_empty());
}

#[test]
fn ensure_initialized_writes_empty_collection_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path().join("data"));

    store.ensure_initialized().unwrap();
    assert!(store.path().exists());
    assert!(store.load().unwrap().is_empty());

    store.save(&[school(1, "甲大学")]).unwrap();
    store.ensure_initialized().unwrap();
    assert_eq!(store.load().unwrap().len(), 1);
}
