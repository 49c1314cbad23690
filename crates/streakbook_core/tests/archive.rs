use chrono::NaiveDate;
use streakbook_core::{
    AppContext, ArchiveError, ArchiveRepository, AttachmentKind, MeasurementMethod,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[test]
fn save_then_load_restores_tree_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let repo = ArchiveRepository::open(dir.path()).unwrap();
    let mut store = repo.load_workspace().unwrap();
    let music = store.create_folder("Music").unwrap();
    let piano = store
        .create_activity_in(music, "Piano", MeasurementMethod::Duration, "", AttachmentKind::Audio)
        .unwrap();
    let run = store
        .create_activity("Run", MeasurementMethod::DecimalWithUnit, "km", AttachmentKind::None)
        .unwrap();
    store.activity_mut(piano).unwrap().set_measurement(day(1), 1800.0).unwrap();
    store.activity_mut(run).unwrap().set_comment(day(2), "windy");

    let report = repo.save_workspace(&mut store).unwrap();
    assert!(report.index_written);
    assert_eq!(report.metadata_written, 2);
    assert!(!store.is_structure_dirty());

    let loaded = repo.load_workspace().unwrap();
    assert_eq!(loaded.activity_path(piano).unwrap().to_string(), "/Music");
    let piano_loaded = loaded.activity(piano).unwrap();
    assert_eq!(piano_loaded.measurement(day(1)), 1800.0);
    assert_eq!(piano_loaded.attachment_kind(), AttachmentKind::Audio);
    assert!(!piano_loaded.dirty_parts().any());
    let run_loaded = loaded.activity(run).unwrap();
    assert_eq!(run_loaded.unit(), "km");
    assert_eq!(run_loaded.comment(day(2)), Some("windy"));
}

#[test]
fn second_save_writes_only_dirty_parts() {
    let dir = tempfile::tempdir().unwrap();
    let repo = ArchiveRepository::open(dir.path()).unwrap();
    let mut store = repo.load_workspace().unwrap();
    let id = store
        .create_activity("Push-ups", MeasurementMethod::IntegerCount, "", AttachmentKind::None)
        .unwrap();
    repo.save_workspace(&mut store).unwrap();

    assert!(repo.save_workspace(&mut store).unwrap().is_noop());

    store.activity_mut(id).unwrap().add_measurement(day(5), 20.0).unwrap();
    let report = repo.save_workspace(&mut store).unwrap();
    assert_eq!(report.measurements_written, 1);
    assert_eq!(report.metadata_written, 0);
    assert_eq!(report.comments_written, 0);
    assert!(!report.index_written);
}

#[test]
fn deleted_activity_files_and_media_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let repo = ArchiveRepository::open(dir.path()).unwrap();
    let mut store = repo.load_workspace().unwrap();
    let id = store
        .create_activity("Diary", MeasurementMethod::YesNo, "", AttachmentKind::Photo)
        .unwrap();
    repo.save_workspace(&mut store).unwrap();
    let media_dir = repo.prepare_media_dir(id).unwrap();
    let photo = repo.media().media_file(id, day(1), AttachmentKind::Photo).unwrap();
    std::fs::write(&photo, b"jpeg").unwrap();
    let meta = dir.path().join("activities").join(format!("{id}.meta.json"));
    assert!(meta.exists());

    store.delete_activity(id).unwrap();
    let report = repo.save_workspace(&mut store).unwrap();
    assert_eq!(report.released_removed, 1);
    assert!(!meta.exists());
    assert!(!media_dir.exists());
    assert_eq!(repo.load_workspace().unwrap().activity_count(), 0);
}

#[test]
fn failed_release_cleanup_is_retried_without_resurrecting_others() {
    let dir = tempfile::tempdir().unwrap();
    let repo = ArchiveRepository::open(dir.path()).unwrap();
    let mut store = repo.load_workspace().unwrap();
    let blocked = store
        .create_activity("Blocked", MeasurementMethod::YesNo, "", AttachmentKind::Photo)
        .unwrap();
    let other = store
        .create_activity("Other", MeasurementMethod::YesNo, "", AttachmentKind::None)
        .unwrap();
    repo.save_workspace(&mut store).unwrap();

    // A plain file where the media directory belongs makes its removal fail.
    let blocker = repo.media().media_dir(blocked);
    std::fs::write(&blocker, b"not a directory").unwrap();

    store.delete_activity(blocked).unwrap();
    store.delete_activity(other).unwrap();
    let err = repo.save_workspace(&mut store).unwrap_err();
    assert!(matches!(err, ArchiveError::Io { .. }));

    let other_meta = dir.path().join("activities").join(format!("{other}.meta.json"));
    assert!(!other_meta.exists());
    let reloaded = repo.load_workspace().unwrap();
    assert_eq!(reloaded.activity_count(), 0);
    assert!(reloaded.activity(other).is_err());

    std::fs::remove_file(&blocker).unwrap();
    let report = repo.save_workspace(&mut store).unwrap();
    assert_eq!(report.released_removed, 1);
    assert!(store.take_released_activities().is_empty());
}

#[test]
fn index_referencing_missing_record_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let missing = uuid::Uuid::new_v4();
    std::fs::write(
        dir.path().join("structure.json"),
        serde_json::to_vec(&vec![format!("/{missing}")]).unwrap(),
    )
    .unwrap();
    let repo = ArchiveRepository::open(dir.path()).unwrap();

    let err = repo.load_workspace().unwrap_err();
    assert!(matches!(err, ArchiveError::Codec(_)));
    assert!(err.is_corrupt());
}

#[test]
fn record_with_mismatched_id_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let repo = ArchiveRepository::open(dir.path()).unwrap();
    let mut store = repo.load_workspace().unwrap();
    let id = store
        .create_activity("Run", MeasurementMethod::YesNo, "", AttachmentKind::None)
        .unwrap();
    repo.save_workspace(&mut store).unwrap();

    let activities = dir.path().join("activities");
    let other = uuid::Uuid::new_v4();
    std::fs::rename(
        activities.join(format!("{id}.meta.json")),
        activities.join(format!("{other}.meta.json")),
    )
    .unwrap();

    assert!(matches!(
        repo.load_workspace().unwrap_err(),
        ArchiveError::CorruptState(_)
    ));
}

#[test]
fn context_save_all_persists_store_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = AppContext::open(dir.path()).unwrap();
    context.store_mut().create_folder("Sport").unwrap();
    context.save_all().unwrap();

    let reopened = AppContext::open(dir.path()).unwrap();
    let root = reopened.store().root();
    assert!(reopened
        .store()
        .folder(root)
        .unwrap()
        .child_folder("Sport")
        .is_some());
}
