use streakbook_core::{
    AttachmentKind, FolderPath, MeasurementMethod, SelectionMode, StoreError, SubtreeSelection,
    WorkspaceStore,
};

#[test]
fn create_folder_from_selection_moves_selected_entries() {
    let mut store = WorkspaceStore::new();
    let root = store.root();
    let piano = store.create_folder("Piano").unwrap();
    let guitar = store.create_folder("Guitar").unwrap();
    store.create_folder_in(piano, "Etudes").unwrap();
    let theory = store
        .create_activity("Theory", MeasurementMethod::Duration, "", AttachmentKind::None)
        .unwrap();

    let mut selection = SubtreeSelection::new(SelectionMode::CreateFolder);
    selection.toggle_folder(&store, piano).unwrap();
    selection.toggle_folder(&store, guitar).unwrap();
    selection.toggle_activity(&store, theory).unwrap();

    let music = store.create_folder_from_selection("Music", &selection).unwrap();
    assert_eq!(store.folder(music).unwrap().parent(), Some(root));
    assert_eq!(store.folder_path(piano).unwrap().to_string(), "/Music/Piano");
    assert_eq!(store.folder_path(guitar).unwrap().to_string(), "/Music/Guitar");
    assert_eq!(store.owner_of(theory).unwrap(), music);
    assert!(store
        .folder_at(&FolderPath::parse("/Music/Piano/Etudes").unwrap())
        .is_ok());
}

#[test]
fn selection_containing_cursor_fails_without_changes() {
    let mut store = WorkspaceStore::new();
    let a = store.create_folder("A").unwrap();
    store.open("A").unwrap();
    store.create_folder("Inner").unwrap();
    store.open("Inner").unwrap();

    let mut selection = SubtreeSelection::new(SelectionMode::CreateFolder);
    selection.toggle_folder(&store, a).unwrap();
    let folders_before = store.folder_count();

    let err = store.create_folder_from_selection("New", &selection).unwrap_err();
    assert!(matches!(err, StoreError::CycleWouldForm { .. }));
    assert_eq!(store.folder_count(), folders_before);
}

#[test]
fn selected_names_must_be_unique() {
    let mut store = WorkspaceStore::new();
    let a = store.create_folder("A").unwrap();
    let b = store.create_folder("B").unwrap();
    let x = store
        .create_activity_in(a, "Run", MeasurementMethod::YesNo, "", AttachmentKind::None)
        .unwrap();
    let y = store
        .create_activity_in(b, "Run", MeasurementMethod::YesNo, "", AttachmentKind::None)
        .unwrap();

    let mut selection = SubtreeSelection::new(SelectionMode::CreateFolder);
    selection.toggle_activity(&store, x).unwrap();
    selection.toggle_activity(&store, y).unwrap();

    let err = store.create_folder_from_selection("Both", &selection).unwrap_err();
    assert!(matches!(err, StoreError::NameCollision { .. }));
    assert_eq!(store.owner_of(x).unwrap(), a);
    assert!(store.folder_at(&FolderPath::parse("/Both").unwrap()).is_err());
}
