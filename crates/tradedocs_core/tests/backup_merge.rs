use tradedocs_core::backup::import::ImportError;
use tradedocs_core::{
    BackupEnvelope, BackupService, Collection, DirectoryService, ImportMode, KnowledgeEntry,
    Preset, Project, ProjectService, Seller, Storage,
};

fn seeded_storage() -> Storage {
    let mut storage = Storage::open_in_memory().unwrap();

    let mut project = Project::new("PO-2026-018");
    ProjectService::new(&mut storage)
        .save_project(&mut project)
        .unwrap();

    let mut directory = DirectoryService::new(&mut storage);
    let mut seller = Seller::new("Qingdao Textile Export Co.");
    directory.save(&mut seller).unwrap();
    let mut preset = Preset::new("US west coast");
    directory.save(&mut preset).unwrap();
    let mut entry = KnowledgeEntry::new("towels", "100% cotton, 500gsm");
    directory.save(&mut entry).unwrap();

    storage
}

#[test]
fn export_then_replace_import_restores_everything() {
    let mut source = seeded_storage();
    let text = BackupService::new(&mut source).export_json().unwrap();

    let mut target = Storage::open_in_memory().unwrap();
    let report = BackupService::new(&mut target)
        .import_text(&text, ImportMode::Replace)
        .unwrap();

    assert_eq!(report.total_added(), 4);
    assert_eq!(report.projects.added, 1);
    assert_eq!(report.collection(Collection::Sellers).added, 1);

    let source_projects = ProjectService::new(&mut source).list_projects().unwrap();
    let target_projects = ProjectService::new(&mut target).list_projects().unwrap();
    assert_eq!(source_projects, target_projects);
}

#[test]
fn replace_import_overwrites_existing_collections() {
    let mut source = seeded_storage();
    let text = BackupService::new(&mut source).export_json().unwrap();

    let mut target = Storage::open_in_memory().unwrap();
    let mut stale = Project::new("will disappear");
    ProjectService::new(&mut target)
        .save_project(&mut stale)
        .unwrap();

    BackupService::new(&mut target)
        .import_text(&text, ImportMode::Replace)
        .unwrap();

    let projects = ProjectService::new(&mut target).list_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "PO-2026-018");
}

#[test]
fn merge_import_is_idempotent() {
    let mut source = seeded_storage();
    let text = BackupService::new(&mut source).export_json().unwrap();

    let mut target = Storage::open_in_memory().unwrap();
    let first = BackupService::new(&mut target)
        .import_text(&text, ImportMode::Merge)
        .unwrap();
    assert_eq!(first.total_added(), 4);
    assert_eq!(first.total_updated(), 0);

    let second = BackupService::new(&mut target)
        .import_text(&text, ImportMode::Merge)
        .unwrap();
    assert_eq!(second.total_added(), 0);
    assert_eq!(second.total_updated(), 0);
    assert_eq!(second.total_skipped(), 4);

    // No duplicate ids after the double import.
    let projects = ProjectService::new(&mut target).list_projects().unwrap();
    assert_eq!(projects.len(), 1);
}

#[test]
fn merge_keeps_the_newer_record_per_id() {
    let mut storage = Storage::open_in_memory().unwrap();

    let mut local = Project::new("local name");
    local.updated_at = 2_000;
    let mut incoming_older = local.clone();
    incoming_older.name = "older incoming".to_string();
    incoming_older.updated_at = 1_000;
    let mut incoming_newer = local.clone();
    incoming_newer.name = "newer incoming".to_string();
    incoming_newer.updated_at = 3_000;

    let mut store = tradedocs_core::SqliteDocStore::new(storage.connection());
    store.upsert(&local).unwrap();

    let mut envelope = BackupEnvelope::empty();
    envelope.projects = vec![incoming_older];
    let report = BackupService::new(&mut storage)
        .import_envelope(&envelope, ImportMode::Merge)
        .unwrap();
    assert_eq!(report.projects.skipped, 1);
    let kept = ProjectService::new(&mut storage)
        .get_project(&local.id)
        .unwrap()
        .unwrap();
    assert_eq!(kept.name, "local name");

    let mut envelope = BackupEnvelope::empty();
    envelope.projects = vec![incoming_newer];
    let report = BackupService::new(&mut storage)
        .import_envelope(&envelope, ImportMode::Merge)
        .unwrap();
    assert_eq!(report.projects.updated, 1);
    let replaced = ProjectService::new(&mut storage)
        .get_project(&local.id)
        .unwrap()
        .unwrap();
    assert_eq!(replaced.name, "newer incoming");
}

#[test]
fn merge_with_equal_timestamps_skips() {
    let mut storage = Storage::open_in_memory().unwrap();

    let mut local = Project::new("tie local");
    local.updated_at = 5_000;
    let mut incoming = local.clone();
    incoming.name = "tie incoming".to_string();

    let mut store = tradedocs_core::SqliteDocStore::new(storage.connection());
    store.upsert(&local).unwrap();

    let mut envelope = BackupEnvelope::empty();
    envelope.projects = vec![incoming];
    let report = BackupService::new(&mut storage)
        .import_envelope(&envelope, ImportMode::Merge)
        .unwrap();

    assert_eq!(report.projects.skipped, 1);
    let kept = ProjectService::new(&mut storage)
        .get_project(&local.id)
        .unwrap()
        .unwrap();
    assert_eq!(kept.name, "tie local");
}

#[test]
fn partial_envelope_merges_only_present_collections() {
    let mut storage = seeded_storage();
    let text = r#"{
        "meta": {"app": "tradedocs", "schema": 1, "exportedAt": 42},
        "sellers": [
            {"id": "s-import", "name": "Imported Seller", "address": "", "contact": "", "updatedAt": 42}
        ]
    }"#;

    let report = BackupService::new(&mut storage)
        .import_text(text, ImportMode::Merge)
        .unwrap();

    assert_eq!(report.sellers.added, 1);
    assert_eq!(report.projects.added, 0);
    assert_eq!(
        DirectoryService::new(&mut storage)
            .list::<Seller>()
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn malformed_or_foreign_backups_are_rejected() {
    let mut storage = Storage::open_in_memory().unwrap();
    let mut service = BackupService::new(&mut storage);

    let err = service
        .import_text("definitely not json", ImportMode::Merge)
        .unwrap_err();
    assert!(matches!(err, ImportError::Malformed(_)));

    let foreign = r#"{"meta":{"app":"somethingelse","schema":1,"exportedAt":1}}"#;
    let err = service.import_text(foreign, ImportMode::Merge).unwrap_err();
    assert!(matches!(err, ImportError::ForeignApp(_)));

    let future = r#"{"meta":{"app":"tradedocs","schema":99,"exportedAt":1}}"#;
    let err = service.import_text(future, ImportMode::Merge).unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnsupportedSchema {
            found: 99,
            supported: 1
        }
    ));
}

#[test]
fn rejected_import_leaves_store_untouched() {
    let mut storage = seeded_storage();
    let before = ProjectService::new(&mut storage).list_projects().unwrap();

    let future = r#"{"meta":{"app":"tradedocs","schema":99,"exportedAt":1},"projects":[]}"#;
    BackupService::new(&mut storage)
        .import_text(future, ImportMode::Replace)
        .unwrap_err();

    let after = ProjectService::new(&mut storage).list_projects().unwrap();
    assert_eq!(before, after);
}
