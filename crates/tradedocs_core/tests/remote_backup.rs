use std::cell::RefCell;
use std::collections::BTreeMap;
use tradedocs_core::service::BackupError;
use tradedocs_core::sync::{RemoteBackupStore, SyncError, SyncResult};
use tradedocs_core::{
    BackupService, ImportMode, Project, ProjectService, Storage,
};

/// In-memory stand-in for a WebDAV endpoint.
struct MockRemote {
    files: RefCell<BTreeMap<String, String>>,
    fail_transport: bool,
}

impl MockRemote {
    fn new() -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            fail_transport: false,
        }
    }

    fn failing() -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            fail_transport: true,
        }
    }
}

impl RemoteBackupStore for MockRemote {
    fn ensure_remote_dir(&self) -> SyncResult<()> {
        if self.fail_transport {
            return Err(SyncError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn upload(&self, file_name: &str, body: &str) -> SyncResult<()> {
        if self.fail_transport {
            return Err(SyncError::Transport("connection refused".to_string()));
        }
        self.files
            .borrow_mut()
            .insert(file_name.to_string(), body.to_string());
        Ok(())
    }

    fn list_backups(&self) -> SyncResult<Vec<String>> {
        Ok(self.files.borrow().keys().rev().cloned().collect())
    }

    fn download(&self, file_name: &str) -> SyncResult<String> {
        self.files
            .borrow()
            .get(file_name)
            .cloned()
            .ok_or_else(|| SyncError::BackupNotFound(file_name.to_string()))
    }
}

#[test]
fn backup_and_restore_roundtrip_through_remote() {
    let mut source = Storage::open_in_memory().unwrap();
    let mut project = Project::new("PO-2026-042");
    ProjectService::new(&mut source)
        .save_project(&mut project)
        .unwrap();

    let remote = MockRemote::new();
    let file_name = BackupService::new(&mut source)
        .backup_to_remote(&remote)
        .unwrap();
    assert!(file_name.starts_with("tradedocs-backup-"));
    assert!(file_name.ends_with(".dsp"));

    let mut target = Storage::open_in_memory().unwrap();
    let report = BackupService::new(&mut target)
        .restore_latest_from_remote(&remote, ImportMode::Merge)
        .unwrap();
    assert_eq!(report.projects.added, 1);

    let restored = ProjectService::new(&mut target)
        .get_project(&project.id)
        .unwrap()
        .unwrap();
    assert_eq!(restored, project);
}

#[test]
fn restore_latest_picks_the_newest_named_backup() {
    let remote = MockRemote::new();
    let older = r#"{"meta":{"app":"tradedocs","schema":1,"exportedAt":100},
        "projects":[{"id":"p1","name":"older","header":{"invoiceNo":"","contractNo":"","date":"","sellerId":null,"consigneeId":null,"currency":"","tradeTerms":"","portOfLoading":"","portOfDestination":"","countryOfOrigin":"","remarks":""},"items":[],"settlement":{"fxItems":[],"costItems":[],"extraExpenses":[]},"createdAt":100,"updatedAt":100}]}"#;
    let newer = r#"{"meta":{"app":"tradedocs","schema":1,"exportedAt":200},
        "projects":[{"id":"p1","name":"newer","header":{"invoiceNo":"","contractNo":"","date":"","sellerId":null,"consigneeId":null,"currency":"","tradeTerms":"","portOfLoading":"","portOfDestination":"","countryOfOrigin":"","remarks":""},"items":[],"settlement":{"fxItems":[],"costItems":[],"extraExpenses":[]},"createdAt":100,"updatedAt":200}]}"#;
    remote.upload("tradedocs-backup-100.dsp", older).unwrap();
    remote.upload("tradedocs-backup-200.dsp", newer).unwrap();

    let mut storage = Storage::open_in_memory().unwrap();
    BackupService::new(&mut storage)
        .restore_latest_from_remote(&remote, ImportMode::Replace)
        .unwrap();

    let project = ProjectService::new(&mut storage)
        .get_project("p1")
        .unwrap()
        .unwrap();
    assert_eq!(project.name, "newer");
}

#[test]
fn restore_latest_from_empty_remote_reports_no_backups() {
    let mut storage = Storage::open_in_memory().unwrap();
    let err = BackupService::new(&mut storage)
        .restore_latest_from_remote(&MockRemote::new(), ImportMode::Merge)
        .unwrap_err();
    assert!(matches!(err, BackupError::NoRemoteBackups));
}

#[test]
fn missing_named_backup_surfaces_not_found() {
    let mut storage = Storage::open_in_memory().unwrap();
    let err = BackupService::new(&mut storage)
        .restore_from_remote(&MockRemote::new(), "tradedocs-backup-1.dsp", ImportMode::Merge)
        .unwrap_err();
    assert!(matches!(
        err,
        BackupError::Sync(SyncError::BackupNotFound(_))
    ));
}

#[test]
fn transport_failure_surfaces_without_local_side_effects() {
    let mut storage = Storage::open_in_memory().unwrap();
    let mut project = Project::new("survives");
    ProjectService::new(&mut storage)
        .save_project(&mut project)
        .unwrap();

    let err = BackupService::new(&mut storage)
        .backup_to_remote(&MockRemote::failing())
        .unwrap_err();
    assert!(matches!(err, BackupError::Sync(SyncError::Transport(_))));

    let projects = ProjectService::new(&mut storage).list_projects().unwrap();
    assert_eq!(projects.len(), 1);
}
