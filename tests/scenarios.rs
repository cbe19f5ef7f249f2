//! End-to-end workflows against a store on disk.

use std::io::{Cursor, Read};

use pylabs::{
    Config, DirectoryStore, EntryKind, FileEntry, Files, ProjectService, ProjectStore,
    ServiceError, SessionState,
};
use tempfile::TempDir;
use zip::ZipArchive;

fn setup() -> (TempDir, ProjectService<DirectoryStore>) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let service = ProjectService::new(DirectoryStore::new(tmp.path()), Config::default());
    (tmp, service)
}

/// A fresh service over the same directory, as after restarting the app.
fn reopen(tmp: &TempDir) -> ProjectService<DirectoryStore> {
    ProjectService::new(DirectoryStore::new(tmp.path()), Config::default())
}

fn archive_entries(bytes: &[u8]) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        entries.push((file.name().to_string(), content));
    }
    entries.sort();
    entries
}

#[tokio::test]
async fn saved_content_survives_switching_projects() {
    let (_tmp, mut service) = setup();

    service.create_project("demo").await.unwrap();
    service.create_file("main.py").await.unwrap();
    service.save_file("print(1)").await.unwrap();
    service.select_project("other").await.unwrap();
    service.select_project("demo").await.unwrap();

    let view = service.select_file("main.py").unwrap();
    assert_eq!(view.content, "print(1)");
}

#[tokio::test]
async fn saved_content_survives_a_restart() {
    let (tmp, mut service) = setup();
    service.create_project("demo").await.unwrap();
    service.create_file("main.py").await.unwrap();
    service.save_file("print(1)").await.unwrap();
    drop(service);

    let mut service = reopen(&tmp);
    assert_eq!(service.list_projects().await.unwrap(), ["demo"]);
    service.select_project("demo").await.unwrap();
    assert_eq!(service.select_file("main.py").unwrap().content, "print(1)");
}

#[tokio::test]
async fn new_library_starts_with_empty_init() {
    let (_tmp, mut service) = setup();
    service.create_project("demo").await.unwrap();

    let name = service.create_library("utils").await.unwrap();

    assert_eq!(name, "__utils__");
    let stored = service.store().get("demo").await.unwrap().unwrap();
    assert_eq!(
        FileEntry::decode("__utils__", &stored.files()["__utils__"]),
        FileEntry::Library([("__init__.py".to_string(), String::new())].into())
    );

    let view = service.select_file("__utils__").unwrap();
    assert_eq!(view.kind, EntryKind::Library);
    assert_eq!(view.content, "");
}

#[tokio::test]
async fn invalid_library_save_leaves_stored_value_alone() {
    let (tmp, mut service) = setup();
    service.create_project("demo").await.unwrap();
    service.create_library("lib").await.unwrap();
    let before = service.files().unwrap()["__lib__"].clone();

    let result = service.save_file("{not valid json").await;

    assert!(matches!(result, Err(ServiceError::InvalidContent(_))));
    assert_eq!(service.files().unwrap()["__lib__"], before);
    let stored = reopen(&tmp).store().get("demo").await.unwrap().unwrap();
    assert_eq!(stored.files()["__lib__"], before);
    assert_eq!(service.state(), SessionState::FileSelected);
}

#[tokio::test]
async fn export_lays_out_files_and_library_folders() {
    let (tmp, mut service) = setup();
    let files = Files::from([
        ("a.py".to_string(), "x".to_string()),
        ("__lib__".to_string(), r#"{"__init__.py":"y"}"#.to_string()),
    ]);
    DirectoryStore::new(tmp.path())
        .put("demo", &files)
        .await
        .unwrap();

    service.select_project("demo").await.unwrap();
    let payload = service.export_project().unwrap();

    assert_eq!(payload.file_name("zip"), "demo.zip");
    assert_eq!(
        archive_entries(payload.bytes()),
        [
            ("__lib__/".to_string(), String::new()),
            ("__lib__/__init__.py".to_string(), "y".to_string()),
            ("a.py".to_string(), "x".to_string()),
        ]
    );
}

#[tokio::test]
async fn export_survives_clashing_archive_paths() {
    let (tmp, mut service) = setup();
    let files = Files::from([
        ("__lib__".to_string(), r#"{"__init__.py":"y"}"#.to_string()),
        ("__lib__/__init__.py".to_string(), "z".to_string()),
        ("__odd__".to_string(), r#"{"":"x"}"#.to_string()),
    ]);
    DirectoryStore::new(tmp.path())
        .put("demo", &files)
        .await
        .unwrap();

    service.select_project("demo").await.unwrap();
    let payload = service.export_project().unwrap();

    assert_eq!(
        archive_entries(payload.bytes()),
        [
            ("__lib__/".to_string(), String::new()),
            ("__lib__/__init__.py".to_string(), "z".to_string()),
            ("__odd__".to_string(), r#"{"":"x"}"#.to_string()),
        ]
    );
}

#[tokio::test]
async fn hidden_files_are_kept_but_never_shown() {
    let (tmp, mut service) = setup();
    let files = Files::from([
        (".secret".to_string(), "token".to_string()),
        ("main.py".to_string(), String::new()),
    ]);
    DirectoryStore::new(tmp.path())
        .put("demo", &files)
        .await
        .unwrap();

    service.select_project("demo").await.unwrap();

    let listed: Vec<_> = service
        .list_files()
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(listed, ["main.py"]);

    let payload = service.export_project().unwrap();
    let exported: Vec<_> = archive_entries(payload.bytes())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(exported, ["main.py"]);

    service.create_file("extra.py").await.unwrap();
    let stored = service.store().get("demo").await.unwrap().unwrap();
    assert_eq!(stored.files()[".secret"], "token");

    let pending = service.request_delete_project("demo");
    service.delete_project(pending.confirm()).await.unwrap();
    assert!(service.store().get("demo").await.unwrap().is_none());
    assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn project_names_are_unique_until_deleted() {
    let (_tmp, mut service) = setup();
    service.create_project("demo").await.unwrap();
    service.create_file("main.py").await.unwrap();

    assert!(matches!(
        service.create_project("demo").await,
        Err(ServiceError::AlreadyExists(_))
    ));

    let pending = service.request_delete_project("demo");
    service.delete_project(pending.confirm()).await.unwrap();
    service.create_project("demo").await.unwrap();

    assert!(service.list_files().unwrap().is_empty());
}
