//! Integration tests for Registrar CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use registrar::cli::{
    Cli, CliError, Commands, cmd_init, cmd_list, cmd_reindex, cmd_show, cmd_status,
};
use registrar::config::BackendKind;
use registrar_core::{RedbBackend, Status, StudentDraft, StudentId, StudentStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn draft(name: &str, subjects: &[&str]) -> StudentDraft {
    StudentDraft {
        name: name.to_owned(),
        university_id: format!("U-{name}"),
        whatsapp: "+15550100".to_owned(),
        status: Status::Active,
        specialization: "Physics".to_owned(),
        year_of_entry: "2023".to_owned(),
        selected_semesters: Default::default(),
        subjects: subjects.iter().map(|s| (*s).to_owned()).collect(),
        exam_center: "center1".to_owned(),
        photo_reference: None,
    }
}

/// Initialize a database and register one student. Returns its id.
fn seeded_db(dir: &TempDir) -> (PathBuf, StudentId) {
    let db_path = dir.path().join("test.redb");
    cmd_init(&db_path, false).unwrap();
    let id = open(&db_path).create(draft("Alice", &["A"])).unwrap();
    (db_path, id)
}

fn open(db_path: &Path) -> StudentStore {
    StudentStore::new(RedbBackend::open(db_path).unwrap())
}

// =============================================================================
// ARGUMENT PARSING TESTS
// =============================================================================

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["registrar", "serve"]).unwrap();
    match cli.command {
        Commands::Serve(config) => {
            assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
            assert_eq!(config.backend, BackendKind::Redb);
            assert!(config.cors_enabled());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_serve_overrides() {
    let cli = Cli::try_parse_from([
        "registrar",
        "serve",
        "--bind",
        "0.0.0.0:9000",
        "--backend",
        "memory",
        "--no-cors",
    ])
    .unwrap();
    match cli.command {
        Commands::Serve(config) => {
            assert_eq!(config.bind.port(), 9000);
            assert_eq!(config.backend, BackendKind::Memory);
            assert!(!config.cors_enabled());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_show_requires_id() {
    assert!(Cli::try_parse_from(["registrar", "show"]).is_err());
}

// =============================================================================
// INIT COMMAND TESTS
// =============================================================================

#[test]
fn test_init_creates_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");

    let result = cmd_init(&db_path, false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_fails_if_exists_without_force() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");

    cmd_init(&db_path, false).unwrap();

    let result = cmd_init(&db_path, false);
    assert!(matches!(result, Err(CliError::AlreadyExists(_))));
}

#[test]
fn test_init_with_force_resets_data() {
    let temp = create_temp_dir();
    let (db_path, id) = seeded_db(&temp);

    cmd_init(&db_path, true).unwrap();

    assert!(open(&db_path).get(&id).unwrap().is_none());
}

// =============================================================================
// READ COMMAND TESTS
// =============================================================================

#[test]
fn test_status_on_missing_database_fails() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("absent.redb");

    let result = cmd_status(&db_path, false);
    assert!(matches!(result, Err(CliError::MissingDatabase(_))));
}

#[test]
fn test_status_text_and_json() {
    let temp = create_temp_dir();
    let (db_path, _) = seeded_db(&temp);

    assert!(cmd_status(&db_path, false).is_ok());
    assert!(cmd_status(&db_path, true).is_ok());
}

#[test]
fn test_list_empty_and_seeded() {
    let temp = create_temp_dir();
    let empty = temp.path().join("empty.redb");
    cmd_init(&empty, false).unwrap();
    assert!(cmd_list(&empty, false).is_ok());

    let (db_path, _) = seeded_db(&temp);
    assert!(cmd_list(&db_path, false).is_ok());
    assert!(cmd_list(&db_path, true).is_ok());
}

#[test]
fn test_show_found_and_missing() {
    let temp = create_temp_dir();
    let (db_path, id) = seeded_db(&temp);

    assert!(cmd_show(&db_path, id.as_str()).is_ok());

    let result = cmd_show(&db_path, "nobody");
    assert!(matches!(result, Err(CliError::StudentNotFound(_))));
}

// =============================================================================
// REINDEX COMMAND TESTS
// =============================================================================

#[test]
fn test_reindex_drops_orphaned_lookups() {
    let temp = create_temp_dir();
    let (db_path, id) = seeded_db(&temp);

    {
        let store = open(&db_path);
        store.create(draft("Bob", &["B"])).unwrap();
        store.delete(&id).unwrap();
        assert_eq!(store.counts().unwrap().subjects, 2);
    }

    cmd_reindex(&db_path).unwrap();

    let store = open(&db_path);
    let subjects: Vec<_> = store
        .subjects()
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(subjects, vec!["B"]);
}
