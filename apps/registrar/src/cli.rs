//! # CLI
//!
//! clap command tree and the offline commands that operate directly on a
//! redb database file. `serve` opens the configured store and hands off to
//! [`crate::api::serve`].

use crate::config::{DEFAULT_DATABASE, ServerConfig};
use clap::{Parser, Subcommand};
use registrar_core::{RedbBackend, StoreError, StudentId, StudentStore};
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures of CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("Database not found: {0} (run `registrar init` first)")]
    MissingDatabase(PathBuf),

    #[error("Student not found: {0}")]
    StudentNotFound(String),
}

// =============================================================================
// COMMAND TREE
// =============================================================================

/// Registrar student registration server
#[derive(Debug, Parser)]
#[command(name = "registrar")]
#[command(about = "Student registration backend over an embedded key-value store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServerConfig),

    /// Create an empty database file
    Init {
        #[arg(short, long, env = "REGISTRAR_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show entry counts per table
    Status {
        #[arg(short, long, env = "REGISTRAR_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List all students
    List {
        #[arg(short, long, env = "REGISTRAR_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Show one student
    Show {
        /// Student id
        id: String,

        #[arg(short, long, env = "REGISTRAR_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },

    /// Rebuild the lookup tables from the stored students
    Reindex {
        #[arg(short, long, env = "REGISTRAR_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Open the configured store and run the HTTP server until shutdown.
pub async fn cmd_serve(config: ServerConfig) -> Result<(), CliError> {
    tracing::info!("Registrar v{}", registrar_core::VERSION);
    let store = config.open_store()?;
    crate::api::serve(store, &config).await?;
    Ok(())
}

fn open_existing(db_path: &Path) -> Result<StudentStore, CliError> {
    if !db_path.exists() {
        return Err(CliError::MissingDatabase(db_path.to_path_buf()));
    }
    Ok(StudentStore::new(RedbBackend::open(db_path)?))
}

/// Create a fresh database file.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), CliError> {
    if db_path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path)?;
    }

    RedbBackend::open(db_path)?;
    tracing::info!(path = %db_path.display(), "Initialized database");
    println!("Initialized empty database at {}", db_path.display());
    Ok(())
}

/// Print entry counts per table.
pub fn cmd_status(db_path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_existing(db_path)?;
    let counts = store.counts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!("Database:        {}", db_path.display());
        println!("Students:        {}", counts.students);
        println!("Specializations: {}", counts.specializations);
        println!("Subjects:        {}", counts.subjects);
        println!("Exam centers:    {}", counts.exam_centers);
    }
    Ok(())
}

/// Print every student.
pub fn cmd_list(db_path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_existing(db_path)?;
    let students = store.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&students)?);
        return Ok(());
    }

    if students.is_empty() {
        println!("(no students)");
    }
    for s in &students {
        println!(
            "{}  {}  {}  {}  {}",
            s.id, s.name, s.university_id, s.status, s.specialization
        );
    }
    Ok(())
}

/// Print one student as JSON.
pub fn cmd_show(db_path: &Path, id: &str) -> Result<(), CliError> {
    let store = open_existing(db_path)?;
    let record = store
        .get(&StudentId::new(id))?
        .ok_or_else(|| CliError::StudentNotFound(id.to_owned()))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Drop orphaned lookup entries by re-deriving the tables.
pub fn cmd_reindex(db_path: &Path) -> Result<(), CliError> {
    let store = open_existing(db_path)?;
    let counts = store.rebuild_lookups()?;

    tracing::info!(
        specializations = counts.specializations,
        subjects = counts.subjects,
        exam_centers = counts.exam_centers,
        "Rebuilt lookup tables"
    );
    println!(
        "Rebuilt lookups from {} students: {} specializations, {} subjects, {} exam centers",
        counts.students, counts.specializations, counts.subjects, counts.exam_centers
    );
    Ok(())
}
