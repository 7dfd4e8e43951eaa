//! # Registrar Core
//!
//! The record store adapter behind the Registrar student-registration service.
//!
//! A [`StudentStore`] persists [`StudentRecord`]s in a key-value [`KvBackend`]
//! and, as a side effect of registration, upserts three denormalized lookup
//! tables (specializations, subjects, exam centers) keyed by name.
//!
//! ## Keyspace
//!
//! ```text
//! students/{id}             -> StudentRecord
//! specializations/{name}    -> Specialization
//! subjects/{name}           -> Subject
//! examCenters/{name}        -> ExamCenter
//! photos/{id}               -> Photo
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use registrar_core::{MemoryBackend, StudentStore};
//!
//! let store = StudentStore::new(MemoryBackend::new());
//! let id = store.create(draft)?;
//! let record = store.get(&id)?;
//! ```

pub mod error;
pub mod formats;
pub mod keyspace;
pub mod lookup;
pub mod registry;
pub mod storage;
pub mod student;

pub use error::{Result, StoreError};
pub use keyspace::{Key, Table};
pub use lookup::{ExamCenter, LookupEntry, Specialization, Subject};
pub use registry::{StoreCounts, StudentStore};
pub use storage::{KvBackend, MemoryBackend, RedbBackend};
pub use student::{DraftError, Photo, Status, StudentDraft, StudentId, StudentRecord};

/// Crate version, reported by the health endpoint and the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
