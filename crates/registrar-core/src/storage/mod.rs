//! # Storage Module
//!
//! Key-value backends addressed by composite [`Key`]s.
//!
//! Two implementations:
//! - [`MemoryBackend`]: `BTreeMap` behind an `RwLock` (tests, ephemeral servers)
//! - [`RedbBackend`]: redb embedded database (crash-safe, single file)
//!
//! Backends serialize individual key writes, and [`KvBackend::update_existing`]
//! rewrites one key as a single step. There is no multi-key transaction:
//! callers composing several writes get no isolation and no rollback.

mod memory;
mod redb_kv;

pub use memory::MemoryBackend;
pub use redb_kv::RedbBackend;

use crate::error::Result;
use crate::keyspace::Key;

/// A key-value store with prefix scans.
pub trait KvBackend: Send + Sync {
    /// Read the value stored at `key`.
    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite the value at `key`.
    fn set(&self, key: &Key, value: &[u8]) -> Result<()>;

    /// Remove `key`. Returns whether a value was present.
    fn delete(&self, key: &Key) -> Result<bool>;

    /// All entries whose key starts with `prefix`, in key-encoding order.
    fn scan_prefix(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>>;

    /// Replace the value at `key` with `f(current)`, with no other write to
    /// `key` in between. Returns `false` and writes nothing when `key` is
    /// absent. An error from `f` leaves the stored value unchanged.
    fn update_existing(
        &self,
        key: &Key,
        f: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<bool>;
}

// =============================================================================
// TESTS
// =============================================================================
