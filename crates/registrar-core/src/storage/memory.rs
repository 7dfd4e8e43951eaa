//! In-memory backend.

use super::KvBackend;
use crate::error::{Result, StoreError};
use crate::keyspace::Key;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A `BTreeMap` of encoded keys to values.
///
/// Ordered by key encoding, so prefix scans are a single range walk.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all tables.
    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned("memory backend"))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned("memory backend"))?;
        Ok(entries.get(&key.encode()).cloned())
    }

    fn set(&self, key: &Key, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("memory backend"))?;
        entries.insert(key.encode(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("memory backend"))?;
        Ok(entries.remove(&key.encode()).is_some())
    }

    fn scan_prefix(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned("memory backend"))?;
        let start = prefix.encode();

        entries
            .range(start.clone()..)
            .take_while(|(k, _)| k.starts_with(&start))
            .map(|(k, v)| Key::decode(k).map(|key| (key, v.clone())))
            .collect()
    }

    fn update_existing(
        &self,
        key: &Key,
        f: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("memory backend"))?;
        let Some(current) = entries.get_mut(&key.encode()) else {
            return Ok(false);
        };
        let next = f(current.as_slice())?;
        *current = next;
        Ok(true)
    }
}
