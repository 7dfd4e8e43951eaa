//! redb-backed key-value store.
//!
//! Uses redb embedded database for:
//! - ACID transactions (one per key write or read-modify-write)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Every entry lives in a single table of encoded key bytes to value bytes.

use super::KvBackend;
use crate::error::Result;
use crate::keyspace::Key;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// The single table holding every keyspace entry.
const ENTRIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entries");

/// A [`KvBackend`] persisted in a redb database file.
pub struct RedbBackend {
    db: Database,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend").finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Open the database at `path`, creating the file and table if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path)?;

        // Make sure the table exists so read transactions can open it.
        let txn = db.begin_write()?;
        txn.open_table(ENTRIES)?;
        txn.commit()?;

        Ok(Self { db })
    }
}

impl KvBackend for RedbBackend {
    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        let encoded = key.encode();
        let value = table.get(encoded.as_slice())?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn set(&self, key: &Key, value: &[u8]) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            let encoded = key.encode();
            table.insert(encoded.as_slice(), value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(ENTRIES)?;
            let encoded = key.encode();
            let removed = table.remove(encoded.as_slice())?;
            removed.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    fn scan_prefix(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        let start = prefix.encode();

        let mut out = Vec::new();
        for entry in table.range::<&[u8]>(start.as_slice()..)? {
            let (k, v) = entry?;
            if !k.value().starts_with(&start) {
                break;
            }
            out.push((Key::decode(k.value())?, v.value().to_vec()));
        }
        Ok(out)
    }

    fn update_existing(
        &self,
        key: &Key,
        f: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<bool> {
        // The read and the write share one write transaction; redb admits a
        // single writer at a time. Returning early drops `txn`, which aborts it.
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(ENTRIES)?;
            let encoded = key.encode();
            let current = table.get(encoded.as_slice())?.map(|guard| guard.value().to_vec());
            match current {
                Some(bytes) => {
                    let next = f(&bytes)?;
                    table.insert(encoded.as_slice(), next.as_slice())?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::keyspace::Table;
    use crate::storage::conformance;
    use tempfile::TempDir;

    #[test]
    fn conforms_to_backend_contract() {
        let dir = tempfile::tempdir().unwrap();
        let counter = std::cell::Cell::new(0_u32);
        conformance::run_all(|| {
            counter.set(counter.get().saturating_add(1));
            let path = dir.path().join(format!("kv-{}.redb", counter.get()));
            Box::new(RedbBackend::open(path).unwrap())
        });
    }

    #[test]
    fn entries_survive_reopen() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registrar.redb");
        let key = Key::entry(Table::Students, "s1");

        {
            let backend = RedbBackend::open(&path).unwrap();
            backend.set(&key, b"persisted").unwrap();
        }

        let backend = RedbBackend::open(&path).unwrap();
        assert_eq!(
            backend.get(&key).unwrap().as_deref(),
            Some(&b"persisted"[..])
        );
    }
}
