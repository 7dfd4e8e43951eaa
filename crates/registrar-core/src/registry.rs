//! # Student Store
//!
//! CRUD over student records plus the derived lookup tables.
//!
//! ## Write semantics
//!
//! - `create` writes the record, then the specialization, each subject and
//!   the exam center, one key at a time. A failure part-way leaves the
//!   earlier writes in place; nothing is rolled back.
//! - `update` is an unconditional upsert of the record alone. Lookup entries
//!   derived from the old values are left as they were.
//! - `delete` removes the record alone; lookup entries are never removed.
//! - `put_photo` sets `photoReference` with a single-step rewrite of the
//!   stored record, so it never brings back a deleted student or replaces a
//!   newer version of the record. The blob is written afterwards.
//!
//! Orphaned lookup entries are only reconciled by an explicit
//! [`StudentStore::rebuild_lookups`].

use crate::error::{Result, StoreError};
use crate::formats::{decode_value, encode_value};
use crate::keyspace::{Key, Table};
use crate::lookup::{DerivedLookups, ExamCenter, LookupEntry, Specialization, Subject};
use crate::storage::KvBackend;
use crate::student::{Photo, StudentDraft, StudentId, StudentRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Entry counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub students: usize,
    pub specializations: usize,
    pub subjects: usize,
    pub exam_centers: usize,
}

/// The record store adapter.
///
/// Owns its backend; share it across handlers behind an `Arc`.
pub struct StudentStore {
    backend: Box<dyn KvBackend>,
}

impl std::fmt::Debug for StudentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentStore").finish_non_exhaustive()
    }
}

impl StudentStore {
    /// Wrap a backend.
    pub fn new<B: KvBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    // =========================================================================
    // STUDENTS
    // =========================================================================

    /// Register a new student. Returns the generated identifier.
    pub fn create(&self, draft: StudentDraft) -> Result<StudentId> {
        let id = StudentId::generate();
        let record = draft.into_record(id.clone());

        self.put(&Self::student_key(&id), &record)?;
        self.write_lookups(&record)?;

        Ok(id)
    }

    /// Fetch one student. `Ok(None)` when absent.
    pub fn get(&self, id: &StudentId) -> Result<Option<StudentRecord>> {
        self.fetch(&Self::student_key(id))
    }

    /// Every stored student, in key order.
    pub fn list(&self) -> Result<Vec<StudentRecord>> {
        self.scan(Table::Students)
    }

    /// Overwrite (or create) the record at `id`.
    pub fn update(&self, id: &StudentId, draft: StudentDraft) -> Result<()> {
        let record = draft.into_record(id.clone());
        self.put(&Self::student_key(id), &record)
    }

    /// Remove the record at `id`. Returns whether it existed.
    pub fn delete(&self, id: &StudentId) -> Result<bool> {
        self.backend.delete(&Self::student_key(id))
    }

    // =========================================================================
    // LOOKUP TABLES
    // =========================================================================

    pub fn specializations(&self) -> Result<Vec<Specialization>> {
        self.lookups()
    }

    pub fn subjects(&self) -> Result<Vec<Subject>> {
        self.lookups()
    }

    pub fn exam_centers(&self) -> Result<Vec<ExamCenter>> {
        self.lookups()
    }

    /// Every entry of one lookup table.
    pub fn lookups<E: LookupEntry>(&self) -> Result<Vec<E>> {
        self.scan(E::TABLE)
    }

    /// Drop every lookup entry and derive the tables again from the students
    /// currently stored. Returns the resulting counts.
    pub fn rebuild_lookups(&self) -> Result<StoreCounts> {
        for table in Table::LOOKUPS {
            for (key, _) in self.backend.scan_prefix(&Key::table(table))? {
                self.backend.delete(&key)?;
            }
        }

        for record in self.list()? {
            self.write_lookups(&record)?;
        }

        self.counts()
    }

    /// Number of entries in each table.
    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table| -> Result<usize> {
            Ok(self.backend.scan_prefix(&Key::table(table))?.len())
        };
        Ok(StoreCounts {
            students: count(Table::Students)?,
            specializations: count(Table::Specializations)?,
            subjects: count(Table::Subjects)?,
            exam_centers: count(Table::ExamCenters)?,
        })
    }

    // =========================================================================
    // PHOTOS
    // =========================================================================

    /// Point the record's `photoReference` at `photos/{id}`, then store the
    /// photo there. Fails with `NotFound` when the student is absent.
    pub fn put_photo(&self, id: &StudentId, photo: &Photo) -> Result<String> {
        let key = Key::entry(Table::Photos, id.as_str());
        let reference = key.to_string();

        let linked = self
            .backend
            .update_existing(&Self::student_key(id), &mut |bytes| {
                let mut record: StudentRecord = decode_value(bytes)?;
                record.photo_reference = Some(reference.clone());
                encode_value(&record)
            })?;
        if !linked {
            return Err(StoreError::NotFound(format!("student {id}")));
        }

        self.put(&key, photo)?;
        Ok(reference)
    }

    pub fn get_photo(&self, id: &StudentId) -> Result<Option<Photo>> {
        self.fetch(&Key::entry(Table::Photos, id.as_str()))
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn student_key(id: &StudentId) -> Key {
        Key::entry(Table::Students, id.as_str())
    }

    fn write_lookups(&self, record: &StudentRecord) -> Result<()> {
        let derived = DerivedLookups::from_record(record);

        self.put_entry(&derived.specialization)?;
        for subject in &derived.subjects {
            self.put_entry(subject)?;
        }
        self.put_entry(&derived.exam_center)
    }

    fn put_entry<E: LookupEntry>(&self, entry: &E) -> Result<()> {
        self.put(&entry.key(), entry)
    }

    fn put<T: Serialize>(&self, key: &Key, value: &T) -> Result<()> {
        self.backend.set(key, &encode_value(value)?)
    }

    fn fetch<T: DeserializeOwned>(&self, key: &Key) -> Result<Option<T>> {
        self.backend
            .get(key)?
            .map(|bytes| decode_value(&bytes))
            .transpose()
    }

    fn scan<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>> {
        self.backend
            .scan_prefix(&Key::table(table))?
            .iter()
            .map(|(_, bytes)| decode_value(bytes))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
