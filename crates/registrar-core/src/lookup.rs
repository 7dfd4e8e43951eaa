//! # Lookup Tables
//!
//! Denormalized secondary entries derived from student records.
//!
//! Each entry is keyed by its name inside its table. Registering a student
//! upserts one entry per specialization / subject / exam center value; any
//! later student sharing a name overwrites the entry (last writer wins).
//! Entries are never validated and never removed by update or delete.

use crate::keyspace::{Key, Table};
use crate::student::StudentRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A name-keyed record living in one of the lookup tables.
pub trait LookupEntry: Serialize + DeserializeOwned {
    /// The table this entry type lives in.
    const TABLE: Table;

    /// The name the entry is keyed by.
    fn name(&self) -> &str;

    /// Storage key of this entry.
    fn key(&self) -> Key {
        Key::entry(Self::TABLE, self.name())
    }
}

/// `specializations/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialization {
    pub name: String,
}

/// `subjects/{name}`, remembering the specialization of the student that
/// last registered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub specialization: String,
}

/// `examCenters/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamCenter {
    pub name: String,
}

impl LookupEntry for Specialization {
    const TABLE: Table = Table::Specializations;

    fn name(&self) -> &str {
        &self.name
    }
}

impl LookupEntry for Subject {
    const TABLE: Table = Table::Subjects;

    fn name(&self) -> &str {
        &self.name
    }
}

impl LookupEntry for ExamCenter {
    const TABLE: Table = Table::ExamCenters;

    fn name(&self) -> &str {
        &self.name
    }
}

/// The secondary entries implied by one student record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedLookups {
    pub specialization: Specialization,
    pub subjects: Vec<Subject>,
    pub exam_center: ExamCenter,
}

impl DerivedLookups {
    /// Derive the entries for a record, in write order.
    #[must_use]
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            specialization: Specialization {
                name: record.specialization.clone(),
            },
            subjects: record
                .subjects
                .iter()
                .map(|name| Subject {
                    name: name.clone(),
                    specialization: record.specialization.clone(),
                })
                .collect(),
            exam_center: ExamCenter {
                name: record.exam_center.clone(),
            },
        }
    }
}
