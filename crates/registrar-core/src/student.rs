//! # Student Types
//!
//! The persisted [`StudentRecord`] and the incoming [`StudentDraft`] payload.
//!
//! A draft is a record minus its identifier. The store assigns the identifier
//! on registration (or takes it from the request path on update) and turns the
//! draft into a record with [`StudentDraft::into_record`].

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier of a student record.
///
/// Generated ids are UUID v4 strings. Ids arriving on a request path are taken
/// as-is: the store never checks their shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Inactive => f.write_str("inactive"),
        }
    }
}

// =============================================================================
// STUDENT RECORD
// =============================================================================

/// A registered student as stored under `students/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub university_id: String,
    pub whatsapp: String,
    pub status: Status,
    pub specialization: String,
    pub year_of_entry: String,
    pub selected_semesters: BTreeSet<String>,
    pub subjects: BTreeSet<String>,
    pub exam_center: String,
    pub photo_reference: Option<String>,
}

impl StudentRecord {
    /// The record's fields without its identifier.
    #[must_use]
    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            university_id: self.university_id.clone(),
            whatsapp: self.whatsapp.clone(),
            status: self.status,
            specialization: self.specialization.clone(),
            year_of_entry: self.year_of_entry.clone(),
            selected_semesters: self.selected_semesters.clone(),
            subjects: self.subjects.clone(),
            exam_center: self.exam_center.clone(),
            photo_reference: self.photo_reference.clone(),
        }
    }
}

// =============================================================================
// STUDENT DRAFT
// =============================================================================

/// Missing or blank required fields in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct DraftError(pub Vec<&'static str>);

/// The registration payload: every record field except `id`.
///
/// Deserialization enforces presence of the required fields; an `id` field in
/// the body is ignored. [`StudentDraft::validate`] additionally rejects
/// required strings that are empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub name: String,
    pub university_id: String,
    pub whatsapp: String,
    pub status: Status,
    pub specialization: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub year_of_entry: String,
    #[serde(default)]
    pub selected_semesters: BTreeSet<String>,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    pub exam_center: String,
    #[serde(default)]
    pub photo_reference: Option<String>,
}

impl StudentDraft {
    /// Check that no required string field is blank.
    pub fn validate(&self) -> Result<(), DraftError> {
        let required = [
            ("name", &self.name),
            ("universityId", &self.university_id),
            ("whatsapp", &self.whatsapp),
            ("specialization", &self.specialization),
            ("yearOfEntry", &self.year_of_entry),
            ("examCenter", &self.exam_center),
        ];
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DraftError(missing))
        }
    }

    /// Attach an identifier, producing the record to persist.
    #[must_use]
    pub fn into_record(self, id: StudentId) -> StudentRecord {
        StudentRecord {
            id,
            name: self.name,
            university_id: self.university_id,
            whatsapp: self.whatsapp,
            status: self.status,
            specialization: self.specialization,
            year_of_entry: self.year_of_entry,
            selected_semesters: self.selected_semesters,
            subjects: self.subjects,
            exam_center: self.exam_center,
            photo_reference: self.photo_reference,
        }
    }
}

/// The form posts `yearOfEntry` from a numeric input; accept a JSON string or
/// an integer and keep it as text.
fn deserialize_year<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct YearVisitor;

    impl Visitor<'_> for YearVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a year as a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

// =============================================================================
// PHOTO
// =============================================================================

/// An uploaded photo, stored under `photos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Alice",
            "universityId": "U-100",
            "whatsapp": "+15550100",
            "status": "active",
            "specialization": "Physics",
            "yearOfEntry": "2023",
            "selectedSemesters": ["semester1", "semester2"],
            "subjects": ["subject1"],
            "examCenter": "center1"
        })
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = StudentId::generate();
        let b = StudentId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn draft_parses_form_payload() {
        let draft: StudentDraft = serde_json::from_value(draft_json()).unwrap();
        assert_eq!(draft.name, "Alice");
        assert_eq!(draft.status, Status::Active);
        assert_eq!(draft.selected_semesters.len(), 2);
        assert_eq!(draft.photo_reference, None);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn numeric_year_is_accepted() {
        let mut json = draft_json();
        json["yearOfEntry"] = serde_json::json!(2021);
        let draft: StudentDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft.year_of_entry, "2021");
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let mut json = draft_json();
        json.as_object_mut().unwrap().remove("examCenter");
        assert!(serde_json::from_value::<StudentDraft>(json).is_err());
    }

    #[test]
    fn unknown_status_fails_to_parse() {
        let mut json = draft_json();
        json["status"] = serde_json::json!("graduated");
        assert!(serde_json::from_value::<StudentDraft>(json).is_err());
    }

    #[test]
    fn optional_sets_default_to_empty() {
        let mut json = draft_json();
        let obj = json.as_object_mut().unwrap();
        obj.remove("selectedSemesters");
        obj.remove("subjects");
        let draft: StudentDraft = serde_json::from_value(json).unwrap();
        assert!(draft.subjects.is_empty());
        assert!(draft.selected_semesters.is_empty());
    }

    #[test]
    fn blank_required_fields_are_reported() {
        let mut json = draft_json();
        json["name"] = serde_json::json!("  ");
        json["whatsapp"] = serde_json::json!("");
        let draft: StudentDraft = serde_json::from_value(json).unwrap();

        let err = draft.validate().unwrap_err();
        assert_eq!(err.0, vec!["name", "whatsapp"]);
        assert_eq!(err.to_string(), "missing required fields: name, whatsapp");
    }

    #[test]
    fn body_id_is_ignored() {
        let mut json = draft_json();
        json["id"] = serde_json::json!("forged");
        let draft: StudentDraft = serde_json::from_value(json).unwrap();
        let record = draft.clone().into_record(StudentId::new("real"));
        assert_eq!(record.id.as_str(), "real");
        assert_eq!(record.to_draft(), draft);
    }

    #[test]
    fn record_serializes_camel_case() {
        let draft: StudentDraft = serde_json::from_value(draft_json()).unwrap();
        let record = draft.into_record(StudentId::new("s1"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["universityId"], "U-100");
        assert_eq!(json["examCenter"], "center1");
        assert_eq!(json["status"], "active");
        assert!(json["photoReference"].is_null());
    }
}
