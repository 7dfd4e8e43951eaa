//! # Keyspace
//!
//! Composite keys addressing the key-value backend.
//!
//! A [`Key`] is a path-like sequence of string segments, e.g.
//! `["students", "<uuid>"]`. Backends never see segments directly: they store
//! the byte encoding produced by [`Key::encode`], in which every segment is a
//! big-endian `u32` length followed by its UTF-8 bytes. Two properties follow:
//!
//! - The encoding of a prefix is a byte prefix of the encoding of every key
//!   beneath it, so prefix scans are plain byte-range scans.
//! - Segment boundaries are explicit, so a subject named `"a/b"` never
//!   collides with the two-segment key `["a", "b"]`.

use crate::error::{Result, StoreError};
use std::fmt;

/// Size of the length header preceding every encoded segment.
const SEGMENT_HEADER: usize = 4;

// =============================================================================
// TABLE
// =============================================================================

/// The top-level keyspace partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    /// `students/{id}`
    Students,
    /// `specializations/{name}`
    Specializations,
    /// `subjects/{name}`
    Subjects,
    /// `examCenters/{name}`
    ExamCenters,
    /// `photos/{id}`
    Photos,
}

impl Table {
    /// The three derived lookup tables.
    pub const LOOKUPS: [Table; 3] = [Table::Specializations, Table::Subjects, Table::ExamCenters];

    /// The first key segment for this table.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Specializations => "specializations",
            Self::Subjects => "subjects",
            Self::ExamCenters => "examCenters",
            Self::Photos => "photos",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// KEY
// =============================================================================

/// A composite key: an ordered sequence of string segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key(Vec<String>);

impl Key {
    /// Build a key from arbitrary segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The prefix key covering a whole table.
    #[must_use]
    pub fn table(table: Table) -> Self {
        Self(vec![table.name().to_owned()])
    }

    /// The key of a single entry inside a table.
    pub fn entry(table: Table, name: impl Into<String>) -> Self {
        Self(vec![table.name().to_owned(), name.into()])
    }

    /// The segments of this key.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The final segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Whether `prefix` matches this key segment by segment.
    #[must_use]
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Encode into the length-prefixed byte form stored by backends.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let capacity = self
            .0
            .iter()
            .map(|s| s.len().saturating_add(SEGMENT_HEADER))
            .sum();
        let mut out = Vec::with_capacity(capacity);
        for segment in &self.0 {
            out.extend_from_slice(&(segment.len() as u32).to_be_bytes());
            out.extend_from_slice(segment.as_bytes());
        }
        out
    }

    /// Decode a key previously produced by [`Key::encode`].
    pub fn decode(mut bytes: &[u8]) -> Result<Self> {
        let mut segments = Vec::new();
        while !bytes.is_empty() {
            let Some((header, rest)) = bytes.split_first_chunk::<SEGMENT_HEADER>() else {
                return Err(StoreError::InvalidKey(
                    "truncated segment header".to_owned(),
                ));
            };
            let len = u32::from_be_bytes(*header) as usize;
            if rest.len() < len {
                return Err(StoreError::InvalidKey(format!(
                    "segment length {} exceeds remaining {} bytes",
                    len,
                    rest.len()
                )));
            }
            let (segment, tail) = rest.split_at(len);
            let segment = std::str::from_utf8(segment)
                .map_err(|e| StoreError::InvalidKey(e.to_string()))?;
            segments.push(segment.to_owned());
            bytes = tail;
        }
        Ok(Self(segments))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn entry_key_has_table_and_name() {
        let key = Key::entry(Table::ExamCenters, "center1");
        assert_eq!(key.segments(), ["examCenters", "center1"]);
        assert_eq!(key.last(), Some("center1"));
        assert_eq!(key.to_string(), "examCenters/center1");
    }

    #[test]
    fn slash_in_name_stays_one_segment() {
        let nested = Key::entry(Table::Subjects, "a/b");
        let split = Key::new(["subjects", "a", "b"]);

        assert_ne!(nested.encode(), split.encode());
        assert_eq!(Key::decode(&nested.encode()).ok(), Some(nested));
    }

    #[test]
    fn shorter_segment_is_not_a_prefix() {
        let key = Key::entry(Table::Subjects, "ab");
        let prefix = Key::new(["subjects", "a"]);

        assert!(!key.starts_with(&prefix));
        assert!(!key.encode().starts_with(&prefix.encode()));
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let mut bytes = Key::entry(Table::Students, "abc").encode();
        bytes.pop();
        assert!(matches!(Key::decode(&bytes), Err(StoreError::InvalidKey(_))));

        assert!(Key::decode(&[0, 0]).is_err());
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let bytes = [0, 0, 0, 1, 0xff];
        assert!(Key::decode(&bytes).is_err());
    }

    proptest! {
        #[test]
        fn encoding_is_reversible(segments in prop::collection::vec(".*", 0..5)) {
            let key = Key::new(segments);
            prop_assert_eq!(Key::decode(&key.encode()).ok(), Some(key));
        }

        #[test]
        fn prefix_encoding_is_byte_prefix(
            head in prop::collection::vec(".*", 0..3),
            tail in prop::collection::vec(".*", 0..3),
        ) {
            let prefix = Key::new(head.clone());
            let full = Key::new(head.into_iter().chain(tail));
            prop_assert!(full.starts_with(&prefix));
            prop_assert!(full.encode().starts_with(&prefix.encode()));
        }
    }
}
