//! Core record types for roster.
//!
//! This module defines the stored [`Record`], the validated [`NewRecord`]
//! payload accepted by the store, the raw [`Candidate`] form values typed by
//! a user, and [`RecordRef`] used to address a stored record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of a stored record.
///
/// Local backends generate UUID v4 strings; the remote backend uses whatever
/// the server issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh locally-unique identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored record.
///
/// Serialized with the server's `_id` key; `id` is accepted as an alias on
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier assigned at creation.
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Age in whole years.
    #[serde(deserialize_with = "deserialize_age")]
    pub age: u32,
}

impl Record {
    /// Build a stored record from an identifier and a validated payload.
    #[must_use]
    pub fn from_new(id: RecordId, data: NewRecord) -> Self {
        Self {
            id,
            name: data.name,
            email: data.email,
            age: data.age,
        }
    }

    /// The record's content without its identifier.
    #[must_use]
    pub fn data(&self) -> NewRecord {
        NewRecord {
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age,
        }
    }
}

/// A validated record payload that has not been stored yet.
///
/// Only the validator produces these from user input, so anything reaching
/// the store has already passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Age in whole years.
    pub age: u32,
}

/// Raw form values as typed by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Name field.
    pub name: String,
    /// Email field.
    pub email: String,
    /// Age field, unparsed.
    pub age: String,
}

impl Candidate {
    /// Create a candidate from raw field values.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: age.into(),
        }
    }
}

impl From<&Record> for Candidate {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            age: record.age.to_string(),
        }
    }
}

/// Reference to a stored record, either by list position or by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordRef {
    /// Zero-based position in the current list.
    Index(usize),
    /// Stable identifier.
    Id(RecordId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Id(id) => write!(f, "id:{id}"),
        }
    }
}

impl From<usize> for RecordRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<RecordId> for RecordRef {
    fn from(id: RecordId) -> Self {
        Self::Id(id)
    }
}

impl FromStr for RecordRef {
    type Err = String;

    /// Parse `3`, `#3` or `id:<identifier>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix("id:") {
            if id.is_empty() {
                return Err("record id cannot be empty".to_string());
            }
            return Ok(Self::Id(RecordId::new(id)));
        }
        let digits = s.strip_prefix('#').unwrap_or(s);
        digits
            .parse::<usize>()
            .map(Self::Index)
            .map_err(|_| format!("expected a row index or id:<identifier>, got '{s}'"))
    }
}

/// Accept ages sent as JSON integers, integral floats, or numeric strings.
fn deserialize_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Int(u64),
        Float(f64),
        Text(String),
    }

    fn invalid<E: serde::de::Error>(shown: &dyn fmt::Display) -> E {
        E::custom(format!("invalid age '{shown}': expected a whole number"))
    }

    match RawAge::deserialize(deserializer)? {
        RawAge::Int(n) => u32::try_from(n).map_err(|_| invalid(&n)),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        RawAge::Float(f) => {
            if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) {
                Ok(f as u32)
            } else {
                Err(invalid(&f))
            }
        }
        RawAge::Text(s) => s.trim().parse::<u32>().map_err(|_| invalid(&s)),
    }
}
