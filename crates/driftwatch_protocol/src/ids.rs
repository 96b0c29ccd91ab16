//! Identifier wrappers for Driftwatch artifacts.
//!
//! Both identifiers end up in persisted artifact paths, so parsing enforces
//! path-safety up front instead of sanitizing at write time.

use chrono::Utc;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when parsing an identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

/// Reference to one catalog table: `database.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    database: String,
    name: String,
}

impl TableRef {
    /// The dot is the separator in the `database.name` display form, so
    /// neither component may contain one; otherwise a reference would not
    /// re-parse to itself.
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Result<Self, IdParseError> {
        let database = database.into();
        let name = name.into();
        if database.is_empty() || name.is_empty() {
            return Err(IdParseError::new("Table reference requires both database and name"));
        }
        if database.contains('.') || name.contains('.') {
            return Err(IdParseError::new(format!(
                "Invalid table reference '{}.{}': components must not contain '.'",
                database, name
            )));
        }
        Ok(Self { database, name })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.name)
    }
}

impl FromStr for TableRef {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((db, name)) => TableRef::new(db, name),
            None => Err(IdParseError::new(format!(
                "Invalid table reference '{}': expected 'database.table'",
                s
            ))),
        }
    }
}

impl Serialize for TableRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TableRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Time-ordered run token: `{unix_seconds:010}-{uuid8}`.
///
/// Lexicographic order matches creation order at second granularity; the
/// uuid suffix keeps concurrent runs distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp().max(0) as u64;
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{:010}-{}", secs, &suffix[..8]))
    }

    pub fn parse(value: &str) -> Result<Self, IdParseError> {
        if value.is_empty() {
            return Err(IdParseError::new("Run ID must not be empty"));
        }
        let safe = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(IdParseError::new(format!(
                "Invalid run ID '{}': only alphanumerics, '-' and '_' are allowed",
                value
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
