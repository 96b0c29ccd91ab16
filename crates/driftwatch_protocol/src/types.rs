//! Canonical enums used across all crates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Severity
// ============================================================================

/// Impact classification of one detected schema change.
/// Total order: SAFE < RISKY < BREAKING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Downstream consumers are unaffected
    Safe,
    /// Consumers may need attention but reads keep working
    Risky,
    /// Consumers will break
    Breaking,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "SAFE",
            Severity::Risky => "RISKY",
            Severity::Breaking => "BREAKING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SAFE" => Ok(Severity::Safe),
            "RISKY" => Ok(Severity::Risky),
            "BREAKING" => Ok(Severity::Breaking),
            _ => Err(format!(
                "Invalid severity: '{}'. Expected: SAFE, RISKY, or BREAKING",
                s
            )),
        }
    }
}

// ============================================================================
// Run status
// ============================================================================

/// Outcome of one drift-check run for one table.
///
/// NO_DATA is an expected outcome, not drift and not an error: the dataset's
/// storage prefix held no objects, so no comparison was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Schemas match, zero changes
    #[default]
    Ok,
    /// At least one change detected (severity communicates impact)
    Drift,
    /// Storage prefix is empty, comparison skipped
    NoData,
    /// Normalization or comparison failed for this table
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ok => "OK",
            RunStatus::Drift => "DRIFT",
            RunStatus::NoData => "NO_DATA",
            RunStatus::Error => "ERROR",
        }
    }

    /// True when the run produced a usable comparison (OK or DRIFT).
    pub fn is_compared(&self) -> bool {
        matches!(self, RunStatus::Ok | RunStatus::Drift)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OK" => Ok(RunStatus::Ok),
            "DRIFT" => Ok(RunStatus::Drift),
            "NO_DATA" => Ok(RunStatus::NoData),
            "ERROR" => Ok(RunStatus::Error),
            _ => Err(format!("Invalid run status: '{}'", s)),
        }
    }
}

// ============================================================================
// Change kind
// ============================================================================

/// Kind of one detected field-level difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    FieldAdded,
    FieldRemoved,
    TypeChanged,
    NullabilityChanged,
    PositionChanged,
    PartitionKeyChanged,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::FieldAdded => "FIELD_ADDED",
            ChangeKind::FieldRemoved => "FIELD_REMOVED",
            ChangeKind::TypeChanged => "TYPE_CHANGED",
            ChangeKind::NullabilityChanged => "NULLABILITY_CHANGED",
            ChangeKind::PositionChanged => "POSITION_CHANGED",
            ChangeKind::PartitionKeyChanged => "PARTITION_KEY_CHANGED",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FIELD_ADDED" => Ok(ChangeKind::FieldAdded),
            "FIELD_REMOVED" => Ok(ChangeKind::FieldRemoved),
            "TYPE_CHANGED" => Ok(ChangeKind::TypeChanged),
            "NULLABILITY_CHANGED" => Ok(ChangeKind::NullabilityChanged),
            "POSITION_CHANGED" => Ok(ChangeKind::PositionChanged),
            "PARTITION_KEY_CHANGED" => Ok(ChangeKind::PartitionKeyChanged),
            _ => Err(format!("Invalid change kind: '{}'", s)),
        }
    }
}

// ============================================================================
// Data types
// ============================================================================

/// Normalized column type.
///
/// Raw catalog and contract documents carry Hive-style string tags; the
/// normalizer maps each tag onto this closed vocabulary. Tags it cannot map
/// become [`DataType::Unknown`] so a retyped column still surfaces as a
/// difference instead of failing the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    /// UTF-8 string (default/fallback for varchar/char)
    #[default]
    String,
    Date,
    /// Timestamp without timezone
    Timestamp,
    /// Fixed-point decimal (precision <= 38)
    Decimal { precision: u8, scale: u8 },
    /// List of a single item type
    Array { item: Box<DataType> },
    /// Key/value mapping
    Map { key: Box<DataType>, value: Box<DataType> },
    /// Struct with named fields
    Struct { fields: Vec<StructField> },
    /// Unrecognized raw tag, preserved (lowercased) for display and diffing
    Unknown { raw: String },
}

/// A field within a [`DataType::Struct`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    pub name: String,
    pub data_type: DataType,
}

impl DataType {
    /// Canonical string tag, e.g. `bigint`, `decimal(10,2)`, `array<string>`.
    pub fn tag(&self) -> String {
        match self {
            DataType::Boolean => "boolean".to_string(),
            DataType::TinyInt => "tinyint".to_string(),
            DataType::SmallInt => "smallint".to_string(),
            DataType::Int => "int".to_string(),
            DataType::BigInt => "bigint".to_string(),
            DataType::Float => "float".to_string(),
            DataType::Double => "double".to_string(),
            DataType::String => "string".to_string(),
            DataType::Date => "date".to_string(),
            DataType::Timestamp => "timestamp".to_string(),
            DataType::Decimal { precision, scale } => {
                format!("decimal({},{})", precision, scale)
            }
            DataType::Array { item } => format!("array<{}>", item.tag()),
            DataType::Map { key, value } => format!("map<{},{}>", key.tag(), value.tag()),
            DataType::Struct { fields } => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.data_type.tag()))
                    .collect();
                format!("struct<{}>", inner.join(","))
            }
            DataType::Unknown { raw } => raw.clone(),
        }
    }

    /// True when this type normalized to the `Unknown` sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, DataType::Unknown { .. })
    }

    /// Parse a raw type tag into the normalized vocabulary.
    ///
    /// Lenient by design: whitespace is ignored, matching is
    /// case-insensitive, and anything unrecognized yields `Unknown` rather
    /// than an error. Nesting deeper than `MAX_TYPE_NESTING` bottoms out
    /// in `Unknown` instead of recursing further.
    pub fn parse_tag(raw: &str) -> DataType {
        let tag = raw.trim().to_lowercase();
        parse_tag_inner(&tag, 0)
    }
}

/// Cap on `array<>`/`map<>`/`struct<>` nesting. Catalog schemas never come
/// close; tags nested past this parse to `Unknown` so a hostile document
/// cannot overflow the stack and take the whole run down with it.
const MAX_TYPE_NESTING: usize = 32;

fn parse_tag_inner(tag: &str, depth: usize) -> DataType {
    let tag = tag.trim();
    if depth > MAX_TYPE_NESTING {
        return DataType::Unknown { raw: tag.to_string() };
    }
    match tag {
        "boolean" | "bool" => return DataType::Boolean,
        "tinyint" | "byte" | "int8" => return DataType::TinyInt,
        "smallint" | "short" | "int16" => return DataType::SmallInt,
        "int" | "integer" | "int32" => return DataType::Int,
        "bigint" | "long" | "int64" => return DataType::BigInt,
        "float" | "real" | "float32" => return DataType::Float,
        "double" | "float64" => return DataType::Double,
        "string" | "varchar" | "char" | "text" | "utf8" => return DataType::String,
        "date" => return DataType::Date,
        "timestamp" | "datetime" => return DataType::Timestamp,
        "decimal" => {
            // Bare decimal without precision: catalog default 10,0
            return DataType::Decimal { precision: 10, scale: 0 };
        }
        _ => {}
    }

    if let Some(dt) = parse_decimal(tag) {
        return dt;
    }
    if let Some(inner) = strip_wrapper(tag, "array") {
        return DataType::Array { item: Box::new(parse_tag_inner(inner, depth + 1)) };
    }
    if let Some(inner) = strip_wrapper(tag, "map") {
        let parts = split_top_level(inner);
        if parts.len() == 2 {
            return DataType::Map {
                key: Box::new(parse_tag_inner(parts[0], depth + 1)),
                value: Box::new(parse_tag_inner(parts[1], depth + 1)),
            };
        }
    }
    if let Some(inner) = strip_wrapper(tag, "struct") {
        let mut fields = Vec::new();
        for part in split_top_level(inner) {
            match part.split_once(':') {
                Some((name, ty)) => fields.push(StructField {
                    name: name.trim().to_string(),
                    data_type: parse_tag_inner(ty, depth + 1),
                }),
                None => return DataType::Unknown { raw: tag.to_string() },
            }
        }
        if !fields.is_empty() {
            return DataType::Struct { fields };
        }
    }

    DataType::Unknown { raw: tag.to_string() }
}

/// Parse `decimal(p,s)` / `decimal(p)` with arbitrary interior whitespace.
fn parse_decimal(tag: &str) -> Option<DataType> {
    let rest = tag.strip_prefix("decimal")?.trim();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split(',');
    let precision: u8 = parts.next()?.trim().parse().ok()?;
    let scale: u8 = match parts.next() {
        Some(s) => s.trim().parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(DataType::Decimal { precision, scale })
}

/// Strip `name<...>` wrappers, returning the interior.
fn strip_wrapper<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let rest = tag.strip_prefix(name)?.trim_start();
    rest.strip_prefix('<')?.strip_suffix('>')
}

/// Split on commas that are not nested inside `<>` or `()`.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.tag())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(DataType::parse_tag(&raw))
    }
}
