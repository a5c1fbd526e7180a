//! Save entry records and their line encoding in the registry file

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format of `created_at`, e.g. `24-03-09 21:05:44`
pub const TIMESTAMP_FORMAT: &str = "%y-%m-%d %H:%M:%S";

const FIELD_SEPARATOR: char = '\t';
const FIELD_COUNT: usize = 3;

/// Why a registry line could not be turned into an entry
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected 3 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid id: {0}")]
    InvalidId(#[from] uuid::Error),
}

/// One snapshot of the live save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEntry {
    pub name: String,
    pub created_at: String,
    pub id: Uuid,
}

impl SaveEntry {
    /// Mint a new entry with a random id.
    pub fn new<N: Into<String>, D: Into<String>>(name: N, created_at: D) -> Self {
        Self::with_id(name, created_at, Uuid::new_v4())
    }

    /// Rebuild an entry whose id is already known.
    pub fn with_id<N: Into<String>, D: Into<String>>(name: N, created_at: D, id: Uuid) -> Self {
        Self {
            name: name.into(),
            created_at: created_at.into(),
            id,
        }
    }

    /// Parse one registry line (without its trailing newline).
    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        let fields = line.split(FIELD_SEPARATOR).collect::<Vec<&str>>();

        if fields.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount(fields.len()));
        }

        let id = Uuid::parse_str(fields[2])?;

        Ok(Self::with_id(fields[0], fields[1], id))
    }

    /// Registry line including the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}\n",
            self.name, self.created_at, self.id
        )
    }

    /// The string list views show for this entry. [`id_from_display_key`]
    /// recovers the id from it.
    pub fn display_key(&self) -> String {
        format!("{}\t ({})", self.name, self.id)
    }
}

/// Extract the id from a display key, or accept a bare id.
///
/// The id is whatever sits between the last `(` and the closing `)`, so names
/// that contain parentheses still resolve.
pub fn id_from_display_key(key: &str) -> Option<Uuid> {
    let key = key.trim();

    if let Ok(id) = Uuid::parse_str(key) {
        return Some(id);
    }

    let (_, tail) = key.rsplit_once('(')?;
    let inner = tail.strip_suffix(')')?;

    Uuid::parse_str(inner).ok()
}

/// Whether a name can be stored without breaking the line format.
pub fn is_storable_name(name: &str) -> bool {
    !name.contains(['\t', '\n', '\r'])
}

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}
