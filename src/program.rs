//! Program descriptors and the metadata document listing them.
//!
//! The document is a JSON array. Besides `title`, `filename`, `description`
//! and `speed`, every boolean member of an entry is a behavioral flag, kept in
//! document order because that is the order the engine receives them in:
//!
//! ```json
//! [{ "title": "Pong", "filename": "pong.ch8", "description": "2 players",
//!    "speed": 10, "loadStoreQuirk": false, "shiftQuirk": true }]
//! ```

use std::num::NonZeroU32;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramFlag {
    pub name: String,
    pub enabled: bool,
}

/// One program of the metadata document. Serializes to and from the flat
/// entry shape, with flags as top-level booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ProgramDescriptor {
    pub title: String,
    pub filename: String,
    pub description: String,
    pub speed: NonZeroU32,
    pub flags: Vec<ProgramFlag>,
}

impl ProgramDescriptor {
    pub fn new(title: &str, filename: &str, speed: NonZeroU32) -> Self {
        Self {
            title: title.to_string(),
            filename: filename.to_string(),
            description: String::new(),
            speed,
            flags: Vec::new(),
        }
    }

    pub fn with_flag(mut self, name: &str, enabled: bool) -> Self {
        self.flags.push(ProgramFlag {
            name: name.to_string(),
            enabled,
        });
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|f| f.name == name).map(|f| f.enabled)
    }

    /// Builds a descriptor from one metadata entry.
    pub fn from_entry(entry: &Map<String, Value>) -> Result<Self, String> {
        let text = |key: &str| -> Result<String, String> {
            match entry.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(format!("`{key}` must be a string")),
                None => Err(format!("missing `{key}`")),
            }
        };

        let title = text("title")?;
        let filename = text("filename")?;
        let description = match entry.get("description") {
            None | Some(Value::Null) => String::new(),
            Some(_) => text("description")?,
        };
        let speed = entry
            .get("speed")
            .and_then(Value::as_u64)
            .and_then(|s| u32::try_from(s).ok())
            .and_then(NonZeroU32::new)
            .ok_or_else(|| format!("`speed` of {title:?} must be a positive integer"))?;

        let flags = entry
            .iter()
            .filter_map(|(name, v)| {
                v.as_bool().map(|enabled| ProgramFlag {
                    name: name.clone(),
                    enabled,
                })
            })
            .collect();

        Ok(Self {
            title,
            filename,
            description,
            speed,
            flags,
        })
    }
}

impl TryFrom<Map<String, Value>> for ProgramDescriptor {
    type Error = String;

    fn try_from(entry: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_entry(&entry)
    }
}

impl From<ProgramDescriptor> for Map<String, Value> {
    fn from(p: ProgramDescriptor) -> Self {
        let mut entry = Map::new();
        entry.insert("title".into(), Value::String(p.title));
        entry.insert("filename".into(), Value::String(p.filename));
        entry.insert("description".into(), Value::String(p.description));
        entry.insert("speed".into(), Value::from(p.speed.get()));
        for flag in p.flags {
            entry.insert(flag.name, Value::Bool(flag.enabled));
        }
        entry
    }
}

/// Parses the metadata document. Malformed entries are skipped with a warning;
/// a document that is not a JSON array is an error.
pub fn parse_catalog(raw: &str) -> Result<Vec<ProgramDescriptor>, CatalogError> {
    let doc: Value = serde_json::from_str(raw)?;
    let Value::Array(entries) = doc else {
        return Err(CatalogError::NotAnArray);
    };

    let mut programs = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ProgramDescriptor>(entry) {
            Ok(p) => programs.push(p),
            Err(e) => warn!("skipping program metadata entry {i}: {e}"),
        }
    }
    Ok(programs)
}

pub fn read_catalog(path: &Path) -> Result<Vec<ProgramDescriptor>, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&raw)
}

/// Collapses a failed catalog load into an empty list, logging why.
pub fn catalog_or_empty(
    result: Result<Vec<ProgramDescriptor>, CatalogError>,
) -> Vec<ProgramDescriptor> {
    result.unwrap_or_else(|e| {
        error!("Failed to load program metadata: {e}");
        Vec::new()
    })
}
