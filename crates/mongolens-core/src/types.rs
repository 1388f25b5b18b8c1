//! Value types exchanged with the driver and the host

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

use crate::{MongolensError, Result};

/// Characters MongoDB rejects in database names
const INVALID_DATABASE_CHARS: [char; 6] = ['/', '\\', '.', ' ', '"', '$'];

/// A `database.collection` pair
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Check both names against the server's naming rules
    pub fn validate(&self) -> Result<()> {
        validate_database_name(&self.database)?;
        validate_collection_name(&self.collection)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

pub fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MongolensError::InvalidArgument(
            "database name must not be empty".to_string(),
        ));
    }
    if let Some(c) = name.chars().find(|c| INVALID_DATABASE_CHARS.contains(c)) {
        return Err(MongolensError::InvalidArgument(format!(
            "database name must not contain '{c}'"
        )));
    }
    Ok(())
}

pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MongolensError::InvalidArgument(
            "collection name must not be empty".to_string(),
        ));
    }
    if name.contains('$') {
        return Err(MongolensError::InvalidArgument(
            "collection name must not contain '$'".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Collection,
    View,
    Timeseries,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub kind: CollectionKind,
}

impl CollectionInfo {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CollectionKind::Collection,
        }
    }
}

/// A document listed under a collection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// The `_id` value as relaxed Extended JSON
    pub id: String,
}

/// A field path discovered by sampling documents
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Dotted path, e.g. `address.city`
    pub path: String,
    /// BSON type names observed for this path, in first-seen order
    pub types: Vec<String>,
}

/// Ordered index key specification, e.g. `{ "email": 1, "createdAt": -1 }`
pub type IndexKeys = IndexMap<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub keys: IndexKeys,
}

/// Target languages for playground export
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Csharp,
    Node,
    Ruby,
    Go,
    Rust,
    Php,
}

/// Where a document was opened from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    TreeView,
    CodeLens,
    Playground,
}
