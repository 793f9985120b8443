//! Auxiliary key → display-name tables.

use std::collections::{BTreeMap, HashMap};

use blocksync_fs::{ConfigStore, NormalizedPath};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// A possibly-incomplete mapping from entry key to display value.
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Lookup that knows nothing; every key falls back to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl Lookup for NoLookup {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A lookup table loaded from a local JSON, YAML or TOML file.
///
/// Two shapes are accepted:
/// - a flat object, `{"nl": "Dutch", ...}`
/// - an array of records, `[{"code": "nl", "name": "Dutch"}, ...]`, read
///   through a key field and a value field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLookup {
    table: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableFile {
    Flat(HashMap<String, String>),
    Records(Vec<serde_json::Map<String, Value>>),
}

/// Field names used to read an array-of-records table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub key: String,
    pub value: String,
}

impl TableLookup {
    pub fn from_map(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Load a table from disk.
    ///
    /// `fields` is required when the file holds an array of records and
    /// ignored for flat tables. Records lacking either field are skipped.
    pub fn load(path: &NormalizedPath, fields: Option<&RecordFields>) -> Result<Self> {
        let file: TableFile = ConfigStore::new().load(path)?;
        let table = match file {
            TableFile::Flat(table) => table,
            TableFile::Records(records) => {
                let fields = fields.ok_or_else(|| Error::Lookup {
                    message: format!(
                        "{} holds an array of records; key and value fields are required",
                        path
                    ),
                })?;
                records_to_table(records, fields)
            }
        };

        tracing::debug!(path = %path, size = table.len(), "loaded lookup table");
        Ok(Self { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn records_to_table(
    records: Vec<serde_json::Map<String, Value>>,
    fields: &RecordFields,
) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for record in records {
        let key = record.get(&fields.key).and_then(scalar_text);
        let value = record.get(&fields.value).and_then(scalar_text);
        match (key, value) {
            (Some(key), Some(value)) if !key.is_empty() => {
                // First record for a key wins.
                table.entry(key).or_insert(value);
            }
            _ => tracing::trace!(?record, "lookup record lacks key or value"),
        }
    }
    table
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Lookup for TableLookup {
    fn lookup(&self, key: &str) -> Option<String> {
        self.table.get(key).cloned()
    }
}
