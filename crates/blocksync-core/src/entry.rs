//! Entries, their schema, and keyed entry sets.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

use crate::error::{Error, Result};

/// Named field values produced by an extractor, before schema validation.
pub type Record = BTreeMap<String, String>;

/// Describes the ordered fields of an entry and which one is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
    key: usize,
    display: Option<usize>,
}

impl Schema {
    /// Create a schema from ordered field names and the name of the key field.
    ///
    /// # Errors
    /// Returns [`Error::Schema`] if the field list is empty, contains
    /// duplicates or blank names, or does not contain `key`.
    pub fn new<I, S>(fields: I, key: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::schema("at least one field is required"));
        }
        for (i, field) in fields.iter().enumerate() {
            if field.trim().is_empty() {
                return Err(Error::schema("field names must not be blank"));
            }
            if fields[..i].contains(field) {
                return Err(Error::schema(format!("duplicate field {:?}", field)));
            }
        }

        let key = position(&fields, key)?;
        Ok(Self {
            fields,
            key,
            display: None,
        })
    }

    /// Designate the field that holds the human-readable display value.
    pub fn with_display(mut self, display: &str) -> Result<Self> {
        self.display = Some(position(&self.fields, display)?);
        Ok(self)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn key_field(&self) -> &str {
        &self.fields[self.key]
    }

    pub fn display_field(&self) -> Option<&str> {
        self.display.map(|i| self.fields[i].as_str())
    }

    pub(crate) fn key_index(&self) -> usize {
        self.key
    }

    pub(crate) fn display_index(&self) -> Option<usize> {
        self.display
    }

    /// Index of a field by name.
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Build an entry from values given in field order.
    pub fn entry<I, S>(&self, values: I) -> Result<Entry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.fields.len() {
            return Err(Error::schema(format!(
                "expected {} values, got {}",
                self.fields.len(),
                values.len()
            )));
        }
        self.build(values).ok_or_else(|| {
            Error::schema(format!("key field {:?} is empty", self.key_field()))
        })
    }

    /// Build an entry from a record; missing fields become empty strings.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] attributed to `origin` if the key is missing
    /// or blank.
    pub fn entry_from_record(&self, record: &Record, origin: &str) -> Result<Entry> {
        let values = self
            .fields
            .iter()
            .map(|f| record.get(f).cloned().unwrap_or_default())
            .collect();
        self.build(values).ok_or_else(|| {
            Error::parse(origin, format!("no value for key field {:?}", self.key_field()))
        })
    }

    fn build(&self, values: Vec<String>) -> Option<Entry> {
        let key = values[self.key].trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Entry { key, values })
    }
}

fn position(fields: &[String], name: &str) -> Result<usize> {
    fields
        .iter()
        .position(|f| f == name)
        .ok_or_else(|| Error::schema(format!("{:?} is not one of the fields {:?}", name, fields)))
}

/// One immutable record synchronized into the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    key: String,
    values: Vec<String>,
}

impl Entry {
    /// The identity of this entry (the trimmed key field value).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All field values in schema order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at a field index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Copy of this entry with one non-key field replaced.
    pub(crate) fn with_value(&self, index: usize, value: impl Into<String>) -> Entry {
        let mut values = self.values.clone();
        values[index] = value.into();
        Entry {
            key: self.key.clone(),
            values,
        }
    }
}

/// Entries keyed by identity. Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: BTreeMap<String, Entry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced (last insert wins).
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
}

impl FromIterator<Entry> for EntrySet {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        let mut set = EntrySet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl IntoIterator for EntrySet {
    type Item = Entry;
    type IntoIter = btree_map::IntoValues<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
