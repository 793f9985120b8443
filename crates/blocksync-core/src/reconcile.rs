//! Merging existing block entries with discovered entries.

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntrySet, Schema};
use crate::error::{Error, Result};
use crate::lookup::Lookup;

/// How to merge an existing entry with a discovered entry sharing its key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Keep the existing entry untouched.
    #[default]
    KeepExisting,
    /// Replace it with the discovered entry, blanks included.
    PreferDiscovered,
    /// Take the listed fields from the discovered entry, the rest from the
    /// existing one.
    Override(Vec<String>),
}

impl MergePolicy {
    /// Ensure every override field belongs to `schema`.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if let MergePolicy::Override(fields) = self {
            for field in fields {
                if schema.index_of(field).is_none() {
                    return Err(Error::schema(format!(
                        "override field {:?} is not one of the fields {:?}",
                        field,
                        schema.fields()
                    )));
                }
            }
        }
        Ok(())
    }

    fn merge(&self, schema: &Schema, existing: &Entry, discovered: &Entry) -> Entry {
        match self {
            MergePolicy::KeepExisting => existing.clone(),
            MergePolicy::PreferDiscovered => discovered.clone(),
            MergePolicy::Override(fields) => fields
                .iter()
                .filter_map(|field| schema.index_of(field))
                .filter(|&index| index != schema.key_index())
                .fold(existing.clone(), |merged, index| {
                    merged.with_value(index, discovered.get(index).unwrap_or_default())
                }),
        }
    }
}

/// Result of reconciliation, with the keys that moved in each direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub entries: EntrySet,
    /// Keys only present in discovery, now inserted.
    pub added: Vec<String>,
    /// Keys present on both sides whose fields changed under the policy.
    pub updated: Vec<String>,
    /// Keys only present in the existing block, kept as they were.
    pub retained: Vec<String>,
    /// Keys only present in the existing block, dropped because of pruning.
    pub pruned: Vec<String>,
    /// Added keys whose display value fell back to the key itself.
    pub lookup_misses: Vec<String>,
}

/// Reconciles existing and discovered entry sets under a policy.
pub struct Reconciler<'a> {
    schema: &'a Schema,
    policy: &'a MergePolicy,
    lookup: &'a dyn Lookup,
    prune: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(schema: &'a Schema, policy: &'a MergePolicy, lookup: &'a dyn Lookup) -> Self {
        Self {
            schema,
            policy,
            lookup,
            prune: false,
        }
    }

    /// Drop existing entries that discovery no longer reports.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Merge `discovered` into `existing`.
    ///
    /// Every key of `existing ∪ discovered` appears exactly once in the
    /// result, except existing-only keys when pruning is enabled.
    pub fn reconcile(&self, existing: EntrySet, mut discovered: EntrySet) -> Reconciled {
        let mut out = Reconciled::default();

        for current in existing {
            match discovered.remove(current.key()) {
                Some(found) => {
                    let (found, _) = self.fill_display(found);
                    let merged = self.policy.merge(self.schema, &current, &found);
                    if merged != current {
                        tracing::debug!(key = current.key(), "updated entry");
                        out.updated.push(current.key().to_string());
                    }
                    out.entries.insert(merged);
                }
                None if self.prune => {
                    tracing::info!(key = current.key(), "pruned entry no longer discovered");
                    out.pruned.push(current.key().to_string());
                }
                None => {
                    out.retained.push(current.key().to_string());
                    out.entries.insert(current);
                }
            }
        }

        for found in discovered {
            let (entry, missed) = self.fill_display(found);
            if missed {
                tracing::warn!(key = entry.key(), "no display name found, using key");
                out.lookup_misses.push(entry.key().to_string());
            }
            tracing::debug!(key = entry.key(), "added entry");
            out.added.push(entry.key().to_string());
            out.entries.insert(entry);
        }

        out
    }

    /// Fill a blank display field from the lookup, else from the key.
    ///
    /// Applied to every discovered entry before merging, so a discovered
    /// blank never overwrites a name filled on an earlier run. The flag is
    /// set when the key had to stand in for the name.
    fn fill_display(&self, entry: Entry) -> (Entry, bool) {
        let Some(index) = self.schema.display_index() else {
            return (entry, false);
        };
        if !entry.get(index).unwrap_or_default().trim().is_empty() {
            return (entry, false);
        }

        match self.lookup.lookup(entry.key()) {
            Some(name) => (entry.with_value(index, name), false),
            None => {
                let key = entry.key().to_string();
                (entry.with_value(index, key), true)
            }
        }
    }
}
