//! Job file types
//!
//! ```toml
//! [[job]]
//! name = "sites"
//! document = "README.md"
//! begin_marker = "<!--SITE LIST START-->"
//! end_marker = "<!--SITE LIST END-->"
//! fields = ["name", "url"]
//! key = "name"
//! entry_pattern = '- \[(?P<name>[^\]]+)\]\((?P<url>[^)]*)\)'
//! template = "- [{name}]({url})"
//!
//! [job.discover]
//! kind = "source-scan"
//! root = "library/src"
//! include = '\.kt$'
//!
//! [job.discover.extract]
//! kind = "field-rules"
//! rules = { name = 'override var name = "([^"]+)"', url = 'override var mainUrl = "([^"]+)"' }
//! ```

use std::collections::BTreeMap;

use blocksync_core::{EntryKind, MergePolicy};
use serde::{Deserialize, Serialize};

/// Top-level job file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
}

/// One managed block and how to keep it in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Identifier used by `--job` and in reports.
    pub name: String,
    /// Document containing the block, relative to the job file.
    pub document: String,
    pub begin_marker: String,
    pub end_marker: String,
    /// Ordered entry fields.
    pub fields: Vec<String>,
    /// Field that identifies an entry.
    pub key: String,
    /// Field filled from the lookup table when discovery leaves it blank.
    #[serde(default)]
    pub display: Option<String>,
    /// Regex with named groups matching one entry inside the block.
    pub entry_pattern: String,
    /// Line template with `{field}` placeholders.
    pub template: String,
    /// Sort by this field (case-insensitive); key order when absent.
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub policy: MergePolicy,
    /// Drop entries that discovery no longer reports.
    #[serde(default)]
    pub prune: bool,
    pub discover: DiscoverConfig,
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

/// Where candidate entries come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum DiscoverConfig {
    /// Children of `root` whose names match `pattern`.
    Directory {
        root: String,
        pattern: String,
        #[serde(default)]
        entries: EntryKind,
    },
    /// Files under `root` whose relative path matches `include`.
    SourceScan {
        root: String,
        include: String,
        #[serde(default)]
        exclude: Option<String>,
        extract: ExtractConfig,
    },
}

impl DiscoverConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoverConfig::Directory { .. } => "directory",
            DiscoverConfig::SourceScan { .. } => "source-scan",
        }
    }
}

/// Extraction rule applied to each scanned file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum ExtractConfig {
    /// One entry per match of a regex with named groups.
    Pattern { pattern: String },
    /// One entry per file, one regex per field.
    FieldRules { rules: BTreeMap<String, String> },
}

/// Key → display-name table consulted for newly discovered entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupConfig {
    /// JSON, YAML or TOML file, relative to the job file.
    pub path: String,
    /// Key field for array-of-records tables.
    #[serde(default)]
    pub key_field: Option<String>,
    /// Value field for array-of-records tables.
    #[serde(default)]
    pub value_field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_forms() {
        #[derive(Deserialize)]
        struct Holder {
            policy: MergePolicy,
        }

        let parse = |s: &str| toml::from_str::<Holder>(s).unwrap().policy;
        assert_eq!(parse("policy = \"keep-existing\""), MergePolicy::KeepExisting);
        assert_eq!(
            parse("policy = \"prefer-discovered\""),
            MergePolicy::PreferDiscovered
        );
        assert_eq!(
            parse("policy = { override = [\"url\"] }"),
            MergePolicy::Override(vec!["url".into()])
        );
    }
}
