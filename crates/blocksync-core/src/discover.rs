//! Discovery adapters: enumerate candidate entries from the filesystem.
//!
//! Discovery only ever contributes entries; whether entries missing from a
//! discovery run are dropped from the block is decided by reconciliation.

use std::fs;
use std::path::{Path, PathBuf};

use blocksync_fs::NormalizedPath;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entry::{EntrySet, Schema};
use crate::error::{Error, Result};
use crate::extract::{Extract, PatternExtractor};

/// A candidate source that was skipped during discovery or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    /// Where the candidate came from (relative path, directory name, ...).
    pub origin: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub entries: EntrySet,
    pub skipped: Vec<SkippedSource>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped candidate and log it.
    pub fn skip(&mut self, origin: impl Into<String>, reason: impl Into<String>) {
        let skipped = SkippedSource {
            origin: origin.into(),
            reason: reason.into(),
        };
        tracing::warn!(origin = %skipped.origin, reason = %skipped.reason, "skipping source");
        self.skipped.push(skipped);
    }

    /// Build entries from extracted records, skipping those without a key.
    pub(crate) fn accept_records(
        &mut self,
        schema: &Schema,
        records: Vec<crate::entry::Record>,
        origin: &str,
    ) {
        for record in records {
            match schema.entry_from_record(&record, origin) {
                Ok(entry) => {
                    tracing::debug!(key = entry.key(), origin, "discovered entry");
                    if let Some(previous) = self.entries.insert(entry) {
                        tracing::debug!(key = previous.key(), origin, "replaced earlier duplicate");
                    }
                }
                Err(e) => self.skip(origin, e.to_string()),
            }
        }
    }
}

/// Enumerates candidate entries.
pub trait Discover {
    fn discover(&self, schema: &Schema) -> Result<Discovery>;
}

/// A fixed set of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    entries: EntrySet,
}

impl StaticDiscovery {
    pub fn new(entries: EntrySet) -> Self {
        Self { entries }
    }
}

impl Discover for StaticDiscovery {
    fn discover(&self, _schema: &Schema) -> Result<Discovery> {
        Ok(Discovery {
            entries: self.entries.clone(),
            skipped: Vec::new(),
        })
    }
}

/// Which directory entries a [`DirectoryDiscovery`] considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Directories,
    Files,
    Any,
}

impl EntryKind {
    fn accepts(self, path: &Path) -> bool {
        match self {
            EntryKind::Directories => path.is_dir(),
            EntryKind::Files => path.is_file(),
            EntryKind::Any => true,
        }
    }
}

/// Lists the immediate children of a directory and matches their names.
///
/// The pattern's named groups become fields, so `^values-(?P<code>[a-z]{2})$`
/// turns a `values-nl` resource directory into an entry keyed `nl`. Names
/// that do not match are ignored.
#[derive(Debug, Clone)]
pub struct DirectoryDiscovery {
    root: NormalizedPath,
    pattern: PatternExtractor,
    kind: EntryKind,
}

impl DirectoryDiscovery {
    pub fn new(root: impl Into<NormalizedPath>, pattern: &str) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            pattern: PatternExtractor::new(pattern)?,
            kind: EntryKind::default(),
        })
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Discover for DirectoryDiscovery {
    fn discover(&self, schema: &Schema) -> Result<Discovery> {
        let native = self.root.to_native();
        let mut names: Vec<(String, PathBuf)> = Vec::new();
        let mut discovery = Discovery::new();

        let read = fs::read_dir(&native).map_err(|e| blocksync_fs::Error::io(&native, e))?;
        for item in read {
            let item = item.map_err(|e| blocksync_fs::Error::io(&native, e))?;
            let path = item.path();
            match item.file_name().into_string() {
                Ok(name) => names.push((name, path)),
                Err(raw) => discovery.skip(raw.to_string_lossy(), "name is not valid UTF-8"),
            }
        }
        names.sort();

        for (name, path) in names {
            if !self.kind.accepts(&path) {
                continue;
            }
            let Some(record) = self.pattern.extract(&name).into_iter().next() else {
                tracing::trace!(name, "name does not match");
                continue;
            };
            discovery.accept_records(schema, vec![record], &name);
        }

        tracing::debug!(
            root = %self.root,
            found = discovery.entries.len(),
            "directory discovery finished"
        );
        Ok(discovery)
    }
}

/// Recursively scans files under a root and extracts entries from their text.
///
/// Files are visited in sorted order. A file is considered when its path
/// relative to the root (forward slashes) matches `include` and does not
/// match `exclude`. Unreadable or non-UTF-8 files are skipped, not fatal.
pub struct SourceScanDiscovery {
    root: NormalizedPath,
    include: Regex,
    exclude: Option<Regex>,
    extractor: Box<dyn Extract>,
}

impl SourceScanDiscovery {
    pub fn new(
        root: impl Into<NormalizedPath>,
        include: &str,
        extractor: Box<dyn Extract>,
    ) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            include: Regex::new(include).map_err(|e| Error::pattern(include, e))?,
            exclude: None,
            extractor,
        })
    }

    pub fn with_exclude(mut self, exclude: &str) -> Result<Self> {
        self.exclude = Some(Regex::new(exclude).map_err(|e| Error::pattern(exclude, e))?);
        Ok(self)
    }

    fn wanted(&self, relative: &str) -> bool {
        self.include.is_match(relative)
            && !self.exclude.as_ref().is_some_and(|ex| ex.is_match(relative))
    }
}

impl Discover for SourceScanDiscovery {
    fn discover(&self, schema: &Schema) -> Result<Discovery> {
        let mut discovery = Discovery::new();
        let mut files = Vec::new();

        let root = self.root.to_native();
        let top = read_sorted(&root).map_err(|e| blocksync_fs::Error::io(&root, e))?;
        walk(top, &self.root, &mut files, &mut discovery);

        let mut scanned = 0usize;
        for file in files {
            let Some(relative) = file.relative_to(&self.root) else {
                continue;
            };
            if !self.wanted(&relative) {
                continue;
            }
            scanned += 1;

            let text = match fs::read_to_string(file.to_native()) {
                Ok(text) => text,
                Err(e) => {
                    discovery.skip(relative, e.to_string());
                    continue;
                }
            };

            let records = self.extractor.extract(&text);
            if records.is_empty() {
                tracing::debug!(file = %relative, "no entries in file");
                continue;
            }
            discovery.accept_records(schema, records, &relative);
        }

        tracing::debug!(
            root = %self.root,
            scanned,
            found = discovery.entries.len(),
            "source scan finished"
        );
        Ok(discovery)
    }
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|item| item.map(|i| i.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

fn walk(
    paths: Vec<PathBuf>,
    root: &NormalizedPath,
    files: &mut Vec<NormalizedPath>,
    discovery: &mut Discovery,
) {
    for path in paths {
        let is_symlink = path.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink());
        if path.is_dir() {
            // Symlinked directories are not followed, which rules out cycles.
            if is_symlink {
                continue;
            }
            match read_sorted(&path) {
                Ok(children) => walk(children, root, files, discovery),
                Err(e) => {
                    let origin = NormalizedPath::new(&path)
                        .relative_to(root)
                        .unwrap_or_else(|| path.display().to_string());
                    discovery.skip(origin, e.to_string());
                }
            }
        } else if path.is_file() {
            files.push(NormalizedPath::new(&path));
        }
    }
}
