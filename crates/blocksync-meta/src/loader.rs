//! Build runnable jobs from a job file
//!
//! ```text
//! project/
//!   blocksync.toml          <- job file; relative paths resolve from here
//!   README.md               <- document
//!   library/src/...         <- discovery root
//! ```

use std::fs;

use blocksync_core::{
    BlockSynchronizer, Discover, DirectoryDiscovery, Entry, Extract, FieldRulesExtractor,
    Lookup, MarkerPair, NoLookup, PatternExtractor, RecordFields, Schema, SortOrder,
    SourceScanDiscovery, SyncReport, TableLookup, WriteMode, sync_file,
};
use blocksync_fs::{ConfigStore, NormalizedPath, RobustnessConfig, io};

use crate::config::{DiscoverConfig, ExtractConfig, JobConfig, JobFile, LookupConfig};
use crate::validation;
use crate::{Error, Result};

/// Default job file name, looked up in the working directory.
pub const JOB_FILE_NAME: &str = "blocksync.toml";

/// Job files larger than this are rejected before parsing.
const MAX_JOB_FILE_SIZE: u64 = 1024 * 1024;

/// A lookup table to load when the job runs.
#[derive(Debug, Clone)]
struct LookupSource {
    path: NormalizedPath,
    fields: Option<RecordFields>,
}

/// One configured block, ready to run.
pub struct Job {
    name: String,
    document: NormalizedPath,
    synchronizer: BlockSynchronizer,
    discover: Box<dyn Discover>,
    discover_kind: &'static str,
    lookup: Option<LookupSource>,
}

impl Job {
    /// Build a job, resolving relative paths against `base`.
    pub fn from_config(config: &JobConfig, base: &NormalizedPath) -> Result<Self> {
        let invalid = |source: blocksync_core::Error| Error::InvalidJob {
            job: config.name.clone(),
            source,
        };

        let markers = MarkerPair::new(config.begin_marker.as_str(), config.end_marker.as_str())
            .map_err(|e| invalid(e.into()))?;
        let mut schema = Schema::new(&config.fields, &config.key).map_err(invalid)?;
        if let Some(display) = &config.display {
            schema = schema.with_display(display).map_err(invalid)?;
        }

        let existing = PatternExtractor::new(&config.entry_pattern).map_err(invalid)?;
        if !existing.field_names().any(|f| f == config.key) {
            return Err(invalid(blocksync_core::Error::schema(format!(
                "entry_pattern has no named group for key field {:?}",
                config.key
            ))));
        }

        let order = match &config.sort_by {
            Some(field) => SortOrder::Field(field.clone()),
            None => SortOrder::Key,
        };
        let synchronizer =
            BlockSynchronizer::new(markers, schema, Box::new(existing), &config.template)
                .and_then(|s| s.with_order(order))
                .and_then(|s| s.with_policy(config.policy.clone()))
                .map_err(invalid)?
                .with_prune(config.prune);

        let discover = build_discover(&config.discover, &config.key, base).map_err(invalid)?;

        Ok(Self {
            name: config.name.clone(),
            document: NormalizedPath::new(&config.document).resolve_against(base),
            synchronizer,
            discover,
            discover_kind: config.discover.kind(),
            lookup: config.lookup.as_ref().map(|l| lookup_source(l, base)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &NormalizedPath {
        &self.document
    }

    /// `"directory"` or `"source-scan"`.
    pub fn discover_kind(&self) -> &'static str {
        self.discover_kind
    }

    pub fn schema(&self) -> &Schema {
        self.synchronizer.schema()
    }

    /// Run discovery and synchronize the document.
    ///
    /// The lookup table is loaded first; a missing table aborts the job
    /// before the document is touched.
    pub fn run(&self, mode: WriteMode, robustness: RobustnessConfig) -> Result<SyncReport> {
        let failed = |source: blocksync_core::Error| Error::JobFailed {
            job: self.name.clone(),
            source,
        };

        let table;
        let lookup: &dyn Lookup = match &self.lookup {
            Some(source) => {
                table = TableLookup::load(&source.path, source.fields.as_ref()).map_err(failed)?;
                &table
            }
            None => &NoLookup,
        };

        tracing::debug!(job = %self.name, document = %self.document, "running job");
        sync_file(
            &self.document,
            &self.synchronizer,
            self.discover.as_ref(),
            lookup,
            mode,
            robustness,
        )
        .map_err(failed)
    }

    /// Entries currently in the block, in serialized order.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let document = io::read_text(&self.document)?;
        self.synchronizer
            .entries(&document)
            .map_err(|source| Error::JobFailed {
                job: self.name.clone(),
                source,
            })
    }
}

fn lookup_source(config: &LookupConfig, base: &NormalizedPath) -> LookupSource {
    let fields = match (&config.key_field, &config.value_field) {
        (Some(key), Some(value)) => Some(RecordFields {
            key: key.clone(),
            value: value.clone(),
        }),
        _ => None,
    };
    LookupSource {
        path: NormalizedPath::new(&config.path).resolve_against(base),
        fields,
    }
}

fn build_discover(
    config: &DiscoverConfig,
    key: &str,
    base: &NormalizedPath,
) -> blocksync_core::Result<Box<dyn Discover>> {
    match config {
        DiscoverConfig::Directory {
            root,
            pattern,
            entries,
        } => {
            let names = PatternExtractor::new(pattern)?;
            if !names.field_names().any(|f| f == key) {
                return Err(blocksync_core::Error::schema(format!(
                    "directory pattern has no named group for key field {:?}",
                    key
                )));
            }
            let root = NormalizedPath::new(root).resolve_against(base);
            Ok(Box::new(
                DirectoryDiscovery::new(root, pattern)?.with_kind(*entries),
            ))
        }
        DiscoverConfig::SourceScan {
            root,
            include,
            exclude,
            extract,
        } => {
            let extractor: Box<dyn Extract> = match extract {
                ExtractConfig::Pattern { pattern } => {
                    let extractor = PatternExtractor::new(pattern)?;
                    if !extractor.field_names().any(|f| f == key) {
                        return Err(blocksync_core::Error::schema(format!(
                            "extract pattern has no named group for key field {:?}",
                            key
                        )));
                    }
                    Box::new(extractor)
                }
                ExtractConfig::FieldRules { rules } => Box::new(FieldRulesExtractor::new(rules)?),
            };
            let root = NormalizedPath::new(root).resolve_against(base);
            let mut scan = SourceScanDiscovery::new(root, include, extractor)?;
            if let Some(exclude) = exclude {
                scan = scan.with_exclude(exclude)?;
            }
            Ok(Box::new(scan))
        }
    }
}

/// All jobs of one job file.
pub struct JobSet {
    path: NormalizedPath,
    jobs: Vec<Job>,
}

impl JobSet {
    /// Load, validate and build every job in the file at `path`.
    ///
    /// Nothing runs until every job has been built, so a single bad job
    /// fails the whole file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        let size = fs::metadata(&native)
            .map_err(|e| blocksync_fs::Error::io(native.clone(), e))?
            .len();
        if size > MAX_JOB_FILE_SIZE {
            return Err(Error::ConfigTooLarge {
                path: native,
                size,
                max: MAX_JOB_FILE_SIZE,
            });
        }

        let file: JobFile = ConfigStore::new().load(path)?;
        let base = path
            .parent()
            .unwrap_or_else(|| NormalizedPath::new("."));
        Self::from_file(file, path, &base)
    }

    /// Build from an already parsed job file.
    pub fn from_file(file: JobFile, path: &NormalizedPath, base: &NormalizedPath) -> Result<Self> {
        let problems = validation::problems(&file);
        if !problems.is_empty() {
            return Err(Error::InvalidConfig {
                path: path.to_native(),
                message: problems.join("; "),
            });
        }

        let jobs = file
            .jobs
            .iter()
            .map(|config| Job::from_config(config, base))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(path = %path, jobs = jobs.len(), "loaded job file");
        Ok(Self {
            path: path.clone(),
            jobs,
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Jobs named in `names`, in file order; all jobs when `names` is empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Job>> {
        if let Some(name) = names
            .iter()
            .find(|n| !self.jobs.iter().any(|j| j.name == **n))
        {
            return Err(Error::UnknownJob { name: name.clone() });
        }
        Ok(self
            .jobs
            .iter()
            .filter(|j| names.is_empty() || names.contains(&j.name))
            .collect())
    }
}
