//! The block synchronizer pipeline and its file-level driver.
//!
//! ```text
//! read -> locate -> parse existing -> discover -> reconcile -> serialize -> rewrite -> write
//! ```
//! Every fatal error surfaces before the write, so a failed run never
//! leaves a partially updated document behind.

use blocksync_fs::{Checksum, NormalizedPath, RobustnessConfig, io};
use serde::Serialize;

use crate::diff::BlockDiff;
use crate::discover::{Discover, Discovery, SkippedSource};
use crate::entry::{Entry, EntrySet, Schema};
use crate::error::Result;
use crate::extract::Extract;
use crate::lookup::Lookup;
use crate::marker::{Located, MarkerPair, locate};
use crate::reconcile::{MergePolicy, Reconciled, Reconciler};
use crate::serialize::{BodyFrame, SortOrder, Template, serialize};

/// Origin used for records that fail to parse inside the managed block.
const BLOCK_ORIGIN: &str = "<block>";

/// Synchronizes one marker-delimited block.
pub struct BlockSynchronizer {
    markers: MarkerPair,
    schema: Schema,
    existing: Box<dyn Extract>,
    template: Template,
    order: SortOrder,
    policy: MergePolicy,
    prune: bool,
}

impl BlockSynchronizer {
    /// Create a synchronizer.
    ///
    /// `existing` extracts entries already in the block; `template` renders
    /// one entry per line and is validated against `schema`.
    pub fn new(
        markers: MarkerPair,
        schema: Schema,
        existing: Box<dyn Extract>,
        template: &str,
    ) -> Result<Self> {
        let template = Template::parse(template, &schema)?;
        Ok(Self {
            markers,
            schema,
            existing,
            template,
            order: SortOrder::default(),
            policy: MergePolicy::default(),
            prune: false,
        })
    }

    pub fn with_order(mut self, order: SortOrder) -> Result<Self> {
        order.validate(&self.schema)?;
        self.order = order;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Result<Self> {
        policy.validate(&self.schema)?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn markers(&self) -> &MarkerPair {
        &self.markers
    }

    pub fn locate<'a>(&self, document: &'a str) -> Result<Located<'a>> {
        Ok(locate(document, &self.markers)?)
    }

    /// Entries currently in `body`. Later duplicates replace earlier ones.
    pub fn parse_existing(&self, body: &str) -> (EntrySet, Vec<SkippedSource>) {
        let mut parsed = Discovery::new();
        parsed.accept_records(&self.schema, self.existing.extract(body), BLOCK_ORIGIN);
        (parsed.entries, parsed.skipped)
    }

    /// Render `set` as a new body, keeping the frame of `current_body`.
    pub fn serialize(&self, set: &EntrySet, current_body: &str) -> String {
        serialize(
            set,
            &self.schema,
            &self.order,
            &self.template,
            &BodyFrame::of(current_body),
        )
    }

    /// Entries of the document's block in rendered order.
    pub fn entries(&self, document: &str) -> Result<Vec<Entry>> {
        let located = self.locate(document)?;
        let (set, _) = self.parse_existing(located.body);
        Ok(self
            .order
            .sorted(&set, &self.schema)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Run the in-memory pipeline on `document`.
    pub fn synchronize(
        &self,
        document: &str,
        discovered: Discovery,
        lookup: &dyn Lookup,
    ) -> Result<SyncOutcome> {
        let located = self.locate(document)?;
        let (existing, mut skipped) = self.parse_existing(located.body);
        skipped.extend(discovered.skipped);

        let reconciled = Reconciler::new(&self.schema, &self.policy, lookup)
            .with_prune(self.prune)
            .reconcile(existing, discovered.entries);

        let body = self.serialize(&reconciled.entries, located.body);
        let output = located.rewrite(&self.markers, &body);
        let changed = output != document;

        Ok(SyncOutcome {
            document: output,
            changed,
            reconciled,
            skipped,
        })
    }
}

/// Result of [`BlockSynchronizer::synchronize`].
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The full rewritten document.
    pub document: String,
    pub changed: bool,
    pub reconciled: Reconciled,
    pub skipped: Vec<SkippedSource>,
}

/// Whether [`sync_file`] writes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Apply,
    DryRun,
}

/// Per-document report, serializable for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub document: String,
    pub changed: bool,
    pub written: bool,
    pub entries: usize,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub retained: Vec<String>,
    pub pruned: Vec<String>,
    pub lookup_misses: Vec<String>,
    pub skipped: Vec<SkippedSource>,
    pub checksum_before: Checksum,
    pub checksum_after: Checksum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<BlockDiff>,
}

/// Synchronize the block of the document at `path`.
///
/// Markers are checked before discovery runs. The file is rewritten only
/// when its content changes and `mode` is [`WriteMode::Apply`].
pub fn sync_file(
    path: &NormalizedPath,
    synchronizer: &BlockSynchronizer,
    discover: &dyn Discover,
    lookup: &dyn Lookup,
    mode: WriteMode,
    robustness: RobustnessConfig,
) -> Result<SyncReport> {
    let original = io::read_text(path)?;
    synchronizer.locate(&original)?;

    let discovery = discover.discover(synchronizer.schema())?;
    let outcome = synchronizer.synchronize(&original, discovery, lookup)?;

    let written = outcome.changed && mode == WriteMode::Apply;
    if written {
        io::write_atomic(path, outcome.document.as_bytes(), robustness)?;
    }

    let reconciled = outcome.reconciled;
    tracing::info!(
        document = %path,
        changed = outcome.changed,
        written,
        added = reconciled.added.len(),
        updated = reconciled.updated.len(),
        pruned = reconciled.pruned.len(),
        skipped = outcome.skipped.len(),
        "synchronized block"
    );

    Ok(SyncReport {
        document: path.to_string(),
        changed: outcome.changed,
        written,
        entries: reconciled.entries.len(),
        added: reconciled.added,
        updated: reconciled.updated,
        retained: reconciled.retained,
        pruned: reconciled.pruned,
        lookup_misses: reconciled.lookup_misses,
        skipped: outcome.skipped,
        checksum_before: Checksum::of(&original),
        checksum_after: Checksum::of(&outcome.document),
        diff: outcome
            .changed
            .then(|| BlockDiff::compute(&original, &outcome.document, path.as_str())),
    })
}
