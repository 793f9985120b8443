//! Marker-delimited block synchronization.
//!
//! A managed block is the text between a unique begin marker and a unique
//! end marker in an otherwise hand-maintained file:
//!
//! ```text
//! val appLanguages = arrayListOf(
//!     /* begin language list */
//!     Triple("", "Dutch", "nl"),
//!     Triple("", "English", "en"),
//!     /* end language list */
//! )
//! ```
//!
//! [`BlockSynchronizer`] parses the entries in the block, merges them with
//! entries discovered elsewhere (a directory listing, a scan of source files)
//! under a [`MergePolicy`], and renders the result back in a deterministic
//! order. Everything outside the markers is preserved byte for byte.

pub mod diff;
pub mod discover;
pub mod entry;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod marker;
pub mod reconcile;
pub mod serialize;
pub mod sync;

pub use diff::BlockDiff;
pub use discover::{
    Discover, Discovery, DirectoryDiscovery, EntryKind, SkippedSource, SourceScanDiscovery,
    StaticDiscovery,
};
pub use entry::{Entry, EntrySet, Record, Schema};
pub use error::{Error, MarkerError, Result};
pub use extract::{Extract, FieldRulesExtractor, PatternExtractor};
pub use lookup::{Lookup, NoLookup, RecordFields, TableLookup};
pub use marker::{Located, MarkerPair, locate, rewrite};
pub use reconcile::{MergePolicy, Reconciled, Reconciler};
pub use serialize::{BodyFrame, SortOrder, Template};
pub use sync::{BlockSynchronizer, SyncOutcome, SyncReport, WriteMode, sync_file};
