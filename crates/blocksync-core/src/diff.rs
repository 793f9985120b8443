//! Line diff between the current and the synchronized document

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Summary and unified rendering of a document change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockDiff {
    pub insertions: usize,
    pub deletions: usize,
    /// Similarity ratio (0.0 to 1.0)
    pub similarity: f64,
    pub unified: String,
}

impl BlockDiff {
    /// Compute a line diff; `label` names the file in the unified header.
    pub fn compute(old: &str, new: &str, label: &str) -> Self {
        if old == new {
            return Self {
                insertions: 0,
                deletions: 0,
                similarity: 1.0,
                unified: String::new(),
            };
        }

        let text_diff = TextDiff::from_lines(old, new);
        let (mut insertions, mut deletions) = (0, 0);
        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        let unified = text_diff
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{}", label), &format!("b/{}", label))
            .to_string();

        Self {
            insertions,
            deletions,
            similarity: text_diff.ratio() as f64,
            unified,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}
