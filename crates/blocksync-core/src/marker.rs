//! Locating and rewriting the marker-delimited block.
//!
//! A document is split into three parts around a unique marker pair:
//! ```text
//! <prefix><begin marker><body><end marker><suffix>
//! ```
//! The split is exact: concatenating the parts with the markers reproduces
//! the input byte for byte.

use crate::error::MarkerError;

/// A validated begin/end marker pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    begin: String,
    end: String,
}

impl MarkerPair {
    /// Create a marker pair.
    ///
    /// Neither marker may be empty, and neither may contain the other, since
    /// occurrence counting would then be ambiguous.
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Result<Self, MarkerError> {
        let begin = begin.into();
        let end = end.into();

        if begin.is_empty() || end.is_empty() {
            return Err(MarkerError::Invalid {
                reason: "markers must not be empty".into(),
            });
        }
        if begin.contains(end.as_str()) || end.contains(begin.as_str()) {
            return Err(MarkerError::Invalid {
                reason: format!("{:?} and {:?} overlap", begin, end),
            });
        }

        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// A document split around its managed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located<'a> {
    /// Text before the begin marker.
    pub prefix: &'a str,
    /// Text strictly between the markers.
    pub body: &'a str,
    /// Text after the end marker.
    pub suffix: &'a str,
}

impl Located<'_> {
    /// Reassemble the document with `body` in place of the current body.
    pub fn rewrite(&self, markers: &MarkerPair, body: &str) -> String {
        rewrite(self.prefix, markers, body, self.suffix)
    }
}

/// Split `document` into prefix, body and suffix around `markers`.
///
/// # Errors
/// - [`MarkerError::Missing`] if either marker is absent
/// - [`MarkerError::Duplicated`] if either marker occurs more than once
/// - [`MarkerError::OutOfOrder`] if the end marker precedes the begin marker
///
/// # Example
/// ```
/// use blocksync_core::marker::{MarkerPair, locate};
///
/// let markers = MarkerPair::new("// begin", "// end").unwrap();
/// let located = locate("a\n// begin\nx\n// end\nb", &markers).unwrap();
/// assert_eq!(located.prefix, "a\n");
/// assert_eq!(located.body, "\nx\n");
/// assert_eq!(located.suffix, "\nb");
/// ```
pub fn locate<'a>(document: &'a str, markers: &MarkerPair) -> Result<Located<'a>, MarkerError> {
    let begin_at = single_occurrence(document, markers.begin())?;
    let end_at = single_occurrence(document, markers.end())?;

    let body_start = begin_at + markers.begin().len();
    if end_at < body_start {
        return Err(MarkerError::OutOfOrder {
            begin: markers.begin().to_string(),
            end: markers.end().to_string(),
        });
    }

    Ok(Located {
        prefix: &document[..begin_at],
        body: &document[body_start..end_at],
        suffix: &document[end_at + markers.end().len()..],
    })
}

/// Concatenate the parts of a document around a new body.
pub fn rewrite(prefix: &str, markers: &MarkerPair, body: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(
        prefix.len() + markers.begin().len() + body.len() + markers.end().len() + suffix.len(),
    );
    out.push_str(prefix);
    out.push_str(markers.begin());
    out.push_str(body);
    out.push_str(markers.end());
    out.push_str(suffix);
    out
}

/// Byte offset of the only occurrence of `marker`, counting overlapping hits.
fn single_occurrence(document: &str, marker: &str) -> Result<usize, MarkerError> {
    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(offset) = document[from..].find(marker) {
        let at = from + offset;
        positions.push(at);
        // Step one char so overlapping occurrences are counted too.
        let step = document[at..].chars().next().map_or(1, char::len_utf8);
        from = at + step;
    }

    match positions.as_slice() {
        [] => Err(MarkerError::Missing {
            marker: marker.to_string(),
        }),
        [at] => Ok(*at),
        many => Err(MarkerError::Duplicated {
            marker: marker.to_string(),
            count: many.len(),
        }),
    }
}
