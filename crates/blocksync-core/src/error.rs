//! Error types for blocksync-core

/// Result type for blocksync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Structural problems with the marker pair or its placement in a document.
///
/// Always fatal: the document is never written when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("Marker not found: {marker:?}")]
    Missing { marker: String },

    #[error("Marker {marker:?} occurs {count} times, expected exactly once")]
    Duplicated { marker: String, count: usize },

    #[error("End marker {end:?} does not follow begin marker {begin:?}")]
    OutOfOrder { begin: String, end: String },

    #[error("Invalid marker pair: {reason}")]
    Invalid { reason: String },
}

/// Errors that can occur in blocksync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Marker(#[from] MarkerError),

    #[error("Failed to extract entry from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid schema: {message}")]
    Schema { message: String },

    #[error("Invalid template {template:?}: {message}")]
    Template { template: String, message: String },

    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid lookup table: {message}")]
    Lookup { message: String },

    #[error(transparent)]
    Fs(#[from] blocksync_fs::Error),
}

impl Error {
    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub(crate) fn pattern(pattern: &str, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}
