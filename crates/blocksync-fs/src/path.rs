//! Forward-slash paths shared by job files, discovery and reports

use std::fmt;
use std::path::{Path, PathBuf};

/// A path normalized to forward slashes with `.` and `..` segments folded.
///
/// Job files and discovery reports refer to paths in this form so that the
/// same configuration produces identical output on every platform. Conversion
/// to a native path happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Normalize any path-like input. Backslashes become forward slashes.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self {
            inner: clean(&raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Native form, for handing to `std::fs`.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append `segment` and normalize the result.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() || self.inner == "." {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Resolve this path against `base` unless it is already absolute.
    pub fn resolve_against(&self, base: &NormalizedPath) -> Self {
        if self.is_absolute() {
            self.clone()
        } else {
            base.join(&self.inner)
        }
    }

    /// Path of `self` relative to `base`, if `self` lies under it.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<String> {
        if base.inner.is_empty() || base.inner == "." {
            return Some(self.inner.clone());
        }
        let prefix = base.inner.trim_end_matches('/');
        let rest = self.inner.strip_prefix(prefix)?;
        if rest.is_empty() {
            Some(String::new())
        } else {
            rest.strip_prefix('/').map(str::to_string)
        }
    }

    /// Whether the path is rooted (`/x`, `//server/x`, or `C:/x`).
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || has_drive_prefix(&self.inner)
    }

    /// Containing directory; `.` for a bare file name, `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(0) => None,
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None if self.inner.is_empty() || self.inner == "." => None,
            None => Some(Self {
                inner: ".".to_string(),
            }),
        }
    }

    /// Last segment, unless it is `.` or `..`.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
    }

    /// Text after the last dot of the file name; dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            match name.rfind('.') {
                Some(0) | None => None,
                Some(dot) => Some(&name[dot + 1..]),
            }
        })
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Fold `.`/`..`/empty segments. Leading `..` survives on relative paths;
/// on rooted paths it is dropped at the root.
fn clean(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let (root, rest) = if let Some(rest) = raw.strip_prefix("//") {
        if rest.starts_with('/') {
            ("/", rest.trim_start_matches('/'))
        } else {
            ("//", rest)
        }
    } else if let Some(rest) = raw.strip_prefix('/') {
        ("/", rest)
    } else {
        ("", raw)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&"..") | None if root.is_empty() => segments.push(".."),
                Some(last) if has_drive_prefix(last) && last.len() == 2 => {}
                Some(_) => {
                    segments.pop();
                }
                None => {}
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if root.is_empty() && joined.is_empty() {
        ".".to_string()
    } else {
        format!("{}{}", root, joined)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

macro_rules! normalized_from {
    ($($source:ty),*) => {$(
        impl From<$source> for NormalizedPath {
            fn from(path: $source) -> Self {
                Self::new(path)
            }
        }
    )*};
}

normalized_from!(&str, String, PathBuf, &Path);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_strips_base() {
        let base = NormalizedPath::new("/repo/src");
        let file = NormalizedPath::new("/repo/src/providers/Foo.kt");
        assert_eq!(file.relative_to(&base).as_deref(), Some("providers/Foo.kt"));
    }

    #[test]
    fn relative_to_rejects_sibling_prefix() {
        let base = NormalizedPath::new("/repo/src");
        let file = NormalizedPath::new("/repo/srcx/Foo.kt");
        assert_eq!(file.relative_to(&base), None);
    }

    #[test]
    fn resolve_against_keeps_absolute() {
        let base = NormalizedPath::new("/repo");
        assert_eq!(
            NormalizedPath::new("/etc/x").resolve_against(&base).as_str(),
            "/etc/x"
        );
        assert_eq!(
            NormalizedPath::new("../shared/x.json")
                .resolve_against(&base.join("tools"))
                .as_str(),
            "/repo/shared/x.json"
        );
    }

    #[test]
    fn parent_of_single_segment_is_current_dir() {
        assert_eq!(NormalizedPath::new("blocksync.toml").parent().unwrap().as_str(), ".");
    }
}
