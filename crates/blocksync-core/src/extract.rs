//! Pluggable extraction rules.
//!
//! An extractor turns a piece of text into zero or more [`Record`]s of named
//! fields. The same trait serves both for reading entries back out of the
//! managed block and for scanning discovered source files.

use regex::Regex;

use crate::entry::Record;
use crate::error::{Error, Result};

/// Extracts field tuples from text.
pub trait Extract {
    fn extract(&self, text: &str) -> Vec<Record>;
}

/// One record per non-overlapping match of a regex with named groups.
///
/// Each named group that participated in the match becomes a field.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    regex: Regex,
}

impl PatternExtractor {
    /// Compile `pattern`. It must declare at least one named group.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::pattern(pattern, e))?;
        if regex.capture_names().flatten().next().is_none() {
            return Err(Error::schema(format!(
                "pattern {:?} has no named groups",
                pattern
            )));
        }
        Ok(Self { regex })
    }

    /// Names of the groups this pattern can produce.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }
}

impl Extract for PatternExtractor {
    fn extract(&self, text: &str) -> Vec<Record> {
        self.regex
            .captures_iter(text)
            .map(|caps| {
                self.regex
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        caps.name(name)
                            .map(|m| (name.to_string(), m.as_str().to_string()))
                    })
                    .collect::<Record>()
            })
            .collect()
    }
}

/// One record per text, each field found by its own regex.
///
/// Suited to files that declare one item through several independent
/// statements, e.g. a class with separate `name` and `url` properties. The
/// field value is the first capture group of the first match, or the whole
/// match when the rule has no groups.
#[derive(Debug, Clone)]
pub struct FieldRulesExtractor {
    rules: Vec<(String, Regex)>,
}

impl FieldRulesExtractor {
    pub fn new<I, K, V>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|(field, pattern)| {
                let pattern = pattern.as_ref();
                Regex::new(pattern)
                    .map(|regex| (field.into(), regex))
                    .map_err(|e| Error::pattern(pattern, e))
            })
            .collect::<Result<Vec<_>>>()?;

        if rules.is_empty() {
            return Err(Error::schema("at least one field rule is required"));
        }
        Ok(Self { rules })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(field, _)| field.as_str())
    }
}

impl Extract for FieldRulesExtractor {
    fn extract(&self, text: &str) -> Vec<Record> {
        let record: Record = self
            .rules
            .iter()
            .filter_map(|(field, regex)| {
                let caps = regex.captures(text)?;
                let value = caps.get(1).or_else(|| caps.get(0))?;
                Some((field.clone(), value.as_str().to_string()))
            })
            .collect();

        if record.is_empty() {
            Vec::new()
        } else {
            vec![record]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_extracts_every_match() {
        let extractor =
            PatternExtractor::new(r#"Triple\("(?P<flag>[^"]*)", "(?P<name>[^"]*)", "(?P<code>[^"]*)"\)"#)
                .unwrap();
        let text = r#"
    Triple("", "Dutch", "nl"),
    Triple("x", "English", "en"),
"#;
        let records = extractor.extract(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Dutch");
        assert_eq!(records[1]["flag"], "x");
    }

    #[test]
    fn test_pattern_requires_named_group() {
        assert!(PatternExtractor::new(r"Triple\((.*)\)").is_err());
        assert!(matches!(
            PatternExtractor::new(r"(?P<open"),
            Err(Error::Pattern { .. })
        ));
    }

    #[test]
    fn test_field_rules_yield_single_record() {
        let extractor = FieldRulesExtractor::new([
            ("name", r#"override\s+var\s+name\s*=\s*"([^"]+)""#),
            ("url", r#"override\s+var\s+mainUrl\s*=\s*"([^"]+)""#),
        ])
        .unwrap();
        let text = r#"
class ExampleProvider : MainAPI() {
    override var mainUrl = "https://example.org"
    override var name = "Example"
}
"#;
        let records = extractor.extract(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Example");
        assert_eq!(records[0]["url"], "https://example.org");
    }

    #[test]
    fn test_field_rules_no_match_is_empty() {
        let extractor = FieldRulesExtractor::new([("name", "name = (\\w+)")]).unwrap();
        assert!(extractor.extract("nothing here").is_empty());
    }
}
