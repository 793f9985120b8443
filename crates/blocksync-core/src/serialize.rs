//! Rendering an entry set back into block text.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntrySet, Schema};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(usize),
}

/// A line template with `{field}` placeholders.
///
/// `{{` and `}}` produce literal braces. Placeholders are resolved against a
/// schema when the template is parsed, so rendering cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template for the given schema.
    ///
    /// # Example
    /// ```
    /// use blocksync_core::{Schema, Template};
    ///
    /// let schema = Schema::new(["name", "url"], "name").unwrap();
    /// let template = Template::parse("- [{name}]({url})", &schema).unwrap();
    /// let entry = schema.entry(["Example", "https://example.org"]).unwrap();
    /// assert_eq!(template.render(&entry), "- [Example](https://example.org)");
    /// ```
    pub fn parse(source: &str, schema: &Schema) -> Result<Self> {
        let invalid = |message: String| Error::Template {
            template: source.to_string(),
            message,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(invalid("unclosed placeholder".into())),
                        }
                    }
                    let index = schema
                        .index_of(name.trim())
                        .ok_or_else(|| invalid(format!("unknown field {:?}", name.trim())))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(index));
                }
                '}' => return Err(invalid("unmatched '}'".into())),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Render one entry.
    pub fn render(&self, entry: &Entry) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(index) => out.push_str(entry.get(*index).unwrap_or_default()),
            }
        }
        out
    }
}

/// Order of entries in the rendered block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Lexicographic by key.
    #[default]
    Key,
    /// Case-insensitive by the named field, ties broken by key.
    Field(String),
}

impl SortOrder {
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        match self {
            SortOrder::Key => Ok(()),
            SortOrder::Field(field) if schema.index_of(field).is_some() => Ok(()),
            SortOrder::Field(field) => Err(Error::schema(format!(
                "sort field {:?} is not one of the fields {:?}",
                field,
                schema.fields()
            ))),
        }
    }

    /// Entries of `set` in this order. Total and stable: no two distinct
    /// entries compare equal because keys are unique.
    pub fn sorted<'a>(&self, set: &'a EntrySet, schema: &Schema) -> Vec<&'a Entry> {
        let mut entries: Vec<&Entry> = set.iter().collect();
        entries.sort_by(|a, b| self.compare(a, b, schema));
        entries
    }

    /// Compare two entries under this order.
    pub fn compare(&self, a: &Entry, b: &Entry, schema: &Schema) -> Ordering {
        let by_field = match self {
            SortOrder::Field(field) => schema
                .index_of(field)
                .map(|i| {
                    let left = a.get(i).unwrap_or_default().to_lowercase();
                    let right = b.get(i).unwrap_or_default().to_lowercase();
                    left.cmp(&right)
                })
                .unwrap_or(Ordering::Equal),
            SortOrder::Key => Ordering::Equal,
        };
        by_field.then_with(|| a.key().cmp(b.key()))
    }
}

/// The whitespace framing the entry lines inside the markers.
///
/// `lead` is the rest of the begin-marker line including its newline, and
/// `trail` is the indentation in front of the end marker. Both are taken
/// from the current body so rewriting keeps the surrounding layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyFrame {
    pub lead: String,
    pub trail: String,
}

impl Default for BodyFrame {
    fn default() -> Self {
        Self {
            lead: "\n".to_string(),
            trail: String::new(),
        }
    }
}

impl BodyFrame {
    /// Line terminator of the surrounding document, `\r\n` or `\n`.
    pub fn line_end(&self) -> &str {
        if self.lead.ends_with("\r\n") { "\r\n" } else { "\n" }
    }

    /// Derive the frame from an existing body.
    pub fn of(body: &str) -> Self {
        let (Some(first), Some(last)) = (body.find('\n'), body.rfind('\n')) else {
            return Self::default();
        };

        let lead = &body[..=first];
        let trail = &body[last + 1..];
        let line_end = if lead.ends_with("\r\n") { "\r\n" } else { "\n" };
        Self {
            lead: if lead.trim().is_empty() {
                lead.to_string()
            } else {
                line_end.to_string()
            },
            trail: if trail.trim().is_empty() {
                trail.to_string()
            } else {
                String::new()
            },
        }
    }
}

/// Render `set` in `order` through `template`, framed by `frame`.
pub fn serialize(
    set: &EntrySet,
    schema: &Schema,
    order: &SortOrder,
    template: &Template,
    frame: &BodyFrame,
) -> String {
    let line_end = frame.line_end();
    let mut body = frame.lead.clone();
    for entry in order.sorted(set, schema) {
        body.push_str(&template.render(entry));
        body.push_str(line_end);
    }
    body.push_str(&frame.trail);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn schema() -> Schema {
        Schema::new(["flag", "name", "code"], "code").unwrap()
    }

    #[test]
    fn test_template_escapes_braces() {
        let schema = schema();
        let template = Template::parse("{{ {code} }}", &schema).unwrap();
        let entry = schema.entry(["", "Dutch", "nl"]).unwrap();
        assert_eq!(template.render(&entry), "{ nl }");
    }

    #[rstest]
    #[case("{missing}")]
    #[case("{code")]
    #[case("code}")]
    fn test_template_rejects(#[case] source: &str) {
        assert!(matches!(
            Template::parse(source, &schema()),
            Err(Error::Template { .. })
        ));
    }

    #[rstest]
    #[case("\n    a\n    ", "\n", "    ")]
    #[case("  \n    a\n", "  \n", "")]
    #[case("", "\n", "")]
    #[case(" inline ", "\n", "")]
    #[case("x\n", "\n", "")]
    #[case("\r\n  a\r\n  ", "\r\n", "  ")]
    fn test_body_frame(#[case] body: &str, #[case] lead: &str, #[case] trail: &str) {
        let frame = BodyFrame::of(body);
        assert_eq!(frame.lead, lead);
        assert_eq!(frame.trail, trail);
    }

    #[test]
    fn test_crlf_body_keeps_crlf() {
        let schema = schema();
        let template = Template::parse("  {code}", &schema).unwrap();
        let set: EntrySet = [["", "Dutch", "nl"], ["", "English", "en"]]
            .into_iter()
            .map(|e| schema.entry(e).unwrap())
            .collect();

        let frame = BodyFrame::of("\r\n  nl\r\n  ");
        assert_eq!(frame.line_end(), "\r\n");
        let body = serialize(&set, &schema, &SortOrder::Key, &template, &frame);
        assert_eq!(body, "\r\n  en\r\n  nl\r\n  ");

        let inline = BodyFrame::of(" x\r\n");
        assert_eq!(inline.lead, "\r\n");
    }

    #[test]
    fn test_field_order_is_case_insensitive_with_key_ties() {
        let schema = schema();
        let set: EntrySet = [
            ["", "beta", "b2"],
            ["", "Alpha", "a"],
            ["", "Beta", "b1"],
        ]
        .into_iter()
        .map(|e| schema.entry(e).unwrap())
        .collect();

        let order = SortOrder::Field("name".into());
        let keys: Vec<&str> = order.sorted(&set, &schema).into_iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["a", "b1", "b2"]);
    }
}
