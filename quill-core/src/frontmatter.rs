//! Frontmatter parsing from markdown files.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter is not a key/value mapping")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A\x{FEFF}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
            .unwrap()
    })
}

/// Metadata block of a document.
///
/// Fields are kept as raw YAML values in source order; the typed accessors
/// coerce scalars to strings and treat anything unrecognized as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    fields: Mapping,
}

impl Frontmatter {
    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Insert or replace a field, keeping its position if it already exists
    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(Value::String(key.to_string()), value);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document slug; empty values count as missing
    pub fn slug(&self) -> Option<String> {
        self.get("slug").and_then(scalar_to_string)
    }

    pub fn title(&self) -> Option<String> {
        self.get("title").and_then(scalar_to_string)
    }

    pub fn description(&self) -> String {
        self.get("description")
            .and_then(scalar_to_string)
            .unwrap_or_default()
    }

    pub fn date(&self) -> Option<&Value> {
        self.get("date")
    }

    /// Keywords as a list, or split from a comma-separated string
    pub fn keywords(&self) -> Vec<String> {
        match self.get("keywords") {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Serialize back to YAML (no delimiters)
    pub fn to_yaml(&self) -> Result<String, FrontmatterError> {
        if self.fields.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_yaml::to_string(&self.fields)?)
    }
}

/// Render scalars the way they read in the source; non-scalars and empty strings are absent.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => return scalar_to_string(&tagged.value),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse frontmatter from markdown content
///
/// Returns a tuple of (frontmatter, markdown_body).
/// If no frontmatter is present, returns empty frontmatter with the full content as body.
///
/// # Example
///
/// ```
/// use quill_core::frontmatter::parse_frontmatter;
///
/// let content = "---\nslug: abc123\ndate: 2025-01-01\n---\n# Hello World\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.slug(), Some("abc123".to_string()));
/// assert!(body.starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    if yaml.trim().is_empty() {
        return Ok((Frontmatter::default(), body.to_string()));
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(fields) => Ok((Frontmatter::from_mapping(fields), body.to_string())),
        Value::Null => Ok((Frontmatter::default(), body.to_string())),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Like [`parse_frontmatter`], but a malformed block degrades to empty metadata.
///
/// The error is returned next to the result so callers can record it.
pub fn parse_frontmatter_lenient(content: &str) -> (Frontmatter, String, Option<FrontmatterError>) {
    match parse_frontmatter(content) {
        Ok((fm, body)) => (fm, body, None),
        Err(err) => {
            let body = frontmatter_regex()
                .captures(content)
                .and_then(|c| c.get(2))
                .map_or(content, |m| m.as_str())
                .to_string();
            (Frontmatter::default(), body, Some(err))
        }
    }
}

/// Assemble a document from metadata and body
pub fn render_document(frontmatter: &Frontmatter, body: &str) -> Result<String, FrontmatterError> {
    let yaml = frontmatter.to_yaml()?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.is_empty() && !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
slug: abc123
title: Test Post
description: A test post
date: 2025-01-01
---

# Hello World

This is the content."#;

        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.slug(), Some("abc123".to_string()));
        assert_eq!(fm.title(), Some("Test Post".to_string()));
        assert_eq!(fm.description(), "A test post");
        assert_eq!(
            fm.date(),
            Some(&Value::String("2025-01-01".to_string()))
        );
        assert!(body.contains("# Hello World"));
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_numeric_slug_is_coerced() {
        let content = "---\nslug: 20240105\ntitle: 42\n---\nbody";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.slug(), Some("20240105".to_string()));
        assert_eq!(fm.title(), Some("42".to_string()));
    }

    #[test]
    fn test_empty_slug_is_missing() {
        let content = "---\nslug: ''\n---\nbody";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.slug(), None);
    }

    #[test]
    fn test_parse_frontmatter_with_tags() {
        let content = r#"---
tags:
  - Rust
  - 2024
---

Content."#;

        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.tags(), vec!["Rust", "2024"]);
    }

    #[test]
    fn test_keywords_from_list_or_string() {
        let (fm, _) = parse_frontmatter("---\nkeywords: [a, b]\n---\n").unwrap();
        assert_eq!(fm.keywords(), vec!["a", "b"]);

        let (fm, _) = parse_frontmatter("---\nkeywords: 'x, y ,, z'\n---\n").unwrap();
        assert_eq!(fm.keywords(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block_and_eof_delimiter() {
        let (fm, body) = parse_frontmatter("---\n---\nbody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "body");

        let (fm, body) = parse_frontmatter("---\nslug: x\n---").unwrap();
        assert_eq!(fm.slug(), Some("x".to_string()));
        assert_eq!(body, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let (fm, body) = parse_frontmatter("---\r\nslug: x\r\n---\r\nbody").unwrap();
        assert_eq!(fm.slug(), Some("x".to_string()));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
slug: Test
invalid yaml: [unclosed
---

Content."#;

        assert!(parse_frontmatter(content).is_err());
    }

    #[test]
    fn test_scalar_block_is_not_a_mapping() {
        let result = parse_frontmatter("---\njust a string\n---\nbody");
        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }

    #[test]
    fn test_lenient_degrades_to_empty_metadata() {
        let content = "---\nslug: [unclosed\n---\nstill here";
        let (fm, body, err) = parse_frontmatter_lenient(content);
        assert!(fm.is_empty());
        assert!(err.is_some());
        assert_eq!(body, "still here");
    }

    #[test]
    fn test_render_document_round_trip() {
        let (mut fm, body) = parse_frontmatter("---\nslug: a\ndate: 2024-1-5\n---\nBody\n").unwrap();
        fm.set("date", Value::String("2024-01-05".into()));

        let rendered = render_document(&fm, &body).unwrap();
        let (again, again_body) = parse_frontmatter(&rendered).unwrap();

        assert_eq!(again.slug(), Some("a".to_string()));
        assert_eq!(
            again.date(),
            Some(&Value::String("2024-01-05".to_string()))
        );
        assert_eq!(again_body, "Body\n");
        // key order survives the rewrite
        let keys: Vec<_> = again.fields().keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["slug", "date"]);
    }
}
