//! Shared types for quill
//!
//! This crate provides the content model exchanged between the index
//! builder, the content repository and the presentation layer. Field names
//! serialize in camelCase so the persisted index stays readable by any
//! consumer of `content-index.json`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of document, derived from the top-level corpus directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Post,
    Daily,
}

impl DocType {
    /// Classify a top-level directory name. Only `home` and `daily` are indexable.
    pub fn from_top_level_dir(dir: &str) -> Option<Self> {
        match dir {
            "home" => Some(DocType::Post),
            "daily" => Some(DocType::Daily),
            _ => None,
        }
    }

    /// Directory under the corpus root holding documents of this type
    pub fn directory(&self) -> &'static str {
        match self {
            DocType::Post => "home",
            DocType::Daily => "daily",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Post => "post",
            DocType::Daily => "daily",
        }
    }
}

/// One lightweight record per indexed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Globally unique, author-assigned identifier
    pub slug: String,

    #[serde(rename = "type")]
    pub doc_type: DocType,

    /// Path relative to the corpus root, always `/`-separated
    pub file_path: String,

    pub file_name: String,

    /// File name without the `.md` extension; join key for wiki links
    pub file_name_base: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Normalized `YYYY-MM-DD`, or null when the source date was unusable
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// The persisted index artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIndex {
    pub generated_at: DateTime<Utc>,
    pub items: Vec<IndexEntry>,
}

impl ContentIndex {
    pub fn new(items: Vec<IndexEntry>) -> Self {
        Self {
            generated_at: Utc::now(),
            items,
        }
    }
}

/// Listing-view projection of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub file_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub description: String,
    pub keywords: Vec<String>,

    /// Calendar date; documents without a usable date sit at the Unix epoch
    pub date: NaiveDate,

    /// Lower-cased tags
    pub tags: Vec<String>,
}

/// A full document: summary fields plus the raw body with metadata stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostData {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
}

impl PostData {
    pub fn slug(&self) -> &str {
        &self.summary.slug
    }
}
