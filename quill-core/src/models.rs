//! Diagnostics emitted while indexing and serving content.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Info,
    Warning,
    Error,
}

/// A single degraded-document report.
///
/// Every warning that the pipeline logs through `tracing` is also captured as a
/// `Diagnostic`, so callers (and the `verify` command) can inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable machine-readable code, e.g. `date.invalid`
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,

    /// Corpus-relative path or file name of the offending document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// Extra detail such as the raw value that failed to parse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: DiagnosticSeverity, code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity,
            source_path: None,
            context: None,
        }
    }

    pub fn info(code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, code, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, code, message)
    }

    /// The document could not be indexed at all
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, code, message)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_path = Some(source.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

pub mod codes {
    pub const DATE_MISSING: &str = "date.missing";
    pub const DATE_INVALID: &str = "date.invalid";
    pub const SLUG_DUPLICATE: &str = "slug.duplicate";
    pub const SLUG_MISMATCH: &str = "slug.mismatch";
    pub const FRONTMATTER_INVALID: &str = "frontmatter.invalid";
}
