//! # quill-core
//!
//! Core library for the quill blog pipeline.
//!
//! This crate turns a directory of markdown files with YAML front matter into
//! a cached, slug-keyed content repository, and renders document bodies
//! through the wiki-aware markdown pipeline.

pub mod config;
pub mod dates;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod models;
pub mod normalize;
pub mod page;
pub mod repository;

pub use config::Config;
pub use frontmatter::{parse_frontmatter, Frontmatter};
pub use index::{
    build_index, read_index, stale_entries, write_index, IndexBuilder, IndexError, IndexReport,
};
pub use markdown::{MarkdownProcessor, Rendered};
pub use models::{Diagnostic, DiagnosticSeverity};
pub use normalize::{MetadataNormalizer, NormalizeError, NormalizeMode, NormalizeReport, Violation};
pub use page::{render_post, RenderedPost};
pub use repository::{
    Clock, ContentRepository, IndexSource, ManualClock, RepositoryError, Snapshot, SystemClock,
};
