//! Content index building and persistence.
//!
//! The builder walks the corpus, reads each document's front matter and
//! produces one [`IndexEntry`] per publishable document. Only files below the
//! `home/` and `daily/` top-level directories are indexed, and only when they
//! carry a `slug`; everything else is skipped on purpose so ancillary pages
//! (an about page, drafts kept at the root) stay out of listings.

use crate::{
    dates::normalize_date,
    frontmatter::parse_frontmatter_lenient,
    models::{codes, Diagnostic},
};
use quill_types::{ContentIndex, DocType, IndexEntry};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus root not found: {0}")]
    CorpusMissing(PathBuf),

    #[error("Invalid index artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of one index generation
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub entries: Vec<IndexEntry>,
    pub diagnostics: Vec<Diagnostic>,
    /// Markdown files seen, indexed or not
    pub scanned: usize,
}

/// Walks a corpus and produces index entries
pub struct IndexBuilder {
    corpus_root: PathBuf,
}

impl IndexBuilder {
    pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
        }
    }

    pub fn corpus_root(&self) -> &Path {
        &self.corpus_root
    }

    /// Build the index.
    ///
    /// Only a missing corpus root is fatal; unreadable or malformed documents
    /// are skipped with a diagnostic. Files are visited in path order, and when
    /// two documents share a slug the later one replaces the earlier entry.
    pub fn build(&self) -> Result<IndexReport, IndexError> {
        let files = self.discover_markdown_files()?;
        let mut report = IndexReport {
            scanned: files.len(),
            ..IndexReport::default()
        };
        let mut positions: HashMap<String, usize> = HashMap::new();

        for path in &files {
            let Some(entry) = self.index_file(path, &mut report.diagnostics) else {
                continue;
            };

            match positions.get(&entry.slug) {
                Some(&pos) => {
                    let previous = &report.entries[pos];
                    tracing::warn!(
                        "Duplicate slug '{}': {} replaces {}",
                        entry.slug,
                        entry.file_path,
                        previous.file_path
                    );
                    report.diagnostics.push(
                        Diagnostic::warning(
                            codes::SLUG_DUPLICATE,
                            format!(
                                "Slug '{}' is also used by {}; the later file wins",
                                entry.slug, previous.file_path
                            ),
                        )
                        .with_source(entry.file_path.clone())
                        .with_context(entry.slug.clone()),
                    );
                    report.entries[pos] = entry;
                }
                None => {
                    positions.insert(entry.slug.clone(), report.entries.len());
                    report.entries.push(entry);
                }
            }
        }

        tracing::info!(
            "Indexed {} of {} markdown files",
            report.entries.len(),
            report.scanned
        );

        Ok(report)
    }

    /// Discover all markdown files under the corpus root
    fn discover_markdown_files(&self) -> Result<Vec<PathBuf>, IndexError> {
        if !self.corpus_root.is_dir() {
            return Err(IndexError::CorpusMissing(self.corpus_root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.corpus_root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Skipping unreadable path: {}", err);
                    continue;
                }
            };
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Index a single file, or `None` when it is not publishable
    fn index_file(&self, path: &Path, diagnostics: &mut Vec<Diagnostic>) -> Option<IndexEntry> {
        let rel = path.strip_prefix(&self.corpus_root).unwrap_or(path);
        let components: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        // Root-level files have no top-level directory and are never indexed
        let [top, .., file_name] = components.as_slice() else {
            tracing::debug!("Skipping root-level file {:?}", rel);
            return None;
        };
        let Some(doc_type) = DocType::from_top_level_dir(top) else {
            tracing::debug!("Skipping {:?}: outside home/ and daily/", rel);
            return None;
        };

        let file_path = components.join("/");
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", file_path, err);
                return None;
            }
        };

        let (frontmatter, _body, error) = parse_frontmatter_lenient(&content);
        if let Some(err) = error {
            tracing::warn!("Invalid frontmatter in {}: {}", file_path, err);
            diagnostics.push(
                Diagnostic::error(codes::FRONTMATTER_INVALID, err.to_string())
                    .with_source(file_path.clone()),
            );
        }

        let Some(slug) = frontmatter.slug() else {
            tracing::debug!("Skipping {}: no slug", file_path);
            return None;
        };

        let date = match frontmatter.date() {
            Some(value) => {
                let normalized = normalize_date(value);
                if normalized.is_none() {
                    let raw = crate::dates::raw_date_text(value);
                    tracing::warn!("Unparseable date in {}: {}", file_path, raw);
                    diagnostics.push(
                        Diagnostic::warning(codes::DATE_INVALID, "Date could not be parsed")
                            .with_source(file_path.clone())
                            .with_context(raw),
                    );
                }
                normalized
            }
            None => {
                // listings warn again when they fall back to the epoch
                tracing::debug!("No date in {}", file_path);
                diagnostics.push(
                    Diagnostic::info(codes::DATE_MISSING, "Document has no date")
                        .with_source(file_path.clone()),
                );
                None
            }
        };

        Some(IndexEntry {
            slug,
            doc_type,
            file_name: file_name.clone(),
            file_name_base: strip_markdown_extension(file_name).to_string(),
            file_path,
            title: frontmatter.title(),
            date,
            tags: frontmatter.tags(),
        })
    }
}

/// Build the index for a corpus root, logging diagnostics
pub fn build_index(corpus_root: &Path) -> Result<Vec<IndexEntry>, IndexError> {
    let report = IndexBuilder::new(corpus_root).build()?;
    Ok(report.entries)
}

/// Persist the index artifact, creating parent directories
pub fn write_index(path: &Path, index: &ContentIndex) -> Result<(), IndexError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(index)?;
    fs::write(path, json)?;
    tracing::info!("Wrote index: {:?} ({} items)", path, index.items.len());
    Ok(())
}

/// Load the index artifact; `Ok(None)` when it does not exist
pub fn read_index(path: &Path) -> Result<Option<ContentIndex>, IndexError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_slice(&data)?))
}

/// Compare a persisted index against a fresh scan.
///
/// Every artifact entry whose file no longer carries the same slug yields a
/// `slug.mismatch` diagnostic; such slugs resolve to nothing at request time.
pub fn stale_entries(artifact: &ContentIndex, fresh: &[IndexEntry]) -> Vec<Diagnostic> {
    let current: HashMap<&str, &str> = fresh
        .iter()
        .map(|e| (e.file_path.as_str(), e.slug.as_str()))
        .collect();

    artifact
        .items
        .iter()
        .filter_map(|entry| {
            let found = current.get(entry.file_path.as_str()).copied();
            if found == Some(entry.slug.as_str()) {
                return None;
            }
            let message = match found {
                Some(slug) => format!("Index has slug '{}', file now has '{}'", entry.slug, slug),
                None => format!("Index has slug '{}', file is no longer indexed", entry.slug),
            };
            Some(
                Diagnostic::warning(codes::SLUG_MISMATCH, message)
                    .with_source(entry.file_path.clone())
                    .with_context(entry.slug.clone()),
            )
        })
        .collect()
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn strip_markdown_extension(file_name: &str) -> &str {
    let len = file_name.len();
    if len >= 3 && file_name.is_char_boundary(len - 3) && file_name[len - 3..].eq_ignore_ascii_case(".md")
    {
        &file_name[..len - 3]
    } else {
        file_name
    }
}
