//! Front matter date normalization (`check` / `fix`).
//!
//! Walks every markdown file below the corpus root, not just the indexable
//! directories, and makes sure `date` is written as `YYYY-MM-DD`.

use crate::{
    dates::{normalize_date, raw_date_text, DATE_FORMAT},
    frontmatter::{parse_frontmatter, render_document, FrontmatterError},
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus root not found: {0}")]
    CorpusMissing(PathBuf),

    #[error("Failed to serialize frontmatter for {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Report problems without touching files
    Check,
    /// Rewrite files in place
    Fix,
}

impl fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMode::Check => write!(f, "check"),
            NormalizeMode::Fix => write!(f, "fix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Corpus-relative path
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    pub processed: usize,
    pub updated: Vec<String>,
    pub violations: Vec<Violation>,
}

impl NormalizeReport {
    pub fn unchanged(&self) -> usize {
        self.processed - self.updated.len() - self.violations.len()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

enum Outcome {
    Unchanged,
    Updated,
    Violation(String),
}

pub struct MetadataNormalizer {
    corpus_root: PathBuf,
    mode: NormalizeMode,
    today: NaiveDate,
}

impl MetadataNormalizer {
    pub fn new(corpus_root: impl Into<PathBuf>, mode: NormalizeMode) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            mode,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Override the date written for documents that have none
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn run(&self) -> Result<NormalizeReport, NormalizeError> {
        if !self.corpus_root.is_dir() {
            return Err(NormalizeError::CorpusMissing(self.corpus_root.clone()));
        }

        let mut report = NormalizeReport::default();

        for entry in WalkDir::new(&self.corpus_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }

            report.processed += 1;
            let rel = self.relative(path);

            match self.process_file(path)? {
                Outcome::Unchanged => {}
                Outcome::Updated => {
                    tracing::info!("Updated metadata for: {}", rel);
                    report.updated.push(rel);
                }
                Outcome::Violation(reason) => {
                    tracing::warn!("{}: {}", rel, reason);
                    report.violations.push(Violation { file: rel, reason });
                }
            }
        }

        Ok(report)
    }

    fn process_file(&self, path: &Path) -> Result<Outcome, NormalizeError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => return Ok(Outcome::Violation(format!("unreadable({err})"))),
        };
        let (mut frontmatter, body) = match parse_frontmatter(&content) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(Outcome::Violation(format!("invalid_frontmatter({err})"))),
        };

        let raw = frontmatter.date().cloned();
        let normalized = raw.as_ref().and_then(normalize_date);

        let target = match normalized {
            None => match self.mode {
                NormalizeMode::Check => {
                    return Ok(Outcome::Violation("missing_or_invalid_date".to_string()))
                }
                NormalizeMode::Fix => self.today.format(DATE_FORMAT).to_string(),
            },
            Some(normalized) => {
                let raw_text = raw.as_ref().map(raw_date_text).unwrap_or_default();
                if raw_text == normalized {
                    return Ok(Outcome::Unchanged);
                }
                if self.mode == NormalizeMode::Check {
                    return Ok(Outcome::Violation(format!(
                        "date_not_normalized({raw_text}=>{normalized})"
                    )));
                }
                normalized
            }
        };

        frontmatter.set("date", Value::String(target));
        let rewritten = render_document(&frontmatter, &body).map_err(|source| {
            NormalizeError::Frontmatter {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, rewritten)?;
        Ok(Outcome::Updated)
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.corpus_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse_frontmatter;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        write(dir.path(), "home/ok.md", "---\nslug: ok\ndate: 2024-01-05\n---\nok\n");
        write(dir.path(), "home/loose.md", "---\nslug: loose\ndate: 2024-1-5\n---\nloose\n");
        write(dir.path(), "daily/none.md", "---\nslug: none\n---\nnone\n");
        write(dir.path(), "about.md", "---\ntitle: About\ndate: someday\n---\nabout\n");
        dir
    }

    #[test]
    fn test_check_reports_without_writing() {
        let dir = fixture();
        let before = fs::read_to_string(dir.path().join("home/loose.md")).unwrap();

        let report = MetadataNormalizer::new(dir.path(), NormalizeMode::Check)
            .with_today(today())
            .run()
            .unwrap();

        assert_eq!(report.processed, 4);
        assert!(report.updated.is_empty());
        assert_eq!(report.unchanged(), 1);
        assert!(!report.is_clean());

        let reasons: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.file.as_str(), v.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("about.md", "missing_or_invalid_date"),
                ("daily/none.md", "missing_or_invalid_date"),
                ("home/loose.md", "date_not_normalized(2024-1-5=>2024-01-05)"),
            ]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("home/loose.md")).unwrap(),
            before
        );
    }

    #[test]
    fn test_fix_rewrites_dates() {
        let dir = fixture();
        let report = MetadataNormalizer::new(dir.path(), NormalizeMode::Fix)
            .with_today(today())
            .run()
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(
            report.updated,
            vec!["about.md", "daily/none.md", "home/loose.md"]
        );
        assert_eq!(report.unchanged(), 1);

        let (fm, body) =
            parse_frontmatter(&fs::read_to_string(dir.path().join("home/loose.md")).unwrap())
                .unwrap();
        assert_eq!(fm.date(), Some(&Value::String("2024-01-05".into())));
        assert_eq!(fm.slug().as_deref(), Some("loose"));
        assert_eq!(body, "loose\n");

        let (fm, _) =
            parse_frontmatter(&fs::read_to_string(dir.path().join("daily/none.md")).unwrap())
                .unwrap();
        assert_eq!(fm.date(), Some(&Value::String("2025-03-09".into())));

        // second run has nothing left to do
        let again = MetadataNormalizer::new(dir.path(), NormalizeMode::Check)
            .run()
            .unwrap();
        assert!(again.is_clean());
        assert!(again.updated.is_empty());
    }

    #[test]
    fn test_malformed_frontmatter_is_left_alone() {
        let dir = tempdir().unwrap();
        let content = "---\nslug: [oops\n---\nbody\n";
        write(dir.path(), "home/bad.md", content);

        let report = MetadataNormalizer::new(dir.path(), NormalizeMode::Fix)
            .run()
            .unwrap();

        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].reason.starts_with("invalid_frontmatter"));
        assert_eq!(
            fs::read_to_string(dir.path().join("home/bad.md")).unwrap(),
            content
        );
    }

    #[test]
    fn test_unreadable_file_does_not_abort_the_run() {
        let dir = tempdir().unwrap();
        write(dir.path(), "home/a.md", "---\nslug: a\ndate: 2024-1-5\n---\n");
        fs::write(dir.path().join("home/b.md"), b"\xff\xfe").unwrap();

        let report = MetadataNormalizer::new(dir.path(), NormalizeMode::Check)
            .run()
            .unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.unchanged(), 0);
        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.violations[0].file, "home/a.md");
        assert_eq!(
            report.violations[0].reason,
            "date_not_normalized(2024-1-5=>2024-01-05)"
        );
        assert_eq!(report.violations[1].file, "home/b.md");
        assert!(report.violations[1].reason.starts_with("unreadable("));
    }

    #[test]
    fn test_missing_corpus() {
        let dir = tempdir().unwrap();
        let result = MetadataNormalizer::new(dir.path().join("nope"), NormalizeMode::Check).run();
        assert!(matches!(result, Err(NormalizeError::CorpusMissing(_))));
    }
}
