//! Content repository: typed queries over the content index, backed by a
//! time-boxed snapshot cache.
//!
//! Every derived structure (slug map, post id map, sorted listings) is built
//! together from a single load of the index and published as one immutable
//! [`Snapshot`]. Expiry is checked lazily on access; a rebuild replaces the
//! whole snapshot under the cache lock, so readers either see the previous
//! snapshot or the new one, never a mix.

use crate::{
    config::Config,
    dates::{self, DateIssue},
    frontmatter::parse_frontmatter_lenient,
    index::{read_index, IndexBuilder, IndexError},
    models::{codes, Diagnostic},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;
use quill_types::{DocType, IndexEntry, PostData, PostSummary};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Default validity window of the cache: five minutes
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to load content index: {0}")]
    Index(#[from] IndexError),
}

/// Source of "now" for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic expiry
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Where a snapshot's entries came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// The precomputed index artifact
    Artifact,
    /// A live scan of the corpus (artifact absent or unreadable)
    Scan,
}

/// Immutable derived state built from one load of the index
#[derive(Debug)]
pub struct Snapshot {
    built_at: DateTime<Utc>,
    source: IndexSource,
    slug_map: Arc<HashMap<String, IndexEntry>>,
    post_id_map: Arc<HashMap<String, String>>,
    posts: Vec<PostSummary>,
    daily: Vec<PostSummary>,
    post_slugs: Vec<String>,
    daily_slugs: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Snapshot {
    /// Derive every lookup structure from a list of entries
    pub fn build(
        entries: Vec<IndexEntry>,
        source: IndexSource,
        built_at: DateTime<Utc>,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut post_slugs = Vec::new();
        let mut daily_slugs = Vec::new();
        let mut posts = Vec::new();
        let mut daily = Vec::new();
        let mut post_id_map = HashMap::with_capacity(entries.len());
        let mut slug_map: HashMap<String, IndexEntry> = HashMap::with_capacity(entries.len());

        for entry in &entries {
            let summary = summarize(entry, &mut diagnostics);
            match entry.doc_type {
                DocType::Post => {
                    post_slugs.push(entry.slug.clone());
                    posts.push(summary);
                }
                DocType::Daily => {
                    daily_slugs.push(entry.slug.clone());
                    daily.push(summary);
                }
            }
            post_id_map.insert(entry.file_name_base.clone(), entry.slug.clone());
        }

        for entry in entries {
            if let Some(previous) = slug_map.get(&entry.slug) {
                tracing::warn!(
                    "Duplicate slug '{}' in index: {} replaces {}",
                    entry.slug,
                    entry.file_path,
                    previous.file_path
                );
                diagnostics.push(
                    Diagnostic::warning(
                        codes::SLUG_DUPLICATE,
                        format!("Slug '{}' is also used by {}", entry.slug, previous.file_path),
                    )
                    .with_source(entry.file_path.clone())
                    .with_context(entry.slug.clone()),
                );
            }
            slug_map.insert(entry.slug.clone(), entry);
        }

        // stable: equal dates keep index order
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        daily.sort_by(|a, b| b.date.cmp(&a.date));

        Self {
            built_at,
            source,
            slug_map: Arc::new(slug_map),
            post_id_map: Arc::new(post_id_map),
            posts,
            daily,
            post_slugs,
            daily_slugs,
            diagnostics,
        }
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn source(&self) -> IndexSource {
        self.source
    }

    pub fn slug_map(&self) -> &Arc<HashMap<String, IndexEntry>> {
        &self.slug_map
    }

    pub fn post_id_map(&self) -> &Arc<HashMap<String, String>> {
        &self.post_id_map
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn daily(&self) -> &[PostSummary] {
        &self.daily
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.built_at < ttl
    }
}

fn summarize(entry: &IndexEntry, diagnostics: &mut Vec<Diagnostic>) -> PostSummary {
    PostSummary {
        slug: entry.slug.clone(),
        file_name: entry.file_name.clone(),
        title: entry.title.clone(),
        description: String::new(),
        keywords: Vec::new(),
        date: listing_date(dates::summary_date(entry.date.as_deref()), &entry.file_name, diagnostics),
        tags: entry.tags.iter().map(|t| t.to_lowercase()).collect(),
    }
}

/// Unwrap a resolved date, warning and falling back to the epoch on failure
fn listing_date(
    resolved: Result<NaiveDate, DateIssue>,
    file_name: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> NaiveDate {
    resolved.unwrap_or_else(|issue| {
        tracing::warn!("{} in {}; using 1970-01-01", issue, file_name);
        let mut diag = Diagnostic::warning(issue.code(), issue.to_string()).with_source(file_name);
        if let DateIssue::Invalid(raw) = &issue {
            diag = diag.with_context(raw.clone());
        }
        diagnostics.push(diag);
        dates::epoch()
    })
}

/// Typed, cached access to the content corpus
pub struct ContentRepository {
    corpus_root: PathBuf,
    index_path: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<Arc<Snapshot>>>,
}

impl ContentRepository {
    pub fn new(corpus_root: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            index_path: index_path.into(),
            ttl: Duration::seconds(DEFAULT_CACHE_TTL_SECS as i64),
            clock: Arc::new(SystemClock),
            cache: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.corpus_dir(), config.index_path())
            .with_ttl(Duration::seconds(config.cache.ttl_secs as i64))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Current snapshot, rebuilding it first if absent or expired.
    ///
    /// The cache lock is held across check-then-rebuild, so at most one
    /// rebuild runs at a time.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, RepositoryError> {
        let mut cache = self.cache.lock();
        let now = self.clock.now();

        if let Some(snapshot) = cache.as_ref().filter(|s| s.is_fresh(now, self.ttl)) {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(self.rebuild(now)?);
        *cache = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drop the cached snapshot; the next access rebuilds
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    fn rebuild(&self, now: DateTime<Utc>) -> Result<Snapshot, RepositoryError> {
        let (entries, source, diagnostics) = self.load_entries()?;
        tracing::debug!("Rebuilt content snapshot from {:?} ({} entries)", source, entries.len());
        Ok(Snapshot::build(entries, source, now, diagnostics))
    }

    /// Prefer the index artifact; fall back to scanning the corpus
    fn load_entries(&self) -> Result<(Vec<IndexEntry>, IndexSource, Vec<Diagnostic>), RepositoryError> {
        match read_index(&self.index_path) {
            Ok(Some(index)) => return Ok((index.items, IndexSource::Artifact, Vec::new())),
            Ok(None) => {
                tracing::debug!("No index at {:?}; scanning corpus", self.index_path);
            }
            Err(err) => {
                tracing::warn!(
                    "Unreadable index at {:?} ({}); scanning corpus",
                    self.index_path,
                    err
                );
            }
        }

        let report = IndexBuilder::new(&self.corpus_root).build()?;
        Ok((report.entries, IndexSource::Scan, report.diagnostics))
    }

    /// All `post` entries, newest first
    pub fn sorted_posts(&self) -> Result<Vec<PostSummary>, RepositoryError> {
        Ok(self.snapshot()?.posts().to_vec())
    }

    /// All `daily` entries, newest first
    pub fn daily_posts(&self) -> Result<Vec<PostSummary>, RepositoryError> {
        Ok(self.snapshot()?.daily().to_vec())
    }

    pub fn all_post_slugs(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.snapshot()?.post_slugs.clone())
    }

    pub fn all_daily_slugs(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.snapshot()?.daily_slugs.clone())
    }

    pub fn slug_map(&self) -> Result<Arc<HashMap<String, IndexEntry>>, RepositoryError> {
        Ok(Arc::clone(self.snapshot()?.slug_map()))
    }

    /// `fileNameBase -> slug`, used to resolve wiki links
    pub fn post_id_map(&self) -> Result<Arc<HashMap<String, String>>, RepositoryError> {
        Ok(Arc::clone(self.snapshot()?.post_id_map()))
    }

    /// Diagnostics gathered while building the current snapshot
    pub fn diagnostics(&self) -> Result<Vec<Diagnostic>, RepositoryError> {
        Ok(self.snapshot()?.diagnostics().to_vec())
    }

    /// Resolve a slug to its full document.
    ///
    /// Returns `None` when the slug is unknown, the file cannot be read, or
    /// the file's own slug no longer matches the index.
    pub fn post_by_slug(&self, slug: &str) -> Result<Option<PostData>, RepositoryError> {
        let snapshot = self.snapshot()?;
        let Some(entry) = snapshot.slug_map().get(slug) else {
            return Ok(None);
        };

        let full_path = self.corpus_root.join(&entry.file_path);
        let content = match std::fs::read_to_string(&full_path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Error reading {} (slug: {}): {}", entry.file_name, slug, err);
                return Ok(None);
            }
        };

        let (frontmatter, body, error) = parse_frontmatter_lenient(&content);
        if let Some(err) = error {
            tracing::warn!("Invalid frontmatter in {}: {}", entry.file_path, err);
        }

        let current = frontmatter.slug();
        if current.as_deref() != Some(slug) {
            tracing::warn!(
                "Slug mismatch in {}: expected {}, found {:?}",
                entry.file_name,
                slug,
                current
            );
            return Ok(None);
        }

        let mut diagnostics = Vec::new();
        let date = listing_date(
            dates::summary_date_from_value(frontmatter.date()),
            &entry.file_name,
            &mut diagnostics,
        );

        Ok(Some(PostData {
            summary: PostSummary {
                slug: slug.to_string(),
                file_name: entry.file_name.clone(),
                title: frontmatter.title(),
                description: frontmatter.description(),
                keywords: frontmatter.keywords(),
                date,
                tags: frontmatter.tags().iter().map(|t| t.to_lowercase()).collect(),
            },
            content: body,
        }))
    }
}
