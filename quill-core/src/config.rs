//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the quill.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub i18n: I18nConfig,
    pub cache: CacheConfig,
    pub links: LinksConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the markdown corpus (contains `home/` and `daily/`)
    pub corpus: PathBuf,

    /// Location of the persisted content index
    pub index: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from("blog"),
            index: PathBuf::from(".cache/content-index.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub locales: Vec<String>,
    pub default_locale: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string(), "zh".to_string()],
            default_locale: "zh".to_string(),
        }
    }
}

impl I18nConfig {
    /// Path prefix for a locale: empty for the default locale, `/<lang>` otherwise
    pub fn path_prefix(&self, lang: Option<&str>) -> String {
        locale_prefix(lang, &self.default_locale)
    }

    pub fn is_supported(&self, lang: &str) -> bool {
        self.locales.iter().any(|l| l == lang)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Validity window of the repository's derived structures
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: crate::repository::DEFAULT_CACHE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// URL prefix for wiki images
    pub image_base: String,

    /// URL prefix for resolved wiki links
    pub posts_base: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            image_base: "/image".to_string(),
            posts_base: "/posts".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load the config file if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}; using defaults", path);
            Ok(Self::default())
        }
    }

    /// Defaults with paths resolved against `root`
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            config_path: Some(root.as_ref().join("quill.yml")),
            ..Self::default()
        }
    }

    /// Get the corpus directory, resolved relative to config file
    pub fn corpus_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.corpus)
    }

    /// Get the index artifact path, resolved relative to config file
    pub fn index_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.index)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_deref().and_then(Path::parent) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// `/<lang>` for non-default locales, empty otherwise
pub fn locale_prefix(lang: Option<&str>, default_locale: &str) -> String {
    match lang.map(str::trim) {
        Some(lang) if !lang.is_empty() && lang != default_locale => format!("/{lang}"),
        _ => String::new(),
    }
}

/// Ensure URL prefixes have a leading slash and no trailing slash ("/image", or "" for root)
pub fn normalize_url_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }

    let mut s = String::with_capacity(trimmed.len() + 1);
    s.push('/');
    for (i, part) in trimmed.split('/').filter(|p| !p.is_empty()).enumerate() {
        if i > 0 {
            s.push('/');
        }
        s.push_str(part);
    }
    s
}
