//! Configuration and service setup shared by commands.

use anyhow::{Context as _, Result};
use quill_core::{Config, ContentRepository, MarkdownProcessor};
use std::path::Path;

pub struct Context {
    pub config: Config,
}

impl Context {
    /// Load `quill.yml`, falling back to defaults when the file is absent
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load_or_default(config_path)
            .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
        Ok(Self { config })
    }

    pub fn repository(&self) -> ContentRepository {
        ContentRepository::from_config(&self.config)
    }

    pub fn processor(&self) -> MarkdownProcessor {
        MarkdownProcessor::from_config(&self.config)
    }
}
