//! Check or fix front matter dates across the corpus.

use crate::context::Context;
use anyhow::{bail, Context as _, Result};
use quill_core::{MetadataNormalizer, NormalizeMode};
use std::path::Path;

/// Run the normalizer; violations make the command fail.
pub fn normalize_metadata(config_path: &Path, fix: bool, json: bool) -> Result<()> {
    let ctx = Context::load(config_path)?;
    let corpus = ctx.config.corpus_dir();
    let mode = if fix {
        NormalizeMode::Fix
    } else {
        NormalizeMode::Check
    };

    let report = MetadataNormalizer::new(&corpus, mode)
        .run()
        .with_context(|| format!("Failed to normalize metadata under {:?}", corpus))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Normalize ({}): {} processed, {} updated, {} unchanged",
            mode,
            report.processed,
            report.updated.len(),
            report.unchanged()
        );
        for file in &report.updated {
            println!("  updated {}", file);
        }
        for violation in &report.violations {
            println!("- {}: {}", violation.file, violation.reason);
        }
    }

    if !report.is_clean() {
        match mode {
            NormalizeMode::Check => bail!(
                "{} metadata violations found; run `quill normalize --fix`",
                report.violations.len()
            ),
            NormalizeMode::Fix => bail!(
                "{} files could not be fixed",
                report.violations.len()
            ),
        }
    }

    Ok(())
}
