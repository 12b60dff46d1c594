//! Generate the content index artifact.

use crate::context::Context;
use anyhow::{Context as _, Result};
use quill_core::{write_index, IndexBuilder};
use quill_types::ContentIndex;
use std::path::Path;

/// Scan the corpus and persist `{ generatedAt, items }`.
pub fn write_content_index(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let ctx = Context::load(config_path)?;
    let corpus = ctx.config.corpus_dir();

    let report = IndexBuilder::new(&corpus)
        .build()
        .with_context(|| format!("Failed to index corpus at {:?}", corpus))?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.config.index_path());
    let indexed = report.entries.len();
    let warnings = report.diagnostics.len();

    write_index(&path, &ContentIndex::new(report.entries))
        .with_context(|| format!("Failed to write index {:?}", path))?;

    println!(
        "Indexed {} of {} markdown files -> {}",
        indexed,
        report.scanned,
        path.display()
    );
    if warnings > 0 {
        println!("{} warnings; run `quill verify` for details", warnings);
    }

    Ok(())
}
