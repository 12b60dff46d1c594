//! Verify corpus health and emit diagnostics.

use crate::context::Context;
use anyhow::{Context as _, Result};
use quill_core::{read_index, stale_entries, Diagnostic, DiagnosticSeverity, IndexBuilder};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    documents: usize,
    scanned: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
    diagnostics: &'a [Diagnostic],
}

/// Index the corpus in memory, compare against the artifact, surface diagnostics.
pub fn verify_corpus(config_path: &Path, json: bool) -> Result<()> {
    let ctx = Context::load(config_path)?;
    let corpus = ctx.config.corpus_dir();
    let report = IndexBuilder::new(&corpus)
        .build()
        .context("Failed to index corpus for verification")?;

    let mut diagnostics = report.diagnostics;
    let index_path = ctx.config.index_path();
    match read_index(&index_path) {
        Ok(Some(artifact)) => diagnostics.extend(stale_entries(&artifact, &report.entries)),
        Ok(None) => tracing::debug!("No index artifact at {:?}", index_path),
        Err(err) => tracing::warn!("Unreadable index artifact {:?}: {}", index_path, err),
    }

    let count = |severity: DiagnosticSeverity| {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };
    let summary = VerificationSummary {
        documents: report.entries.len(),
        scanned: report.scanned,
        errors: count(DiagnosticSeverity::Error),
        warnings: count(DiagnosticSeverity::Warning),
        infos: count(DiagnosticSeverity::Info),
        diagnostics: &diagnostics,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Verification complete: {} documents, {} errors, {} warnings, {} info",
        summary.documents, summary.errors, summary.warnings, summary.infos
    );
    for diag in &diagnostics {
        let source = diag
            .source_path
            .as_deref()
            .map(|s| format!(" ({})", s))
            .unwrap_or_default();
        println!("- {:?} {}{}: {}", diag.severity, diag.code, source, diag.message);
        if let Some(ctx) = &diag.context {
            println!("  context: {}", ctx);
        }
    }

    Ok(())
}
