//! Render a single document through the full pipeline.

use crate::{context::Context, RenderFormat};
use anyhow::{bail, Context as _, Result};
use quill_core::render_post;
use std::path::Path;

/// Look a slug up, transform its body and print the result.
pub fn render_document(
    config_path: &Path,
    slug: &str,
    lang: Option<&str>,
    format: RenderFormat,
) -> Result<()> {
    let ctx = Context::load(config_path)?;

    if let Some(lang) = lang {
        if !ctx.config.i18n.is_supported(lang) {
            bail!(
                "Unsupported locale '{}' (expected one of: {})",
                lang,
                ctx.config.i18n.locales.join(", ")
            );
        }
    }

    let repo = ctx.repository();
    let processor = ctx.processor();
    let Some(page) =
        render_post(&repo, &processor, slug, lang).context("Failed to load content index")?
    else {
        bail!("No document with slug '{}'", slug);
    };

    match format {
        RenderFormat::Html => print!("{}", page.html),
        RenderFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
    }

    Ok(())
}
