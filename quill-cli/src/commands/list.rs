//! List posts or daily entries the way the site's listing pages see them.

use crate::context::Context;
use anyhow::{Context as _, Result};
use std::path::Path;

pub fn list_posts(config_path: &Path, daily: bool, json: bool) -> Result<()> {
    let ctx = Context::load(config_path)?;
    let repo = ctx.repository();

    let posts = if daily {
        repo.daily_posts()
    } else {
        repo.sorted_posts()
    }
    .context("Failed to load content index")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    for post in &posts {
        let title = post.title.as_deref().unwrap_or(&post.file_name);
        let tags = if post.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", post.tags.join(", "))
        };
        println!("{}  {:<20} {}{}", post.date, post.slug, title, tags);
    }
    println!("{} {}", posts.len(), if daily { "daily entries" } else { "posts" });

    Ok(())
}
