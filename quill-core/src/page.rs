//! Full render path for one document: repository lookup, pipeline, HTML.

use crate::{
    markdown::MarkdownProcessor,
    repository::{ContentRepository, RepositoryError},
};
use quill_types::PostData;
use serde::Serialize;

/// A document ready for the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPost {
    #[serde(flatten)]
    pub post: PostData,
    pub html: String,
    pub unresolved_links: usize,
}

/// Look up `slug` and render its body for `lang`.
///
/// `Ok(None)` means not found (unknown slug or stale index); the caller
/// decides how to respond.
pub fn render_post(
    repo: &ContentRepository,
    processor: &MarkdownProcessor,
    slug: &str,
    lang: Option<&str>,
) -> Result<Option<RenderedPost>, RepositoryError> {
    let Some(post) = repo.post_by_slug(slug)? else {
        return Ok(None);
    };

    let post_id_map = repo.post_id_map()?;
    let rendered = processor.convert(&post.content, &post_id_map, lang);
    tracing::debug!(
        "Rendered {} ({} bytes, {} unresolved links)",
        slug,
        rendered.html.len(),
        rendered.unresolved_links
    );

    Ok(Some(RenderedPost {
        post,
        html: rendered.html,
        unresolved_links: rendered.unresolved_links,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_render_post_resolves_links_between_documents() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::write(
            dir.path().join("home/Target Note.md"),
            "---\nslug: t1\ndate: 2024-01-01\n---\nTarget",
        )
        .unwrap();
        fs::write(
            dir.path().join("home/source.md"),
            "---\nslug: s1\ndate: 2024-01-02\n---\nSee [[Target Note]]\nand [[Missing]]",
        )
        .unwrap();

        let repo = ContentRepository::new(dir.path(), dir.path().join("none.json"));
        let processor = MarkdownProcessor::new();

        let page = render_post(&repo, &processor, "s1", Some("en"))
            .unwrap()
            .unwrap();
        assert_eq!(page.post.slug(), "s1");
        assert_eq!(page.unresolved_links, 1);
        assert!(page.html.contains("<p>See <a href=\"/en/posts/t1\">Target Note</a></p>"));
        assert!(page.html.contains("data-unresolved=\"true\">Missing</a>"));

        assert!(render_post(&repo, &processor, "nope", None)
            .unwrap()
            .is_none());
    }
}
