//! Markdown processing pipeline with custom extensions.
//!
//! Markdown is parsed into an owned [`Document`] tree, rewritten by four
//! passes in a fixed order, and serialized to HTML:
//!
//! 1. [`SpacingTransformer`]: spaces between CJK and Latin text
//! 2. [`ImageTransformer`]: `![[file|width]]` becomes a block-level image
//! 3. [`WikilinkTransformer`]: `[[Title]]` resolves through the post id map
//! 4. [`LineBreakTransformer`]: each newline starts a new paragraph
//!
//! Images must be lifted out before links are resolved, so link matching
//! never sees the inside of an image token.

pub mod images;
pub mod line_breaks;
pub mod render;
pub mod spacing;
pub mod syntax;
pub mod tree;
pub mod wikilinks;

use crate::config::{locale_prefix, normalize_url_prefix, Config};
use pulldown_cmark::Options;
use std::collections::HashMap;

pub use images::ImageTransformer;
pub use line_breaks::LineBreakTransformer;
pub use render::render_html;
pub use spacing::SpacingTransformer;
pub use tree::{Document, Image, Link, Node};
pub use wikilinks::WikilinkTransformer;

/// HTML for one document plus what the pipeline noticed along the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub unresolved_links: usize,
}

/// Markdown processor with custom extensions
pub struct MarkdownProcessor {
    options: Options,
    image_base: String,
    posts_base: String,
    default_locale: String,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self {
            options,
            image_base: "/image".to_string(),
            posts_base: "/posts".to_string(),
            default_locale: "zh".to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            image_base: normalize_url_prefix(&config.links.image_base),
            posts_base: normalize_url_prefix(&config.links.posts_base),
            default_locale: config.i18n.default_locale.clone(),
            ..Self::new()
        }
    }

    pub fn parse(&self, markdown: &str) -> Document {
        Document::parse(markdown, self.options)
    }

    /// Run all passes over `doc` in place.
    ///
    /// `lang` selects the link prefix (none for the default locale). Returns
    /// the number of wiki links that did not resolve.
    pub fn transform(
        &self,
        doc: &mut Document,
        post_id_map: &HashMap<String, String>,
        lang: Option<&str>,
    ) -> usize {
        SpacingTransformer::new().transform(doc);

        ImageTransformer::new(&self.image_base).transform(doc);

        let href_prefix = format!(
            "{}{}",
            locale_prefix(lang, &self.default_locale),
            self.posts_base
        );
        let unresolved = WikilinkTransformer::new(post_id_map, href_prefix).transform(doc);
        if unresolved > 0 {
            tracing::info!("unresolved wiki links: {}", unresolved);
        }

        LineBreakTransformer::new().transform(doc);

        unresolved
    }

    /// Convert markdown to HTML with all custom transforms
    pub fn convert(
        &self,
        markdown: &str,
        post_id_map: &HashMap<String, String>,
        lang: Option<&str>,
    ) -> Rendered {
        let mut doc = self.parse(markdown);
        let unresolved_links = self.transform(&mut doc, post_id_map, lang);
        Rendered {
            html: render_html(&doc),
            unresolved_links,
        }
    }

    /// Convert markdown to HTML without link resolution
    pub fn convert_simple(&self, markdown: &str) -> String {
        self.convert(markdown, &HashMap::new(), None).html
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
