//! Wikilink resolution for [[Title]] and [[Title|text]] syntax.
//!
//! Titles are file names without extension; they resolve through the post id
//! map to slug-based URLs. Unknown titles still produce a link so rendering
//! never fails, but it points nowhere and is flagged as unresolved.

use super::spacing::space_text;
use super::syntax::{has_tokens, tokenize, WikiToken};
use super::tree::{Document, Link, Node};
use pulldown_cmark::LinkType;
use std::collections::HashMap;

pub const UNRESOLVED_TITLE: &str = "Unresolved wiki link";

/// Transformer for wikilink syntax
pub struct WikilinkTransformer<'a> {
    post_id_map: &'a HashMap<String, String>,
    /// Locale prefix plus posts base, e.g. `/en/posts`
    href_prefix: String,
}

impl<'a> WikilinkTransformer<'a> {
    pub fn new(post_id_map: &'a HashMap<String, String>, href_prefix: impl Into<String>) -> Self {
        Self {
            post_id_map,
            href_prefix: href_prefix.into(),
        }
    }

    /// Resolve wikilinks in every paragraph.
    ///
    /// Returns the number of unresolved links.
    pub fn transform(&self, doc: &mut Document) -> usize {
        let mut unresolved = 0;
        self.visit(&mut doc.children, &mut unresolved);
        unresolved
    }

    fn visit(&self, nodes: &mut [Node], unresolved: &mut usize) {
        for node in nodes {
            match node {
                Node::Paragraph(children) => {
                    if children
                        .iter()
                        .any(|c| matches!(c, Node::Text(t) if has_tokens(t)))
                    {
                        let old = std::mem::take(children);
                        *children = self.resolve_inline(old, unresolved);
                    }
                }
                // links and images are never rescanned
                Node::Link(_) | Node::Image(_) => {}
                other => {
                    let is_item = other.is_list_item();
                    if let Some(children) = other.children_mut() {
                        // inline content of a tight list item
                        if is_item {
                            let old = std::mem::take(children);
                            *children = self.resolve_inline(old, unresolved);
                        }
                        self.visit(children, unresolved);
                    }
                }
            }
        }
    }

    fn resolve_inline(&self, children: Vec<Node>, unresolved: &mut usize) -> Vec<Node> {
        let mut out = Vec::with_capacity(children.len());

        for child in children {
            let Node::Text(text) = child else {
                out.push(child);
                continue;
            };

            let mut pending = String::new();
            for spanned in tokenize(&text) {
                match spanned.token {
                    WikiToken::Link { target, label } => {
                        if !pending.is_empty() {
                            out.push(Node::Text(std::mem::take(&mut pending)));
                        }
                        let link = self.create_link(target, label);
                        if link.unresolved {
                            *unresolved += 1;
                        }
                        out.push(Node::Link(link));
                    }
                    _ => pending.push_str(&text[spanned.span]),
                }
            }
            if !pending.is_empty() {
                out.push(Node::Text(pending));
            }
        }

        out
    }

    fn create_link(&self, target: &str, label: &str) -> Link {
        // the label bypassed the spacing pass while it was part of a token
        let children = vec![Node::Text(space_text(label))];

        match self.post_id_map.get(target) {
            Some(slug) => Link {
                link_type: LinkType::Inline,
                url: format!("{}/{}", self.href_prefix, slug),
                title: String::new(),
                children,
                unresolved: false,
            },
            None => Link {
                link_type: LinkType::Inline,
                url: "#".to_string(),
                title: UNRESOLVED_TITLE.to_string(),
                children,
                unresolved: true,
            },
        }
    }
}
