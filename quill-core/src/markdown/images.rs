//! Wiki image elevation.
//!
//! `![[file|width]]` inside a paragraph becomes a block-level image: the
//! paragraph is split around it and the image takes its place as a sibling.

use super::syntax::{tokenize, WikiToken};
use super::tree::{Document, Image, Node};
use pulldown_cmark::Tag;

pub struct ImageTransformer {
    image_base: String,
}

impl ImageTransformer {
    /// `image_base` is a normalized URL prefix such as `/image`
    pub fn new(image_base: &str) -> Self {
        Self {
            image_base: image_base.to_string(),
        }
    }

    pub fn transform(&self, doc: &mut Document) {
        caption_images(&mut doc.children);
        doc.children = self.elevate(std::mem::take(&mut doc.children));
    }

    /// Source path of a wiki image; `.png` is assumed when there is no extension
    pub fn image_url(&self, file: &str) -> String {
        if file.contains('.') {
            format!("{}/{}", self.image_base, file)
        } else {
            format!("{}/{}.png", self.image_base, file)
        }
    }

    fn elevate(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.elevate_node(node, &mut out);
        }
        out
    }

    fn elevate_node(&self, node: Node, out: &mut Vec<Node>) {
        match node {
            Node::Paragraph(children) => self.split_paragraph(children, out),
            Node::Element {
                tag: Tag::Item,
                children,
            } => out.push(Node::Element {
                tag: Tag::Item,
                children: self.elevate_item(children),
            }),
            Node::Element { tag, children } => out.push(Node::Element {
                tag,
                children: self.elevate(children),
            }),
            other => out.push(other),
        }
    }

    /// Tight list items carry inline runs directly; each run is split like a
    /// paragraph, but left unwrapped when it holds no image.
    fn elevate_item(&self, children: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(children.len());
        let mut run: Vec<Node> = Vec::new();

        for child in children {
            if child.is_block() {
                self.flush_run(&mut run, &mut out);
                self.elevate_node(child, &mut out);
            } else {
                run.push(child);
            }
        }
        self.flush_run(&mut run, &mut out);

        out
    }

    fn flush_run(&self, run: &mut Vec<Node>, out: &mut Vec<Node>) {
        let run = std::mem::take(run);
        if run
            .iter()
            .any(|n| matches!(n, Node::Text(text) if text_has_image(text)))
        {
            self.split_paragraph(run, out);
        } else {
            out.extend(run);
        }
    }

    /// Replace one paragraph by its pieces, appending them to `out`
    fn split_paragraph(&self, children: Vec<Node>, out: &mut Vec<Node>) {
        let has_images = children.iter().any(|child| match child {
            Node::Text(text) => text_has_image(text),
            _ => false,
        });
        if !has_images {
            out.push(Node::Paragraph(children));
            return;
        }

        let mut current: Vec<Node> = Vec::new();
        // text right after an image opens a new block
        let mut after_image = false;

        for child in children {
            let text = match child {
                Node::Text(text) if text_has_image(&text) => text,
                other => {
                    current.push(other);
                    after_image = false;
                    continue;
                }
            };

            let mut pending = String::new();
            for spanned in tokenize(&text) {
                match spanned.token {
                    WikiToken::Image { file, width } => {
                        push_text(&mut current, &pending, after_image);
                        pending.clear();
                        flush(&mut current, out);
                        out.push(Node::Image(Image {
                            url: self.image_url(file),
                            alt: file.to_string(),
                            title: file.to_string(),
                            width: width.map(str::to_string),
                        }));
                        after_image = true;
                    }
                    _ => pending.push_str(&text[spanned.span]),
                }
            }
            push_text(&mut current, &pending, after_image);
            if !pending.is_empty() {
                after_image = after_image && pending.trim_start().is_empty();
            }
        }

        flush(&mut current, out);
    }
}

fn text_has_image(text: &str) -> bool {
    text.contains("[[")
        && tokenize(text)
            .iter()
            .any(|t| matches!(t.token, WikiToken::Image { .. }))
}

fn push_text(current: &mut Vec<Node>, text: &str, after_image: bool) {
    let text = if after_image && current.is_empty() {
        text.trim_start()
    } else {
        text
    };
    if !text.is_empty() {
        current.push(Node::text(text));
    }
}

fn flush(current: &mut Vec<Node>, out: &mut Vec<Node>) {
    if !current.is_empty() {
        out.push(Node::Paragraph(std::mem::take(current)));
    }
}

/// Standard images get their alt text as caption when they have no title
fn caption_images(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Image(image) => {
                if image.title.is_empty() {
                    image.title = image.alt.clone();
                }
            }
            other => {
                if let Some(children) = other.children_mut() {
                    caption_images(children);
                }
            }
        }
    }
}
