//! Single newlines as paragraph boundaries.
//!
//! Authors write one line per paragraph; the base parser folds those lines
//! into one paragraph with soft breaks. This pass splits every top-level
//! paragraph at each `\n` in its text, keeping inline nodes with the line
//! they sit on.

use super::tree::{Document, Node};

pub struct LineBreakTransformer;

impl LineBreakTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, doc: &mut Document) {
        let nodes = std::mem::take(&mut doc.children);
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::Paragraph(children) => split_lines(children, &mut out),
                other => out.push(other),
            }
        }

        doc.children = out;
    }
}

impl Default for LineBreakTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn split_lines(children: Vec<Node>, out: &mut Vec<Node>) {
    let mut current: Vec<Node> = Vec::new();

    for child in children {
        let Node::Text(text) = child else {
            current.push(child);
            continue;
        };

        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                current.push(Node::text(line));
            }
            if lines.peek().is_some() && !current.is_empty() {
                out.push(Node::Paragraph(std::mem::take(&mut current)));
            }
        }
    }

    if !current.is_empty() {
        out.push(Node::Paragraph(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::tree::Link;
    use pulldown_cmark::{LinkType, Tag};

    fn link(text: &str) -> Node {
        Node::Link(Link {
            link_type: LinkType::Inline,
            url: "/x".into(),
            title: String::new(),
            children: vec![Node::text(text)],
            unresolved: false,
        })
    }

    fn run(children: Vec<Node>) -> Vec<Node> {
        let mut doc = Document { children };
        LineBreakTransformer::new().transform(&mut doc);
        doc.children
    }

    #[test]
    fn test_newline_splits_paragraph() {
        assert_eq!(
            run(vec![Node::Paragraph(vec![Node::text("line1\nline2")])]),
            vec![
                Node::Paragraph(vec![Node::text("line1")]),
                Node::Paragraph(vec![Node::text("line2")]),
            ]
        );
    }

    #[test]
    fn test_inline_node_stays_with_current_line() {
        assert_eq!(
            run(vec![Node::Paragraph(vec![
                Node::text("one\ntwo "),
                link("here"),
                Node::text(" more\nthree"),
            ])]),
            vec![
                Node::Paragraph(vec![Node::text("one")]),
                Node::Paragraph(vec![
                    Node::text("two "),
                    link("here"),
                    Node::text(" more"),
                ]),
                Node::Paragraph(vec![Node::text("three")]),
            ]
        );
    }

    #[test]
    fn test_inline_node_after_newline_opens_the_next_paragraph() {
        assert_eq!(
            run(vec![Node::Paragraph(vec![Node::text("first\n"), link("l")])]),
            vec![
                Node::Paragraph(vec![Node::text("first")]),
                Node::Paragraph(vec![link("l")]),
            ]
        );
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(
            run(vec![Node::Paragraph(vec![Node::text("\na\n\nb\n")])]),
            vec![
                Node::Paragraph(vec![Node::text("a")]),
                Node::Paragraph(vec![Node::text("b")]),
            ]
        );
        assert!(run(vec![Node::Paragraph(vec![Node::text("\n")])]).is_empty());
    }

    #[test]
    fn test_only_top_level_paragraphs() {
        let quote = Node::Element {
            tag: Tag::BlockQuote(None),
            children: vec![Node::Paragraph(vec![Node::text("a\nb")])],
        };
        assert_eq!(run(vec![quote.clone()]), vec![quote]);
    }
}
