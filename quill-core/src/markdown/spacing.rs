//! Spacing between CJK and Latin text.
//!
//! Inserts one space wherever a CJK character meets a Latin letter, a digit,
//! some punctuation, or a bracket. Wiki tokens are lexed first and their
//! interiors left alone, so file names and link targets still match.

use super::syntax::tokenize;
use super::tree::{Document, Node};

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{2E80}'..='\u{2EFF}'
        | '\u{2F00}'..='\u{2FDF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{3100}'..='\u{312F}'
        | '\u{3200}'..='\u{32FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}')
}

fn needs_space(prev: char, next: char) -> bool {
    if is_cjk(prev) {
        next.is_ascii_alphanumeric() || "@#&$%^*-+\\=|/".contains(next) || "([{<".contains(next)
    } else if is_cjk(next) {
        prev.is_ascii_alphanumeric() || "~!;:,.?".contains(prev) || ")]}>".contains(prev)
    } else {
        false
    }
}

/// Apply spacing to a whole string
pub fn space_text(text: &str) -> String {
    space_outside(text, &[])
}

/// Apply spacing, leaving the inside of wiki tokens untouched
pub fn space_protected(text: &str) -> String {
    if !text.contains("[[") {
        return space_text(text);
    }
    let protected: Vec<_> = tokenize(text)
        .into_iter()
        .filter(|t| !t.is_text())
        .map(|t| t.span)
        .collect();
    space_outside(text, &protected)
}

fn space_outside(text: &str, protected: &[std::ops::Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;

    for (pos, c) in text.char_indices() {
        if let Some(p) = prev {
            let inside = protected.iter().any(|r| r.start < pos && pos < r.end);
            if !inside && needs_space(p, c) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

/// Rewrites every text node in the document
pub struct SpacingTransformer;

impl SpacingTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, doc: &mut Document) {
        visit(&mut doc.children);
    }
}

impl Default for SpacingTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn visit(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                let spaced = space_protected(text);
                if spaced.len() != text.len() {
                    *text = spaced;
                }
            }
            other => {
                if let Some(children) = other.children_mut() {
                    visit(children);
                }
            }
        }
    }
}
