//! Owned document tree folded from the pulldown-cmark event stream.
//!
//! Passes rewrite this tree instead of the flat event list: paragraphs, text,
//! links and images get their own variants, everything else is kept as a
//! generic [`Node::Element`] carrying the original tag.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub link_type: LinkType,
    pub url: String,
    pub title: String,
    pub children: Vec<Node>,
    /// Wiki link whose target is not in the corpus
    pub unresolved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub alt: String,
    pub title: String,
    /// Rendering hint, emitted as the `width` attribute
    pub width: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Paragraph(Vec<Node>),
    /// Inline text; soft breaks are kept as `\n`
    Text(String),
    Code(String),
    CodeBlock {
        kind: CodeBlockKind<'static>,
        literal: String,
    },
    Html(String),
    InlineHtml(String),
    Math {
        display: bool,
        literal: String,
    },
    Link(Link),
    Image(Image),
    FootnoteReference(String),
    TaskListMarker(bool),
    HardBreak,
    Rule,
    /// Any other container (heading, list, quote, table, emphasis...)
    Element {
        tag: Tag<'static>,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Paragraph(children) | Node::Element { children, .. } => Some(children),
            Node::Link(link) => Some(&link.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph(children) | Node::Element { children, .. } => Some(children),
            Node::Link(link) => Some(&mut link.children),
            _ => None,
        }
    }

    /// Block-level nodes; everything else flows inline
    pub fn is_block(&self) -> bool {
        match self {
            Node::Paragraph(_)
            | Node::CodeBlock { .. }
            | Node::Html(_)
            | Node::Rule
            | Node::Math { display: true, .. } => true,
            Node::Element { tag, .. } => matches!(
                tag,
                Tag::Heading { .. }
                    | Tag::BlockQuote(_)
                    | Tag::CodeBlock(_)
                    | Tag::HtmlBlock
                    | Tag::List(_)
                    | Tag::Item
                    | Tag::FootnoteDefinition(_)
                    | Tag::Table(_)
                    | Tag::TableHead
                    | Tag::TableRow
                    | Tag::TableCell
                    | Tag::DefinitionList
                    | Tag::DefinitionListTitle
                    | Tag::DefinitionListDefinition
                    | Tag::MetadataBlock(_)
            ),
            _ => false,
        }
    }

    /// True for list items, whose inline content is not wrapped in a
    /// paragraph when the list is tight
    pub fn is_list_item(&self) -> bool {
        matches!(self, Node::Element { tag: Tag::Item, .. })
    }

    /// Concatenated text content, as used for image alt text
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(std::slice::from_ref(self), &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) | Node::Code(s) => out.push_str(s),
            Node::Image(image) => out.push_str(&image.alt),
            Node::HardBreak => out.push('\n'),
            other => {
                if let Some(children) = other.children() {
                    collect_text(children, out);
                }
            }
        }
    }
}

fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

struct Frame {
    tag: Tag<'static>,
    children: Vec<Node>,
}

impl Document {
    pub fn parse(markdown: &str, options: Options) -> Self {
        Self::from_events(Parser::new_ext(markdown, options))
    }

    pub fn from_events<'a>(events: impl IntoIterator<Item = Event<'a>>) -> Self {
        let mut root = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        for event in events {
            let node = match event {
                Event::Start(tag) => {
                    stack.push(Frame {
                        tag: owned_tag(tag),
                        children: Vec::new(),
                    });
                    continue;
                }
                Event::End(_) => match stack.pop() {
                    Some(frame) => close(frame),
                    None => continue,
                },
                Event::Text(text) => Node::Text(text.to_string()),
                Event::SoftBreak => Node::text("\n"),
                Event::Code(code) => Node::Code(code.to_string()),
                Event::Html(html) => Node::Html(html.to_string()),
                Event::InlineHtml(html) => Node::InlineHtml(html.to_string()),
                Event::InlineMath(math) => Node::Math {
                    display: false,
                    literal: math.to_string(),
                },
                Event::DisplayMath(math) => Node::Math {
                    display: true,
                    literal: math.to_string(),
                },
                Event::FootnoteReference(label) => Node::FootnoteReference(label.to_string()),
                Event::TaskListMarker(checked) => Node::TaskListMarker(checked),
                Event::HardBreak => Node::HardBreak,
                Event::Rule => Node::Rule,
            };
            append(current(&mut stack, &mut root), node);
        }

        while let Some(frame) = stack.pop() {
            let node = close(frame);
            append(current(&mut stack, &mut root), node);
        }

        Document { children: root }
    }
}

fn current<'s>(stack: &'s mut [Frame], root: &'s mut Vec<Node>) -> &'s mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Push a node, merging consecutive text
fn append(children: &mut Vec<Node>, node: Node) {
    if let (Some(Node::Text(last)), Node::Text(text)) = (children.last_mut(), &node) {
        last.push_str(text);
        return;
    }
    children.push(node);
}

fn close(frame: Frame) -> Node {
    let Frame { tag, children } = frame;
    match tag {
        Tag::Paragraph => Node::Paragraph(children),
        Tag::CodeBlock(kind) => Node::CodeBlock {
            kind,
            literal: plain_text(&children),
        },
        Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        } => Node::Link(Link {
            link_type,
            url: dest_url.to_string(),
            title: title.to_string(),
            children,
            unresolved: false,
        }),
        Tag::Image { dest_url, title, .. } => Node::Image(Image {
            url: dest_url.to_string(),
            alt: plain_text(&children),
            title: title.to_string(),
            width: None,
        }),
        tag => Node::Element { tag, children },
    }
}

fn owned(s: CowStr<'_>) -> CowStr<'static> {
    CowStr::Boxed(s.to_string().into_boxed_str())
}

/// Detach a tag from the parser's input buffer
fn owned_tag(tag: Tag<'_>) -> Tag<'static> {
    match tag {
        Tag::Paragraph => Tag::Paragraph,
        Tag::Heading {
            level,
            id,
            classes,
            attrs,
        } => Tag::Heading {
            level,
            id: id.map(owned),
            classes: classes.into_iter().map(owned).collect(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (owned(k), v.map(owned)))
                .collect(),
        },
        Tag::BlockQuote(kind) => Tag::BlockQuote(kind),
        Tag::CodeBlock(CodeBlockKind::Indented) => Tag::CodeBlock(CodeBlockKind::Indented),
        Tag::CodeBlock(CodeBlockKind::Fenced(lang)) => {
            Tag::CodeBlock(CodeBlockKind::Fenced(owned(lang)))
        }
        Tag::HtmlBlock => Tag::HtmlBlock,
        Tag::List(start) => Tag::List(start),
        Tag::Item => Tag::Item,
        Tag::FootnoteDefinition(label) => Tag::FootnoteDefinition(owned(label)),
        Tag::Table(alignments) => Tag::Table(alignments),
        Tag::TableHead => Tag::TableHead,
        Tag::TableRow => Tag::TableRow,
        Tag::TableCell => Tag::TableCell,
        Tag::Emphasis => Tag::Emphasis,
        Tag::Strong => Tag::Strong,
        Tag::Strikethrough => Tag::Strikethrough,
        Tag::Superscript => Tag::Superscript,
        Tag::Subscript => Tag::Subscript,
        Tag::DefinitionList => Tag::DefinitionList,
        Tag::DefinitionListTitle => Tag::DefinitionListTitle,
        Tag::DefinitionListDefinition => Tag::DefinitionListDefinition,
        Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        } => Tag::Link {
            link_type,
            dest_url: owned(dest_url),
            title: owned(title),
            id: owned(id),
        },
        Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        } => Tag::Image {
            link_type,
            dest_url: owned(dest_url),
            title: owned(title),
            id: owned(id),
        },
        Tag::MetadataBlock(kind) => Tag::MetadataBlock(kind),
    }
}
