//! Document tree back to pulldown-cmark events and HTML.

use super::html_escape;
use super::tree::{Document, Image, Link, Node};
use super::wikilinks::UNRESOLVED_TITLE;
use pulldown_cmark::{html, CowStr, Event, Tag, TagEnd};

/// Serialize a transformed document to HTML
pub fn render_html(doc: &Document) -> String {
    let mut html_output = String::new();
    html::push_html(&mut html_output, to_events(doc).into_iter());
    html_output
}

/// Flatten a document into the event stream pulldown-cmark renders
pub fn to_events(doc: &Document) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    push_nodes(&doc.children, true, &mut events);
    events
}

fn text(s: &str) -> CowStr<'static> {
    CowStr::Boxed(s.to_string().into_boxed_str())
}

fn push_nodes(nodes: &[Node], top_level: bool, out: &mut Vec<Event<'static>>) {
    for node in nodes {
        match node {
            Node::Paragraph(children) => {
                out.push(Event::Start(Tag::Paragraph));
                push_nodes(children, false, out);
                out.push(Event::End(TagEnd::Paragraph));
            }
            Node::Text(s) => out.push(Event::Text(text(s))),
            Node::Code(s) => out.push(Event::Code(text(s))),
            Node::CodeBlock { kind, literal } => {
                out.push(Event::Start(Tag::CodeBlock(kind.clone())));
                if !literal.is_empty() {
                    out.push(Event::Text(text(literal)));
                }
                out.push(Event::End(TagEnd::CodeBlock));
            }
            Node::Html(s) => out.push(Event::Html(text(s))),
            Node::InlineHtml(s) => out.push(Event::InlineHtml(text(s))),
            Node::Math { display: true, literal } => out.push(Event::DisplayMath(text(literal))),
            Node::Math { display: false, literal } => out.push(Event::InlineMath(text(literal))),
            Node::Link(link) => push_link(link, out),
            Node::Image(image) => {
                // block-level images are emitted bare, like an HTML block
                if top_level {
                    out.push(Event::Html(CowStr::from(format!("{}\n", image_html(image)))));
                } else {
                    out.push(Event::InlineHtml(CowStr::from(image_html(image))));
                }
            }
            Node::FootnoteReference(label) => out.push(Event::FootnoteReference(text(label))),
            Node::TaskListMarker(checked) => out.push(Event::TaskListMarker(*checked)),
            Node::HardBreak => out.push(Event::HardBreak),
            Node::Rule => out.push(Event::Rule),
            Node::Element { tag, children } => {
                out.push(Event::Start(tag.clone()));
                push_nodes(children, false, out);
                out.push(Event::End(tag.to_end()));
            }
        }
    }
}

fn push_link(link: &Link, out: &mut Vec<Event<'static>>) {
    if link.unresolved {
        out.push(Event::InlineHtml(CowStr::from(format!(
            r##"<a href="#" title="{}" aria-disabled="true" data-unresolved="true">"##,
            html_escape(UNRESOLVED_TITLE)
        ))));
        push_nodes(&link.children, false, out);
        out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
        return;
    }

    out.push(Event::Start(Tag::Link {
        link_type: link.link_type,
        dest_url: text(&link.url),
        title: text(&link.title),
        id: CowStr::Borrowed(""),
    }));
    push_nodes(&link.children, false, out);
    out.push(Event::End(TagEnd::Link));
}

fn image_html(image: &Image) -> String {
    let mut html = format!(
        r#"<img src="{}" alt="{}""#,
        html_escape(&image.url),
        html_escape(&image.alt)
    );
    if !image.title.is_empty() {
        html.push_str(&format!(r#" title="{}""#, html_escape(&image.title)));
    }
    if let Some(width) = &image.width {
        html.push_str(&format!(r#" width="{}""#, html_escape(width)));
    }
    html.push_str(" />");
    html
}
