//! Lexer for the wiki syntax embedded in text: `![[file|width]]` and
//! `[[Title]]` / `[[Title|label]]`.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static WIKI_TOKEN: OnceLock<Regex> = OnceLock::new();

// Bodies never contain brackets, so `[[a [[b]]` only matches `[[b]]`
fn wiki_token_regex() -> &'static Regex {
    WIKI_TOKEN.get_or_init(|| Regex::new(r"(?P<bang>[!！])?\[\[(?P<body>[^\[\]]+)\]\]").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiToken<'a> {
    Text(&'a str),
    Image {
        file: &'a str,
        width: Option<&'a str>,
    },
    Link {
        target: &'a str,
        label: &'a str,
    },
}

/// A token together with the byte range it covers in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: WikiToken<'a>,
    pub span: Range<usize>,
}

impl Spanned<'_> {
    pub fn is_text(&self) -> bool {
        matches!(self.token, WikiToken::Text(_))
    }
}

/// Split text into literal runs and wiki tokens.
///
/// Rules:
/// - a token directly preceded by `\` stays literal, backslash included
/// - `![[file|width]]` (or fullwidth `！`) is an image; `width` is optional
/// - an image whose file part is blank stays literal
/// - `[[Title]]` is a link; `[[Title|label]]` shows `label`
/// - a link with a blank title stays literal
///
/// Adjacent literal runs are merged, so the result alternates between text
/// and tokens and concatenating the spans yields the input.
pub fn tokenize(text: &str) -> Vec<Spanned<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;

    for caps in wiki_token_regex().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if text[..whole.start()].ends_with('\\') {
            continue;
        }

        let body = caps.name("body").map_or("", |m| m.as_str());
        let token = if caps.name("bang").is_some() {
            image_token(body)
        } else {
            link_token(body)
        };
        let Some(token) = token else { continue };

        if whole.start() > text_start {
            tokens.push(Spanned {
                token: WikiToken::Text(&text[text_start..whole.start()]),
                span: text_start..whole.start(),
            });
        }
        tokens.push(Spanned {
            token,
            span: whole.range(),
        });
        text_start = whole.end();
    }

    if text_start < text.len() {
        tokens.push(Spanned {
            token: WikiToken::Text(&text[text_start..]),
            span: text_start..text.len(),
        });
    }

    tokens
}

/// True when `text` contains at least one image or link token
pub fn has_tokens(text: &str) -> bool {
    text.contains("[[") && tokenize(text).iter().any(|t| !t.is_text())
}

fn image_token(body: &str) -> Option<WikiToken<'_>> {
    let (file, width) = match body.split_once('|') {
        Some((file, width)) => (file.trim(), Some(width.trim()).filter(|w| !w.is_empty())),
        None => (body.trim(), None),
    };
    if file.is_empty() {
        return None;
    }
    Some(WikiToken::Image { file, width })
}

fn link_token(body: &str) -> Option<WikiToken<'_>> {
    let (target, label) = match body.split_once('|') {
        Some((target, label)) => (target.trim(), label.trim()),
        None => (body.trim(), ""),
    };
    if target.is_empty() {
        return None;
    }
    let label = if label.is_empty() { target } else { label };
    Some(WikiToken::Link { target, label })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<WikiToken<'_>> {
        tokenize(text).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_image_with_width() {
        assert_eq!(
            kinds("before ![[cat.png|300]] after"),
            vec![
                WikiToken::Text("before "),
                WikiToken::Image {
                    file: "cat.png",
                    width: Some("300")
                },
                WikiToken::Text(" after"),
            ]
        );
    }

    #[test]
    fn test_fullwidth_bang() {
        assert_eq!(
            kinds("！[[ cat ]]"),
            vec![WikiToken::Image {
                file: "cat",
                width: None
            }]
        );
    }

    #[test]
    fn test_link_with_label() {
        assert_eq!(
            kinds("[[My Post]] and [[Other | see here]]"),
            vec![
                WikiToken::Link {
                    target: "My Post",
                    label: "My Post"
                },
                WikiToken::Text(" and "),
                WikiToken::Link {
                    target: "Other",
                    label: "see here"
                },
            ]
        );
    }

    #[test]
    fn test_adjacent_tokens() {
        let tokens = tokenize("[[a]][[b]]![[c]]");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].span, 0..5);
        assert_eq!(tokens[1].span, 5..10);
        assert!(matches!(tokens[2].token, WikiToken::Image { file: "c", .. }));
    }

    #[test]
    fn test_unmatched_brackets_stay_text() {
        assert_eq!(
            kinds("[[open and ]] close]"),
            vec![
                WikiToken::Link {
                    target: "open and",
                    label: "open and"
                },
                WikiToken::Text(" close]"),
            ]
        );
        assert_eq!(kinds("[[never closed"), vec![WikiToken::Text("[[never closed")]);
        assert_eq!(
            kinds("[[a [[b]]"),
            vec![
                WikiToken::Text("[[a "),
                WikiToken::Link {
                    target: "b",
                    label: "b"
                }
            ]
        );
    }

    #[test]
    fn test_escaped_tokens_stay_literal() {
        assert_eq!(kinds(r"\[[x]]"), vec![WikiToken::Text(r"\[[x]]")]);
        assert_eq!(kinds(r"\![[x.png]]"), vec![WikiToken::Text(r"\![[x.png]]")]);
        assert!(!has_tokens(r"see \[[x]]"));
    }

    #[test]
    fn test_blank_bodies_stay_literal() {
        assert_eq!(kinds("[[  ]]"), vec![WikiToken::Text("[[  ]]")]);
        assert_eq!(kinds("![[ |300]]"), vec![WikiToken::Text("![[ |300]]")]);
        assert_eq!(kinds("[[ |label]]"), vec![WikiToken::Text("[[ |label]]")]);
    }

    #[test]
    fn test_spans_cover_input() {
        let text = "中文![[a.jpg|50%]]x[[b]]y";
        let joined: String = tokenize(text).iter().map(|t| &text[t.span.clone()]).collect();
        assert_eq!(joined, text);
    }
}
