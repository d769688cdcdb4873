//! Turns an article fragment into a single line of plain text.
//!
//! The fragment is parsed with `scraper`, stripped of scripting, styling,
//! embedded objects and form controls, then every remaining text node is
//! concatenated in document order and whitespace is collapsed.

use scraper::{Html, Node};

use crate::error::{ReaderError, Result};

/// Elements removed together with everything inside them.
pub const KILLED_TAGS: &[&str] = &[
    "script", "style", "link", "meta", "applet", "iframe", "frame", "frameset", "embed", "object",
    "param", "button", "input", "select", "textarea", "noscript", "noembed", "noframes",
];

/// Parse, sanitize, flatten and collapse `fragment`.
///
/// An empty fragment, or one with no text left after sanitizing, yields `""`.
pub fn normalize(fragment: &str) -> Result<String> {
    ensure_parseable(fragment)?;

    let mut html = Html::parse_fragment(fragment);
    sanitize(&mut html);

    Ok(collapse_whitespace(&flatten_text(&html)))
}

/// Detach killed elements, comments and processing instructions from the tree.
///
/// Attributes (including `on*` handlers) are left on the surviving elements;
/// they never reach the output since only text nodes are flattened.
pub fn sanitize(html: &mut Html) {
    let doomed: Vec<_> = html
        .tree
        .root()
        .descendants()
        .filter(|node| match node.value() {
            Node::Element(el) => KILLED_TAGS.contains(&el.name()),
            Node::Comment(_) | Node::ProcessingInstruction(_) => true,
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Concatenate all text nodes reachable from the root, without separators.
pub fn flatten_text(html: &Html) -> String {
    let mut out = String::new();
    for node in html.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            out.push_str(text);
        }
    }
    out
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// html5ever accepts anything, so binary content is the only thing we refuse.
fn ensure_parseable(fragment: &str) -> Result<()> {
    let bad = fragment
        .char_indices()
        .find(|(_, c)| (*c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r' | '\u{c}'));

    match bad {
        Some((offset, c)) => Err(ReaderError::MarkupParse {
            reason: format!("control character U+{:04X} at byte {}", c as u32, offset),
        }),
        None => Ok(()),
    }
}
