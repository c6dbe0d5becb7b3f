//! Text normalization for extracted page text

use super::markup::{Document, NodeId};
use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of whitespace, non-breaking spaces included
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{00A0}]+").unwrap());

/// Typographic punctuation and its ASCII replacement
const PUNCTUATION: &[(char, char)] = &[
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
    ('\u{201C}', '"'),
    ('\u{201D}', '"'),
    ('\u{2010}', '-'),
    ('\u{2011}', '-'),
    ('\u{2012}', '-'),
    ('\u{2013}', '-'),
    ('\u{2014}', '-'),
    ('\u{2015}', '-'),
];

/// Normalize text: map typographic punctuation to ASCII, collapse whitespace
/// runs to one space and trim.
///
/// `clean(clean(x)) == clean(x)` for any input.
///
/// # Example
///
/// ```rust
/// use datahub_schema::import::clean;
///
/// assert_eq!(clean("  The user\u{2019}s\u{00A0}\t id \u{2014} unique "), "The user's id - unique");
/// ```
pub fn clean(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| {
            PUNCTUATION
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect();
    WHITESPACE.replace_all(mapped.trim(), " ").trim().to_string()
}

/// Clean a node's text and rewrite the node to hold only that text.
///
/// This is the explicit rewrite used when re-serializing a page; reading a
/// node's cleaned text without touching the tree is `clean(&doc.text_content(node))`.
pub fn clean_node(document: &mut Document, node: NodeId) -> String {
    let cleaned = clean(&document.text_content(node));
    document.set_text(node, &cleaned);
    cleaned
}
