//! Lenient HTML tree builder over `quick-xml` events.
//!
//! Dictionary pages are HTML, not XML: end tags may be missing or unmatched,
//! void elements are never closed and named entities go beyond the five XML
//! ones. A paragraph ends at the next block-level start tag, and a `<` that
//! starts no tag is plain text. The builder tolerates all of that and
//! produces a small arena tree that the navigator and segmenter walk read-only.

use super::ImportError;
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::errors::SyntaxError;
use quick_xml::escape::{escape, partial_escape, unescape_with};
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::debug;

/// Elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Block-level elements whose start tag ends an open paragraph
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "menu",
    "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Elements an implied paragraph end never reaches past
const PARAGRAPH_SCOPE: &[&str] = &["table", "td", "th", "caption", "button"];

/// Script and style blocks hold raw text that is not markup; they are dropped before tokenizing
static RAW_TEXT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap());

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    children: Vec<NodeId>,
}

/// Parsed markup document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse markup text into a document tree.
    ///
    /// Element and attribute names are lower-cased. Comments, doctype and
    /// processing instructions are dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::import::Document;
    ///
    /// let doc = Document::parse("<div id=main><p>Hello&nbsp;world<br></p></div>").unwrap();
    /// let div = doc.element_children(doc.root()).next().unwrap();
    /// assert_eq!(doc.attribute(div, "id"), Some("main"));
    /// assert_eq!(doc.text_content(div), "Hello\u{a0}world");
    /// ```
    pub fn parse(markup: &str) -> Result<Self, ImportError> {
        let markup = RAW_TEXT_BLOCK.replace_all(markup, "");
        let markup = escape_bare_less_than(&markup);
        let mut reader = Reader::from_str(&markup);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;

        let mut document = Document {
            nodes: vec![Node {
                data: NodeData::Document,
                children: Vec::new(),
            }],
        };
        let mut open = vec![document.root()];

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                // An unterminated comment or CDATA section runs to the end of the input
                Err(quick_xml::Error::Syntax(
                    SyntaxError::UnclosedComment | SyntaxError::UnclosedCData,
                )) => {
                    debug!(
                        position = reader.error_position(),
                        "Unterminated comment, ignoring the rest of the markup"
                    );
                    break;
                }
                Err(e) => {
                    return Err(ImportError::ParseError(format!(
                        "Markup error at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
            };

            match event {
                Event::Start(ref e) => {
                    let name = element_name(e.name().as_ref());
                    document.close_implied(&mut open, &name);
                    let parent = current(&open);
                    let is_void = VOID_ELEMENTS.contains(&name.as_str());
                    let id = document.append(
                        parent,
                        NodeData::Element {
                            name,
                            attributes: attributes(e),
                        },
                    );
                    if !is_void {
                        open.push(id);
                    }
                }
                Event::Empty(ref e) => {
                    let name = element_name(e.name().as_ref());
                    document.close_implied(&mut open, &name);
                    let parent = current(&open);
                    document.append(
                        parent,
                        NodeData::Element {
                            name,
                            attributes: attributes(e),
                        },
                    );
                }
                Event::End(ref e) => {
                    let name = element_name(e.name().as_ref());
                    // Close the nearest open element with this name; stray end tags are ignored
                    if let Some(pos) = open
                        .iter()
                        .rposition(|id| document.name(*id) == Some(name.as_str()))
                    {
                        open.truncate(pos);
                    }
                }
                Event::Text(ref e) => {
                    let text = decode_entities(&String::from_utf8_lossy(e.as_ref()));
                    document.append_text(current(&open), text);
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    document.append_text(current(&open), text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(document)
    }

    /// The document node that holds the top-level elements
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Element name, or `None` for text and document nodes
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element { .. })
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// All direct children, text nodes included
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Direct element children in document order
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    /// Replace the entire content of a node with a single text node.
    ///
    /// Used when re-serializing documents; extraction never mutates the tree.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let text_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Text(text.to_string()),
            children: Vec::new(),
        });
        self.nodes[id.0].children = vec![text_id];
    }

    /// Serialize a node and its subtree back to markup
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => out.push_str(text),
            _ => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Document => {
                for child in &node.children {
                    self.write_html(*child, out);
                }
            }
            NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeData::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", key, escape(value.as_str())));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", name));
            }
        }
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn append_text(&mut self, parent: NodeId, text: String) {
        if text.is_empty() {
            return;
        }
        // Merge adjacent text so text_content and set_text see one run
        if let Some(last) = self.nodes[parent.0].children.last().copied()
            && let NodeData::Text(existing) = &mut self.nodes[last.0].data
        {
            existing.push_str(&text);
            return;
        }
        self.append(parent, NodeData::Text(text));
    }

    /// Pop elements that an opening `name` tag implicitly closes.
    ///
    /// The nearest open element named in the closed set is popped together
    /// with everything above it, unless a scope boundary comes first.
    fn close_implied(&self, open: &mut Vec<NodeId>, name: &str) {
        let (closes, boundaries): (&[&str], &[&str]) = match name {
            "li" => (&["li"], &["ul", "ol", "table", "td", "th"]),
            "td" | "th" => (&["td", "th"], &["tr", "table"]),
            "tr" => (&["tr"], &["thead", "tbody", "tfoot", "table"]),
            "thead" | "tbody" | "tfoot" => (&["thead", "tbody", "tfoot"], &["table"]),
            _ if CLOSES_PARAGRAPH.contains(&name) => (&["p"], PARAGRAPH_SCOPE),
            _ => return,
        };
        for pos in (0..open.len()).rev() {
            match self.name(open[pos]) {
                Some(open_name) if closes.contains(&open_name) => {
                    open.truncate(pos);
                    return;
                }
                Some(open_name) if !boundaries.contains(&open_name) => {}
                _ => return,
            }
        }
    }
}

/// Escape each `<` that cannot start a tag, comment or declaration
fn escape_bare_less_than(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut chars = markup.chars().peekable();
    while let Some(c) = chars.next() {
        let starts_markup = chars
            .peek()
            .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?'));
        if c == '<' && !starts_markup {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
    out
}

fn current(open: &[NodeId]) -> NodeId {
    open.last().copied().unwrap_or(NodeId(0))
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_lowercase()
}

fn attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.html_attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
            let value = decode_entities(&String::from_utf8_lossy(&attr.value));
            (key, value)
        })
        .collect()
}

fn named_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        _ => return None,
    };
    Some(value)
}

/// Decode character references, keeping unrecognised ones verbatim
fn decode_entities(raw: &str) -> String {
    if let Ok(text) = unescape_with(raw, named_entity) {
        return text.into_owned();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(end) => {
                let reference = &tail[..=end];
                match unescape_with(reference, named_entity) {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(reference),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(doc: &Document, parent: NodeId) -> NodeId {
        doc.element_children(parent).next().unwrap()
    }

    #[test]
    fn test_void_elements_do_not_nest() {
        let doc = Document::parse("<div><br><img src=a.png><span>x</span></div>").unwrap();
        let div = first_element(&doc, doc.root());
        let names: Vec<&str> = doc
            .element_children(div)
            .map(|id| doc.name(id).unwrap())
            .collect();
        assert_eq!(names, vec!["br", "img", "span"]);
    }

    #[test]
    fn test_unclosed_cells_are_siblings() {
        let doc = Document::parse(
            "<table><tbody><tr><td>a<td>b<tr><td>c</tbody></table>",
        )
        .unwrap();
        let table = first_element(&doc, doc.root());
        let tbody = first_element(&doc, table);
        let rows: Vec<NodeId> = doc.element_children(tbody).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(doc.element_children(rows[0]).count(), 2);
        assert_eq!(doc.element_children(rows[1]).count(), 1);
    }

    #[test]
    fn test_unmatched_end_tag_is_ignored() {
        let doc = Document::parse("<div><p>one</span></p><p>two</p></div>").unwrap();
        let div = first_element(&doc, doc.root());
        assert_eq!(doc.element_children(div).count(), 2);
        assert_eq!(doc.text_content(div), "onetwo");
    }

    #[test]
    fn test_script_content_is_skipped() {
        let doc =
            Document::parse("<body><script>if (a < b) { x(); }</script><p>kept</p></body>")
                .unwrap();
        let body = first_element(&doc, doc.root());
        assert_eq!(doc.text_content(body), "kept");
    }

    #[test]
    fn test_entities_decoded() {
        let doc = Document::parse("<p>Don&rsquo;t &amp; &#8212; &bogus; end</p>").unwrap();
        let p = first_element(&doc, doc.root());
        assert_eq!(doc.text_content(p), "Don\u{2019}t & \u{2014} &bogus; end");
    }

    #[test]
    fn test_set_text_and_serialize() {
        let mut doc = Document::parse("<h2 class=\"x\">A <em>b</em></h2>").unwrap();
        let h2 = first_element(&doc, doc.root());
        assert_eq!(doc.to_html(h2), "<h2 class=\"x\">A <em>b</em></h2>");

        doc.set_text(h2, "A & b");
        assert_eq!(doc.to_html(h2), "<h2 class=\"x\">A &amp; b</h2>");
        assert_eq!(doc.text_content(h2), "A & b");
    }

    #[test]
    fn test_block_start_tags_close_open_paragraph() {
        let doc = Document::parse(
            "<article><h2>Grades</h2><p>The grades dataset.<table><tbody></tbody></table>\
             <p>next<h2>Users</h2><p>a<div>b</div></article>",
        )
        .unwrap();
        let article = first_element(&doc, doc.root());
        let names: Vec<&str> = doc
            .element_children(article)
            .map(|id| doc.name(id).unwrap())
            .collect();
        assert_eq!(names, vec!["h2", "p", "table", "p", "h2", "p", "div"]);
    }

    #[test]
    fn test_paragraph_end_stays_inside_cell() {
        let doc = Document::parse("<p>outer<table><tr><td><p>a<div>b</div></td></tr></table>")
            .unwrap();
        let p = first_element(&doc, doc.root());
        assert_eq!(doc.name(p), Some("p"));
        assert_eq!(doc.text_content(p), "outer");

        let table = doc.element_children(doc.root()).nth(1).unwrap();
        let tr = first_element(&doc, table);
        let td = first_element(&doc, tr);
        let names: Vec<&str> = doc.element_children(td).map(|id| doc.name(id).unwrap()).collect();
        assert_eq!(names, vec!["p", "div"]);
    }

    #[test]
    fn test_new_cell_closes_paragraph_in_previous_cell() {
        let doc = Document::parse("<table><tr><td><p>a<td><p>b<tr><td><p>c</table>").unwrap();
        let table = first_element(&doc, doc.root());
        let rows: Vec<NodeId> = doc.element_children(table).collect();
        assert_eq!(rows.len(), 2);
        let cells: Vec<String> = doc
            .element_children(rows[0])
            .map(|cell| doc.text_content(cell))
            .collect();
        assert_eq!(cells, vec!["a", "b"]);
        assert_eq!(doc.element_children(rows[1]).count(), 1);
    }

    #[test]
    fn test_bare_less_than_is_text() {
        let doc = Document::parse(
            "<tr><td>Must be < 5</td><td>int</td></tr><p>values < 10 or <= 3 <<1</p><p>after</p>",
        )
        .unwrap();
        let children: Vec<NodeId> = doc.element_children(doc.root()).collect();
        assert_eq!(children.len(), 3);
        let cells: Vec<String> = doc
            .element_children(children[0])
            .map(|cell| doc.text_content(cell))
            .collect();
        assert_eq!(cells, vec!["Must be < 5", "int"]);
        assert_eq!(doc.text_content(children[1]), "values < 10 or <= 3 <<1");
        assert_eq!(doc.to_html(children[2]), "<p>after</p>");
    }

    #[test]
    fn test_unterminated_comment_keeps_parsed_tree() {
        let doc = Document::parse("<div><p>kept</p><!-- never closed <p>lost</p>").unwrap();
        let div = first_element(&doc, doc.root());
        assert_eq!(doc.text_content(div), "kept");
        assert_eq!(doc.element_children(div).count(), 1);
    }
}
