//! Tree navigation helpers
//!
//! Only the id lookup searches the whole document; the name lookups look at
//! direct children only.

use super::ImportError;
use super::markup::{Document, NodeId};

/// Find the first element (in document order) whose `id` attribute matches.
pub fn find_by_id(document: &Document, id: &str) -> Result<NodeId, ImportError> {
    let mut pending = vec![document.root()];
    while let Some(node) = pending.pop() {
        if document.attribute(node, "id") == Some(id) {
            return Ok(node);
        }
        // Reverse so the first child is visited first
        pending.extend(document.children(node).iter().rev().copied());
    }
    Err(ImportError::NotFound(format!("#{}", id)))
}

/// First direct child element with the given tag name.
pub fn find_child_by_name(
    document: &Document,
    node: NodeId,
    name: &str,
) -> Result<NodeId, ImportError> {
    document
        .element_children(node)
        .find(|child| document.name(*child) == Some(name))
        .ok_or_else(|| ImportError::NotFound(name.to_string()))
}

/// All direct child elements with the given tag name, possibly none.
pub fn find_children_by_name(document: &Document, node: NodeId, name: &str) -> Vec<NodeId> {
    document
        .element_children(node)
        .filter(|child| document.name(*child) == Some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = r#"
        <html><body>
          <div id="outer">
            <section><p id="deep">deep</p></section>
            <p>one</p><span>skip</span><p>two</p>
          </div>
          <p id="deep">second</p>
        </body></html>"#;

    #[test]
    fn test_find_by_id_is_document_wide_and_first_wins() {
        let doc = Document::parse(MARKUP).unwrap();
        let node = find_by_id(&doc, "deep").unwrap();
        assert_eq!(doc.text_content(node), "deep");
    }

    #[test]
    fn test_find_by_id_not_found() {
        let doc = Document::parse(MARKUP).unwrap();
        assert_eq!(
            find_by_id(&doc, "missing"),
            Err(ImportError::NotFound("#missing".to_string()))
        );
    }

    #[test]
    fn test_children_by_name_are_direct_only() {
        let doc = Document::parse(MARKUP).unwrap();
        let outer = find_by_id(&doc, "outer").unwrap();
        let paragraphs = find_children_by_name(&doc, outer, "p");
        let texts: Vec<String> = paragraphs.iter().map(|p| doc.text_content(*p)).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(find_children_by_name(&doc, outer, "table").is_empty());
    }

    #[test]
    fn test_child_by_name() {
        let doc = Document::parse(MARKUP).unwrap();
        let outer = find_by_id(&doc, "outer").unwrap();
        assert!(find_child_by_name(&doc, outer, "section").is_ok());
        assert_eq!(
            find_child_by_name(&doc, outer, "article"),
            Err(ImportError::NotFound("article".to_string()))
        );
    }
}
