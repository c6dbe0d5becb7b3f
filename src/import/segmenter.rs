//! Dataset segmentation
//!
//! The main content article is a flat run of `h2`, `p` and `table` siblings.
//! A dataset is a heading, the paragraphs after it and the table that closes it.

use super::ImportError;
use super::config::SegmenterConfig;
use super::markup::{Document, NodeId};
use super::navigator::{find_by_id, find_child_by_name, find_children_by_name};
use super::text::clean;
use tracing::debug;

/// Nodes making up one dataset on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetNodes {
    pub heading: NodeId,
    pub paragraphs: Vec<NodeId>,
    pub table: NodeId,
}

/// Locate `#fallbackPageContent > main > section > div.mainColumn > article`.
pub fn find_main_content(document: &Document) -> Result<NodeId, ImportError> {
    let content = find_by_id(document, "fallbackPageContent")?;
    let main = find_child_by_name(document, content, "main")?;
    let section = find_child_by_name(document, main, "section")?;
    let column = find_children_by_name(document, section, "div")
        .into_iter()
        .find(|div| {
            document
                .attribute(*div, "class")
                .is_some_and(|class| class.contains("mainColumn"))
        })
        .ok_or_else(|| ImportError::NotFound("div.mainColumn".to_string()))?;
    find_child_by_name(document, column, "article")
}

struct OpenGroup {
    heading: NodeId,
    paragraphs: Vec<NodeId>,
}

/// Walk the article's direct children once and group them into datasets.
///
/// - A blocked heading is skipped and leaves any open group untouched.
/// - Another heading while a group is open replaces the heading and keeps
///   the paragraphs collected so far.
/// - Paragraphs outside a group are dropped.
/// - A table closes the open group. With `require_thead`, a table lacking a
///   `thead` leaves the group open instead.
/// - Anything else is ignored.
pub fn collect_dataset_nodes(
    document: &Document,
    article: NodeId,
    config: &SegmenterConfig,
) -> Vec<DatasetNodes> {
    let mut groups = Vec::new();
    let mut open: Option<OpenGroup> = None;

    for child in document.element_children(article) {
        match document.name(child) {
            Some("h2") => {
                let heading = clean(&document.text_content(child));
                if config.is_blocked(&heading) {
                    debug!(heading = %heading, "Skipping blocked heading");
                    continue;
                }
                match open.as_mut() {
                    Some(group) => group.heading = child,
                    None => {
                        open = Some(OpenGroup {
                            heading: child,
                            paragraphs: Vec::new(),
                        })
                    }
                }
            }
            Some("p") => {
                if let Some(group) = open.as_mut() {
                    group.paragraphs.push(child);
                }
            }
            Some("table") => {
                let has_thead = find_child_by_name(document, child, "thead").is_ok();
                match open.take() {
                    Some(group) if has_thead || !config.require_thead => {
                        groups.push(DatasetNodes {
                            heading: group.heading,
                            paragraphs: group.paragraphs,
                            table: child,
                        });
                    }
                    Some(group) => {
                        debug!("Table without thead does not close the open dataset");
                        open = Some(group);
                    }
                    None => debug!("Ignoring table outside a dataset"),
                }
            }
            _ => {}
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(body: &str) -> (Document, NodeId) {
        let doc = Document::parse(&format!("<article>{}</article>", body)).unwrap();
        let article = doc.element_children(doc.root()).next().unwrap();
        (doc, article)
    }

    const TABLE: &str = "<table><thead><tr><th>Field</th></tr></thead><tbody></tbody></table>";

    fn headings(doc: &Document, groups: &[DatasetNodes]) -> Vec<String> {
        groups
            .iter()
            .map(|g| doc.text_content(g.heading))
            .collect()
    }

    #[test]
    fn test_groups_heading_paragraphs_and_table() {
        let (doc, a) = article(&format!(
            "<p>intro</p><h2>Grades</h2><p>About</p><p>desc</p>{t}<h2>Users</h2>{t}",
            t = TABLE
        ));
        let groups = collect_dataset_nodes(&doc, a, &SegmenterConfig::default());

        assert_eq!(headings(&doc, &groups), vec!["Grades", "Users"]);
        assert_eq!(groups[0].paragraphs.len(), 2);
        assert!(groups[1].paragraphs.is_empty());
    }

    #[test]
    fn test_blocked_heading_produces_no_group() {
        let (doc, a) = article(&format!("<h2>Sample join</h2><p>x</p>{}", TABLE));
        assert!(collect_dataset_nodes(&doc, a, &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn test_later_heading_replaces_open_heading() {
        let (doc, a) = article(&format!("<h2>First</h2><p>kept</p><h2>Second</h2>{}", TABLE));
        let groups = collect_dataset_nodes(&doc, a, &SegmenterConfig::default());

        assert_eq!(headings(&doc, &groups), vec!["Second"]);
        assert_eq!(groups[0].paragraphs.len(), 1);
    }

    #[test]
    fn test_table_without_thead_keeps_group_open() {
        let (doc, a) = article(&format!(
            "<h2>Grades</h2><table><tbody></tbody></table><p>more</p>{}",
            TABLE
        ));
        let groups = collect_dataset_nodes(&doc, a, &SegmenterConfig::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paragraphs.len(), 1);
        assert_eq!(doc.element_children(groups[0].table).count(), 2);

        let lenient = SegmenterConfig {
            require_thead: false,
            ..SegmenterConfig::default()
        };
        let groups = collect_dataset_nodes(&doc, a, &lenient);
        assert_eq!(groups.len(), 1);
        assert_eq!(doc.element_children(groups[0].table).count(), 1);
    }

    #[test]
    fn test_orphan_table_is_ignored() {
        let (doc, a) = article(&format!("{}<h2>Grades</h2>", TABLE));
        assert!(collect_dataset_nodes(&doc, a, &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn test_find_main_content() {
        let doc = Document::parse(
            "<html><body><div id=\"fallbackPageContent\"><main><section>\
             <div class=\"sidebar\"></div><div class=\"col mainColumn\"><article><h2>x</h2></article></div>\
             </section></main></div></body></html>",
        )
        .unwrap();
        let article = find_main_content(&doc).unwrap();
        assert_eq!(doc.name(article), Some("article"));
        assert_eq!(doc.text_content(article), "x");
    }

    #[test]
    fn test_find_main_content_missing() {
        let doc = Document::parse("<div id=\"fallbackPageContent\"><main></main></div>").unwrap();
        assert_eq!(
            find_main_content(&doc),
            Err(ImportError::NotFound("section".to_string()))
        );
        let doc = Document::parse("<div></div>").unwrap();
        assert_eq!(
            find_main_content(&doc),
            Err(ImportError::NotFound("#fallbackPageContent".to_string()))
        );
    }
}
