//! HTML exporter for module pages.
//!
//! Two outputs share the page skeleton the importer expects
//! (`#fallbackPageContent > main > section > div.mainColumn > article`):
//! a page regenerated from dataset schemas, and the downloaded page reduced to
//! its dataset nodes.

use crate::import::navigator::{find_child_by_name, find_children_by_name};
use crate::import::{DatasetNodes, Document, NodeId, clean_node};
use crate::models::{ColumnSchema, DatasetSchema};
use quick_xml::escape::escape;

const PAGE_HEAD: &[&str] = &[
    "<!DOCTYPE html>",
    "<html lang=\"en\">",
    "<body>",
    "<div id=\"fallbackPageContent\">",
    "<main>",
    "<section>",
    "<div class=\"mainColumn\">",
    "<article>",
];

const PAGE_TAIL: &[&str] = &[
    "</article>",
    "</div>",
    "</section>",
    "</main>",
    "</div>",
    "</body>",
    "</html>",
];

const COLUMN_HEADERS: &[&str] = &[
    "Version History",
    "Field",
    "Description",
    "Type",
    "Column Size",
    "Key",
];

const NULLABLE_NOTE: &str = "Field can be null.";

/// Exporter for canonical module pages.
pub struct ModuleHtmlExporter;

impl ModuleHtmlExporter {
    /// Render datasets as a module page.
    ///
    /// Every dataset becomes an `h2`, a description paragraph and a six
    /// column table, so importing the page again yields the same datasets.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::export::ModuleHtmlExporter;
    /// use datahub_schema::models::{ColumnSchema, ColumnSchemaType, DatasetSchema, DatasetSchemaType};
    ///
    /// let dataset = DatasetSchema::new(
    ///     DatasetSchemaType::Bds,
    ///     "Users",
    ///     "https://example.com/users#users",
    ///     "All users",
    ///     vec![ColumnSchema::new("UserId", ColumnSchemaType::Int).primary()],
    /// );
    /// let html = ModuleHtmlExporter::export(&[dataset]);
    /// assert!(html.contains("<h2>Users</h2>"));
    /// assert!(html.contains("<td>PK</td>"));
    /// ```
    pub fn export(datasets: &[DatasetSchema]) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.extend(Self::indent_skeleton(PAGE_HEAD, 0));
        for dataset in datasets {
            lines.extend(
                Self::dataset_lines(dataset)
                    .into_iter()
                    .map(|line| format!("{}{}", "  ".repeat(6), line)),
            );
        }
        lines.extend(Self::indent_skeleton(PAGE_TAIL, PAGE_HEAD.len() - 3));
        lines.join("\n")
    }

    /// Indent skeleton lines below `<body>` one level per nesting step
    fn indent_skeleton(lines: &[&str], first_depth: usize) -> Vec<String> {
        let closing = lines.first().is_some_and(|line| line.starts_with("</"));
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let depth = if closing {
                    first_depth.saturating_sub(i)
                } else {
                    i.saturating_sub(2)
                };
                format!("{}{}", "  ".repeat(depth), line)
            })
            .collect()
    }

    fn dataset_lines(dataset: &DatasetSchema) -> Vec<String> {
        let mut lines = vec![
            format!("<h2>{}</h2>", escape(dataset.name.as_str())),
            format!("<p>{}</p>", escape(dataset.description.as_str())),
            "<table>".to_string(),
            "  <thead>".to_string(),
            "    <tr>".to_string(),
        ];
        lines.extend(
            COLUMN_HEADERS
                .iter()
                .map(|header| format!("      <th>{}</th>", header)),
        );
        lines.push("    </tr>".to_string());
        lines.push("  </thead>".to_string());
        lines.push("  <tbody>".to_string());
        for column in &dataset.columns {
            lines.extend(Self::column_lines(column));
        }
        lines.push("  </tbody>".to_string());
        lines.push("</table>".to_string());
        lines
    }

    fn column_lines(column: &ColumnSchema) -> Vec<String> {
        let cells = [
            column.version_history.clone(),
            column.name.clone(),
            Self::column_description(column),
            column.column_type.to_string(),
            column.size.clone(),
            column.key_text(),
        ];
        let mut lines = vec!["    <tr>".to_string()];
        lines.extend(
            cells
                .iter()
                .map(|cell| format!("      <td>{}</td>", escape(cell.as_str()))),
        );
        lines.push("    </tr>".to_string());
        lines
    }

    /// Description with the nullability note appended when not already present
    pub fn column_description(column: &ColumnSchema) -> String {
        let mentioned = column.description.to_lowercase().contains("field can be null");
        if !column.can_be_null || mentioned {
            return column.description.clone();
        }
        if column.description.is_empty() {
            NULLABLE_NOTE.to_string()
        } else {
            format!("{} {}", column.description, NULLABLE_NOTE)
        }
    }
}

/// Reduce a downloaded page to the dataset groups found on it.
///
/// The heading, paragraphs and table cells of each group are rewritten to
/// their normalized text, then serialized inside the page skeleton. Lines are
/// joined with CRLF.
pub fn minify_document(document: &mut Document, groups: &[DatasetNodes]) -> String {
    let mut contents = Vec::new();
    for group in groups {
        clean_node(document, group.heading);
        contents.push(document.to_html(group.heading));
        for paragraph in &group.paragraphs {
            clean_node(document, *paragraph);
            contents.push(document.to_html(*paragraph));
        }
        normalize_table(document, group.table);
        contents.push(document.to_html(group.table));
    }

    PAGE_HEAD
        .iter()
        .map(|line| line.to_string())
        .chain(contents)
        .chain(PAGE_TAIL.iter().map(|line| line.to_string()))
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Normalize each body cell the way the column parser reads it
fn normalize_table(document: &mut Document, table: NodeId) {
    let Ok(tbody) = find_child_by_name(document, table, "tbody") else {
        return;
    };
    for row in find_children_by_name(document, tbody, "tr") {
        for cell in find_children_by_name(document, row, "td") {
            let paragraphs = find_children_by_name(document, cell, "p");
            if paragraphs.is_empty() {
                clean_node(document, cell);
            } else {
                for paragraph in paragraphs {
                    clean_node(document, paragraph);
                }
            }
        }
    }
}
