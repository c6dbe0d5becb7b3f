//! Data dictionary page importer
//!
//! Turns a module's page into the dataset schemas its allow-list names.

use super::ImportError;
use super::columns::parse_columns;
use super::config::ExtractionConfig;
use super::markup::{Document, NodeId};
use super::segmenter::{DatasetNodes, collect_dataset_nodes, find_main_content};
use super::text::clean;
use crate::models::{DatasetModule, DatasetSchema};
use tracing::{debug, info};

/// Everything extracted from one module page
#[derive(Debug, Clone)]
pub struct ModuleExtraction {
    pub document: Document,
    /// Every dataset group found on the page, listed or not
    pub groups: Vec<DatasetNodes>,
    /// Schemas for the listed datasets, in page order
    pub datasets: Vec<DatasetSchema>,
}

/// Builds dataset schemas from parsed module pages
#[derive(Debug, Clone, Default)]
pub struct DatasetSchemaBuilder {
    config: ExtractionConfig,
}

impl DatasetSchemaBuilder {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Parse page markup and build the module's datasets.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::import::DatasetSchemaBuilder;
    /// use datahub_schema::models::{DatasetModule, DatasetSchemaType};
    ///
    /// let module = DatasetModule {
    ///     name: "Grades".to_string(),
    ///     url: "https://example.com/grades".to_string(),
    ///     dataset_type: DatasetSchemaType::Bds,
    ///     datasets: vec!["Grade Objects".to_string()],
    /// };
    /// let page = r#"<div id="fallbackPageContent"><main><section><div class="mainColumn"><article>
    ///   <h2>Grade Objects</h2><p>About</p><p>Grade items.</p>
    ///   <table><thead><tr><th>Field</th></tr></thead><tbody>
    ///     <tr><td></td><td>GradeObjectId</td><td>Id</td><td>int</td><td>4</td><td>PK</td></tr>
    ///   </tbody></table>
    /// </article></div></section></main></div>"#;
    ///
    /// let extraction = DatasetSchemaBuilder::default().extract(&module, page).unwrap();
    /// let dataset = &extraction.datasets[0];
    /// assert_eq!(dataset.url, "https://example.com/grades#grade-objects");
    /// assert_eq!(dataset.description, "Grade items.");
    /// assert!(dataset.columns[0].is_primary);
    /// ```
    pub fn extract(
        &self,
        module: &DatasetModule,
        markup: &str,
    ) -> Result<ModuleExtraction, ImportError> {
        let document = Document::parse(markup)?;
        let article = find_main_content(&document)?;
        let groups = collect_dataset_nodes(&document, article, &self.config.segmenter);
        debug!(module = %module.name, groups = groups.len(), "Segmented module page");
        let datasets = self.build_datasets(module, &document, &groups)?;
        Ok(ModuleExtraction {
            document,
            groups,
            datasets,
        })
    }

    /// Build the module's datasets from an already parsed page.
    pub fn build(
        &self,
        module: &DatasetModule,
        document: &Document,
    ) -> Result<Vec<DatasetSchema>, ImportError> {
        let article = find_main_content(document)?;
        let groups = collect_dataset_nodes(document, article, &self.config.segmenter);
        self.build_datasets(module, document, &groups)
    }

    /// Build schemas for the groups whose heading the module lists.
    ///
    /// The first dataset that fails aborts the module.
    pub fn build_datasets(
        &self,
        module: &DatasetModule,
        document: &Document,
        groups: &[DatasetNodes],
    ) -> Result<Vec<DatasetSchema>, ImportError> {
        let mut datasets = Vec::new();
        for nodes in groups {
            let name = clean(&document.text_content(nodes.heading));
            if !module.lists(&name) {
                info!(module = %module.name, dataset = %name, "Dataset not listed in module, skipping");
                continue;
            }

            let columns = parse_columns(document, nodes.table, &self.config).map_err(|error| {
                ImportError::InDataset {
                    dataset: name.clone(),
                    error: Box::new(error),
                }
            })?;
            debug!(module = %module.name, dataset = %name, columns = columns.len(), "Built dataset");

            datasets.push(DatasetSchema::new(
                module.dataset_type,
                name.as_str(),
                dataset_url(&module.url, &name),
                self.description(document, &nodes.paragraphs),
                columns,
            ));
        }
        Ok(datasets)
    }

    /// Space-joined cleaned paragraphs, boilerplate labels removed
    fn description(&self, document: &Document, paragraphs: &[NodeId]) -> String {
        paragraphs
            .iter()
            .map(|p| clean(&document.text_content(*p)))
            .filter(|text| !self.config.is_boilerplate(text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Page URL plus a fragment made from the lower-cased name with spaces as hyphens
pub fn dataset_url(page_url: &str, dataset_name: &str) -> String {
    format!(
        "{}#{}",
        page_url,
        dataset_name.to_lowercase().replace(' ', "-")
    )
}

/// Names the module lists that no built dataset carries
pub fn missing_datasets<'a>(module: &'a DatasetModule, datasets: &[DatasetSchema]) -> Vec<&'a str> {
    module
        .datasets
        .iter()
        .filter(|listed| !datasets.iter().any(|d| &d.name == *listed))
        .map(String::as_str)
        .collect()
}
