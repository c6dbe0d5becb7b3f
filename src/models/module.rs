//! Module descriptors loaded from `modules.json`

use super::dataset::{DatasetSchemaType, simple_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error decoding module or table-name mapping documents
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Invalid module document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Duplicate module: {0}")]
    DuplicateModule(String),
    #[error("Invalid module: {0}")]
    UnknownModule(String),
}

/// A named group of datasets documented on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetModule {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub dataset_type: DatasetSchemaType,
    /// Allow-list of dataset headings to extract from the page
    pub datasets: Vec<String>,
}

impl DatasetModule {
    pub fn simple_name(&self) -> String {
        simple_name(&self.name)
    }

    pub fn lists(&self, dataset_name: &str) -> bool {
        self.datasets.iter().any(|d| d == dataset_name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ModuleListDocument {
    version: String,
    data_set_version: String,
    modules: Vec<DatasetModule>,
}

/// Modules keyed and ordered by simple name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleList {
    pub version: String,
    pub data_set_version: String,
    modules: BTreeMap<String, DatasetModule>,
}

impl ModuleList {
    /// Decode a `modules.json` document.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::models::ModuleList;
    ///
    /// let json = r#"{
    ///     "version": "1",
    ///     "dataSetVersion": "2024.1",
    ///     "modules": [
    ///         {"name": "Grades", "url": "https://example.com/grades", "datasets": ["Grade Objects"]}
    ///     ]
    /// }"#;
    /// let list = ModuleList::from_json(json.as_bytes()).unwrap();
    /// assert!(list.module("GRADES").is_ok());
    /// ```
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModuleError> {
        let document: ModuleListDocument = serde_json::from_slice(bytes)?;
        let mut modules = BTreeMap::new();
        for module in document.modules {
            let key = module.simple_name();
            if modules.contains_key(&key) {
                return Err(ModuleError::DuplicateModule(module.name));
            }
            modules.insert(key, module);
        }
        Ok(Self {
            version: document.version,
            data_set_version: document.data_set_version,
            modules,
        })
    }

    /// Modules in simple-name order.
    pub fn modules(&self) -> impl Iterator<Item = &DatasetModule> {
        self.modules.values()
    }

    /// Look up a module by its simple name.
    pub fn module(&self, simple_name: &str) -> Result<&DatasetModule, ModuleError> {
        self.modules
            .get(simple_name)
            .ok_or_else(|| ModuleError::UnknownModule(simple_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Dataset name to base table name mapping for one SQL dialect.
pub type TableMap = BTreeMap<String, String>;

/// Decode a `table_map.json` document; every value must be a string.
pub fn table_map_from_json(bytes: &[u8]) -> Result<TableMap, ModuleError> {
    Ok(serde_json::from_slice(bytes)?)
}
