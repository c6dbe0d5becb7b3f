//! Schema repository
//!
//! Layout of the schema directory over a [`StorageBackend`]:
//!
//! ```text
//! modules/modules.json                  module list
//! modules/<MODULE>.html                 cached module page
//! datasets/<ADS|BDS>/<DATASET>.json     dataset schema
//! tables/<mysql|oracle>/table_map.json  dataset name -> table name
//! tables/<mysql|oracle>/<TABLE>.sql     generated DDL
//! ```

use crate::export::SQLDialect;
use crate::models::{
    DatasetModule, DatasetSchema, DatasetSchemaType, ModuleError, ModuleList, TableMap,
    simple_name, table_map_from_json,
};
use crate::storage::{StorageBackend, StorageError};
use tracing::{debug, info};

const MODULES_DIR: &str = "modules";
const MODULE_LIST_FILE: &str = "modules/modules.json";
const DATASETS_DIR: &str = "datasets";
const TABLES_DIR: &str = "tables";
const TABLE_MAP_FILE: &str = "table_map.json";

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Dataset not found: {dataset_type}/{name}")]
    DatasetNotFound {
        dataset_type: DatasetSchemaType,
        name: String,
    },
}

/// Reads and writes schema artifacts through a storage backend
pub struct SchemaRepository<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> SchemaRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn module_contents_path(module: &DatasetModule) -> String {
        format!("{}/{}.html", MODULES_DIR, module.simple_name())
    }

    pub fn dataset_path(dataset_type: DatasetSchemaType, name: &str) -> String {
        format!("{}/{}/{}.json", DATASETS_DIR, dataset_type, simple_name(name))
    }

    pub fn table_sql_path(dialect: SQLDialect, table_name: &str) -> String {
        format!("{}/{}/{}.sql", TABLES_DIR, dialect, table_name)
    }

    /// Load and decode `modules/modules.json`
    pub async fn load_modules(&self) -> Result<ModuleList, RepositoryError> {
        let bytes = self.backend.read_file(MODULE_LIST_FILE).await?;
        let modules = ModuleList::from_json(&bytes)?;
        debug!(modules = modules.len(), "Loaded module list");
        Ok(modules)
    }

    /// Cached page of a module, `None` when it has not been downloaded yet
    pub async fn fetch_module_contents(
        &self,
        module: &DatasetModule,
    ) -> Result<Option<String>, RepositoryError> {
        match self.backend.read_file(&Self::module_contents_path(module)).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(StorageError::FileNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn store_module_contents(
        &self,
        module: &DatasetModule,
        contents: &str,
    ) -> Result<(), RepositoryError> {
        self.backend
            .write_file(&Self::module_contents_path(module), contents.as_bytes())
            .await?;
        Ok(())
    }

    /// Store a dataset as pretty-printed JSON, replacing any previous version
    pub async fn store_dataset(&self, dataset: &DatasetSchema) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(dataset)?;
        let path = Self::dataset_path(dataset.dataset_type, &dataset.name);
        self.backend.write_file(&path, json.as_bytes()).await?;
        debug!(dataset = %dataset.name, path = %path, "Stored dataset");
        Ok(())
    }

    pub async fn fetch_dataset(
        &self,
        dataset_type: DatasetSchemaType,
        name: &str,
    ) -> Result<DatasetSchema, RepositoryError> {
        let bytes = match self
            .backend
            .read_file(&Self::dataset_path(dataset_type, name))
            .await
        {
            Ok(bytes) => bytes,
            Err(StorageError::FileNotFound(_)) => {
                return Err(RepositoryError::DatasetNotFound {
                    dataset_type,
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Dataset name to table name mapping of a dialect
    pub async fn load_table_map(&self, dialect: SQLDialect) -> Result<TableMap, RepositoryError> {
        let path = format!("{}/{}/{}", TABLES_DIR, dialect, TABLE_MAP_FILE);
        let bytes = self.backend.read_file(&path).await?;
        Ok(table_map_from_json(&bytes)?)
    }

    pub async fn store_table_sql(
        &self,
        dialect: SQLDialect,
        table_name: &str,
        sql: &str,
    ) -> Result<(), RepositoryError> {
        self.backend
            .write_file(&Self::table_sql_path(dialect, table_name), sql.as_bytes())
            .await?;
        Ok(())
    }

    /// Delete the generated `.sql` files of a dialect, keeping its table map
    pub async fn purge_tables(&self, dialect: SQLDialect) -> Result<usize, RepositoryError> {
        self.purge(&format!("{}/{}", TABLES_DIR, dialect), ".sql")
            .await
    }

    /// Delete cached module pages, keeping the module list
    pub async fn purge_modules(&self) -> Result<usize, RepositoryError> {
        self.purge(MODULES_DIR, ".html").await
    }

    /// Delete stored datasets of every type
    pub async fn purge_datasets(&self) -> Result<usize, RepositoryError> {
        let mut deleted = 0;
        for dataset_type in [DatasetSchemaType::Ads, DatasetSchemaType::Bds] {
            deleted += self
                .purge(&format!("{}/{}", DATASETS_DIR, dataset_type), ".json")
                .await?;
        }
        Ok(deleted)
    }

    async fn purge(&self, dir: &str, extension: &str) -> Result<usize, RepositoryError> {
        let files = match self.backend.list_files(dir).await {
            Ok(files) => files,
            Err(StorageError::DirectoryNotFound(_)) => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut deleted = 0;
        for file in files.iter().filter(|f| f.ends_with(extension)) {
            self.backend.delete_file(&format!("{}/{}", dir, file)).await?;
            deleted += 1;
        }
        info!(dir = %dir, deleted, "Purged files");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let module = DatasetModule {
            name: "Grade Book".to_string(),
            url: String::new(),
            dataset_type: DatasetSchemaType::Bds,
            datasets: vec![],
        };
        assert_eq!(
            SchemaRepository::<crate::storage::MemoryStorageBackend>::module_contents_path(&module),
            "modules/GRADE_BOOK.html"
        );
        assert_eq!(
            SchemaRepository::<crate::storage::MemoryStorageBackend>::dataset_path(
                DatasetSchemaType::Ads,
                "All Grades"
            ),
            "datasets/ADS/ALL_GRADES.json"
        );
        assert_eq!(
            SchemaRepository::<crate::storage::MemoryStorageBackend>::table_sql_path(
                SQLDialect::Oracle,
                "D2L_GRADES_LOAD"
            ),
            "tables/oracle/D2L_GRADES_LOAD.sql"
        );
    }
}
