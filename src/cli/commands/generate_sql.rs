//! Generate SQL command implementation

use super::BatchSummary;
use crate::cli::error::CliError;
use crate::export::{SQLDialect, SQLTableGenerator};
use crate::models::DatasetSchemaType;
use crate::repository::SchemaRepository;
use crate::storage::StorageBackend;
use tracing::{error, info};

/// Name suffix of the staging table generated next to each table
pub const LOAD_TABLE_SUFFIX: &str = "_LOAD";

/// Handle the generate-sql command
pub async fn handle_generate_sql<B: StorageBackend>(
    repository: &SchemaRepository<B>,
    dialect: SQLDialect,
    dataset_type: DatasetSchemaType,
    purge: bool,
) -> Result<BatchSummary, CliError> {
    if purge {
        repository.purge_tables(dialect).await?;
    }

    let table_map = repository.load_table_map(dialect).await?;
    let generator = dialect.generator();
    let mut summary = BatchSummary::default();
    for (dataset_name, table_name) in &table_map {
        match generate_tables(
            repository,
            generator.as_ref(),
            dataset_type,
            dataset_name,
            table_name,
        )
        .await
        {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                error!(dataset = %dataset_name, table = %table_name, error = %e, "Error generating SQL table");
                summary.failed += 1;
            }
        }
    }
    info!(dialect = %dialect, dataset_type = %dataset_type, %summary, "Generated SQL tables");
    Ok(summary)
}

async fn generate_tables<B: StorageBackend>(
    repository: &SchemaRepository<B>,
    generator: &dyn SQLTableGenerator,
    dataset_type: DatasetSchemaType,
    dataset_name: &str,
    table_name: &str,
) -> Result<(), CliError> {
    let dataset = repository.fetch_dataset(dataset_type, dataset_name).await?;
    let dialect = generator.dialect();

    repository
        .store_table_sql(dialect, table_name, &generator.generate_table(&dataset, table_name))
        .await?;

    let load_table = format!("{}{}", table_name, LOAD_TABLE_SUFFIX);
    repository
        .store_table_sql(dialect, &load_table, &generator.generate_table(&dataset, &load_table))
        .await?;
    Ok(())
}
