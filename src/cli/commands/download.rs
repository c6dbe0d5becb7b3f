//! Download command implementation

use super::BatchSummary;
use crate::cli::error::CliError;
use crate::download::ModuleDownloader;
use crate::export::{ModuleHtmlExporter, minify_document};
use crate::import::{DatasetSchemaBuilder, missing_datasets};
use crate::models::DatasetModule;
use crate::repository::SchemaRepository;
use crate::storage::StorageBackend;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    /// Drop cached pages and stored datasets first
    pub force: bool,
    /// Cache the reduced downloaded page instead of a regenerated one
    pub keep_markup: bool,
}

/// Handle the download command
pub async fn handle_download<B: StorageBackend>(
    repository: &SchemaRepository<B>,
    downloader: &ModuleDownloader,
    builder: &DatasetSchemaBuilder,
    options: DownloadOptions,
) -> Result<BatchSummary, CliError> {
    if options.force {
        repository.purge_modules().await?;
        repository.purge_datasets().await?;
    }

    let modules = repository.load_modules().await?;
    let mut summary = BatchSummary::default();
    for module in modules.modules() {
        match process_module(repository, downloader, builder, module, options).await {
            Ok(stored) => {
                info!(module = %module.name, datasets = stored, "Processed module");
                summary.succeeded += 1;
            }
            Err(e) => {
                error!(module = %module.name, error = %e, "Error downloading module");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

async fn process_module<B: StorageBackend>(
    repository: &SchemaRepository<B>,
    downloader: &ModuleDownloader,
    builder: &DatasetSchemaBuilder,
    module: &DatasetModule,
    options: DownloadOptions,
) -> Result<usize, CliError> {
    let (contents, new_module) = match repository.fetch_module_contents(module).await? {
        Some(contents) => (contents, false),
        None => {
            let bytes = downloader.download(&module.url).await?;
            (String::from_utf8_lossy(&bytes).into_owned(), true)
        }
    };

    let mut extraction = builder.extract(module, &contents)?;

    if new_module {
        let page = if options.keep_markup {
            minify_document(&mut extraction.document, &extraction.groups)
        } else {
            let page = ModuleHtmlExporter::export(&extraction.datasets);
            // Datasets are stored as the cached page yields them
            extraction = builder.extract(module, &page)?;
            page
        };
        repository.store_module_contents(module, &page).await?;
    }

    for name in missing_datasets(module, &extraction.datasets) {
        warn!(module = %module.name, dataset = %name, "Dataset is listed in module but not found in output");
    }

    for dataset in &extraction.datasets {
        repository.store_dataset(dataset).await?;
    }
    Ok(extraction.datasets.len())
}
