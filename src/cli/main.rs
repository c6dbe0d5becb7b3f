//! datahub-schema command line
//!
//! Downloads data dictionary module pages into dataset schemas and generates
//! SQL table scripts from them.

use clap::{Parser, Subcommand};
use datahub_schema::cli::commands::download::{DownloadOptions, handle_download};
use datahub_schema::cli::commands::generate_sql::handle_generate_sql;
use datahub_schema::cli::load_config;
use datahub_schema::download::ModuleDownloader;
use datahub_schema::export::SQLDialect;
use datahub_schema::import::DatasetSchemaBuilder;
use datahub_schema::models::DatasetSchemaType;
use datahub_schema::repository::SchemaRepository;
use datahub_schema::storage::FileSystemStorageBackend;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "datahub-schema",
    version,
    about = "Data dictionary schema extractor and SQL table generator"
)]
struct Cli {
    /// Schema directory holding modules, datasets and tables
    #[arg(long, env = "DATAHUB_SCHEMA_DIR", default_value = "schema", global = true)]
    schema_dir: PathBuf,

    /// Extraction config (TOML); defaults apply without it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download module pages and store their dataset schemas
    Download {
        /// Purge cached module pages and datasets before downloading
        #[arg(short, long)]
        force: bool,
        /// Cache the reduced downloaded page rather than a regenerated one
        #[arg(long)]
        keep_markup: bool,
    },
    /// Generate table and staging table scripts for every mapped dataset
    GenerateSql {
        /// SQL type: mysql or oracle
        sql_type: SQLDialect,
        /// Dataset type: ADS or BDS
        dataset_type: DatasetSchemaType,
        /// Purge generated scripts before generation
        #[arg(short, long)]
        purge: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let repository = SchemaRepository::new(FileSystemStorageBackend::new(&cli.schema_dir));

    let summary = match cli.command {
        Commands::Download { force, keep_markup } => {
            let builder = DatasetSchemaBuilder::new(load_config(cli.config.as_deref())?);
            handle_download(
                &repository,
                &ModuleDownloader::new(),
                &builder,
                DownloadOptions { force, keep_markup },
            )
            .await?
        }
        Commands::GenerateSql {
            sql_type,
            dataset_type,
            purge,
        } => handle_generate_sql(&repository, sql_type, dataset_type, purge).await?,
    };

    info!(%summary, "Done");
    Ok(())
}
