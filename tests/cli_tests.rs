//! CLI command tests

#[cfg(feature = "cli")]
mod command_tests {
    use datahub_schema::cli::commands::BatchSummary;
    use datahub_schema::cli::commands::download::{DownloadOptions, handle_download};
    use datahub_schema::cli::commands::generate_sql::handle_generate_sql;
    use datahub_schema::cli::load_config;
    use datahub_schema::download::ModuleDownloader;
    use datahub_schema::export::SQLDialect;
    use datahub_schema::import::DatasetSchemaBuilder;
    use datahub_schema::models::DatasetSchemaType;
    use datahub_schema::repository::SchemaRepository;
    use datahub_schema::storage::{MemoryStorageBackend, StorageBackend};
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const MODULES_JSON: &str = r#"{
        "version": "1",
        "dataSetVersion": "2024.10",
        "modules": [
            {"name": "Grades", "url": "https://docs.example.com/grades", "datasets": ["Grade Objects", "Grade Categories"]},
            {"name": "Broken", "url": "https://docs.example.com/broken", "datasets": ["Anything"]}
        ]
    }"#;

    const GRADES_PAGE: &str = r#"<html><body><div id="fallbackPageContent"><main><section>
        <div class="mainColumn"><article>
          <h2>Grade Objects</h2>
          <p>About</p>
          <p>Grade items</p>
          <table>
            <thead><tr><th>Version History</th><th>Field</th><th>Description</th><th>Type</th><th>Column Size</th><th>Key</th></tr></thead>
            <tbody>
              <tr><td></td><td>GradeObjectId</td><td>Id</td><td>int</td><td>4</td><td>PK</td></tr>
              <tr><td></td><td>Name</td><td>Name</td><td>nvarchar</td><td>128</td><td></td></tr>
            </tbody>
          </table>
        </article></div>
    </section></main></div></body></html>"#;

    async fn repository() -> SchemaRepository<MemoryStorageBackend> {
        let backend = MemoryStorageBackend::new();
        backend
            .write_file("modules/modules.json", MODULES_JSON.as_bytes())
            .await
            .unwrap();
        backend
            .write_file("modules/GRADES.html", GRADES_PAGE.as_bytes())
            .await
            .unwrap();
        // Cached page without the main content column
        backend
            .write_file("modules/BROKEN.html", b"<html><body></body></html>")
            .await
            .unwrap();
        SchemaRepository::new(backend)
    }

    async fn download(repo: &SchemaRepository<MemoryStorageBackend>) -> BatchSummary {
        handle_download(
            repo,
            &ModuleDownloader::new(),
            &DatasetSchemaBuilder::default(),
            DownloadOptions::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_download_from_cached_pages() {
        let repo = repository().await;
        let summary = download(&repo).await;

        assert_eq!(
            summary,
            BatchSummary {
                succeeded: 1,
                failed: 1
            }
        );
        let dataset = repo
            .fetch_dataset(DatasetSchemaType::Bds, "Grade Objects")
            .await
            .unwrap();
        assert_eq!(dataset.description, "Grade items");
        assert_eq!(dataset.columns.len(), 2);

        // Cached pages are reused as they are
        assert_eq!(
            repo.backend().read_file("modules/GRADES.html").await.unwrap(),
            GRADES_PAGE.as_bytes()
        );
    }

    const USERS_PAGE: &str = r#"<html><body><div id="fallbackPageContent"><main><section>
        <div class="mainColumn"><article>
          <h2>Users</h2>
          <p>Users of the org.</p>
          <table>
            <thead><tr><th>Version History</th><th>Field</th><th>Description</th><th>Can Be Null</th></tr></thead>
            <tbody>
              <tr><td></td><td>UserId</td><td>User id</td><td>No</td></tr>
              <tr><td></td><td>Email</td><td>Email</td><td>Yes</td></tr>
            </tbody>
          </table>
        </article></div>
    </section></main></div></body></html>"#;

    /// Answer a single HTTP request with `body` and return the page URL
    async fn serve_once(body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{}/data-hub/accounts", address)
    }

    #[tokio::test]
    async fn test_downloaded_module_is_stable_across_runs() {
        let url = serve_once(USERS_PAGE).await;
        let backend = MemoryStorageBackend::new();
        let modules = format!(
            r#"{{"version": "1", "dataSetVersion": "2024.10", "modules": [
                {{"name": "Accounts", "url": "{}", "type": "ADS", "datasets": ["Users"]}}
            ]}}"#,
            url
        );
        backend
            .write_file("modules/modules.json", modules.as_bytes())
            .await
            .unwrap();
        let repo = SchemaRepository::new(backend);

        let summary = download(&repo).await;
        assert_eq!(summary.succeeded, 1);
        assert!(
            repo.backend()
                .file_exists("modules/ACCOUNTS.html")
                .await
                .unwrap()
        );
        let first = repo
            .backend()
            .read_file("datasets/ADS/USERS.json")
            .await
            .unwrap();

        let users = repo
            .fetch_dataset(DatasetSchemaType::Ads, "Users")
            .await
            .unwrap();
        assert_eq!(users.columns[0].description, "User id");
        assert!(!users.columns[0].can_be_null);
        assert_eq!(users.columns[1].description, "Email Field can be null.");
        assert!(users.columns[1].can_be_null);

        // Second run reads the cached page
        let summary = download(&repo).await;
        assert_eq!(summary.succeeded, 1);
        let second = repo
            .backend()
            .read_file("datasets/ADS/USERS.json")
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_generate_sql_counts_missing_datasets() {
        let repo = repository().await;
        download(&repo).await;
        repo.backend()
            .write_file(
                "tables/oracle/table_map.json",
                br#"{"Grade Objects": "D2L_GRADE_OBJECTS", "Grade Categories": "D2L_GRADE_CATEGORIES"}"#,
            )
            .await
            .unwrap();

        let summary =
            handle_generate_sql(&repo, SQLDialect::Oracle, DatasetSchemaType::Bds, false)
                .await
                .unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        let table = repo
            .backend()
            .read_file("tables/oracle/D2L_GRADE_OBJECTS.sql")
            .await
            .unwrap();
        let table = String::from_utf8(table).unwrap();
        assert!(table.starts_with("DROP TABLE D2L_GRADE_OBJECTS;"));

        let load_table = repo
            .backend()
            .read_file("tables/oracle/D2L_GRADE_OBJECTS_LOAD.sql")
            .await
            .unwrap();
        let load_table = String::from_utf8(load_table).unwrap();
        assert!(load_table.contains("CREATE UNIQUE INDEX D2L_GRADE_OBJECTS_LOAD_PK"));
        assert!(
            !repo
                .backend()
                .file_exists("tables/oracle/D2L_GRADE_CATEGORIES.sql")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_generate_sql_purge() {
        let repo = repository().await;
        repo.backend()
            .write_file("tables/mysql/table_map.json", b"{}")
            .await
            .unwrap();
        repo.backend()
            .write_file("tables/mysql/STALE.sql", b"--")
            .await
            .unwrap();

        let summary = handle_generate_sql(&repo, SQLDialect::MySQL, DatasetSchemaType::Bds, true)
            .await
            .unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert!(
            !repo
                .backend()
                .file_exists("tables/mysql/STALE.sql")
                .await
                .unwrap()
        );
        assert!(
            repo.backend()
                .file_exists("tables/mysql/table_map.json")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_table_map_fails_command() {
        let repo = repository().await;
        assert!(
            handle_generate_sql(&repo, SQLDialect::MySQL, DatasetSchemaType::Ads, false)
                .await
                .is_err()
        );
    }

    #[test]
    fn test_load_config() {
        assert_eq!(load_config(None).unwrap(), Default::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "boilerplate_labels = [\"About\"]").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.boilerplate_labels, vec!["About".to_string()]);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "unknown_key = 1").unwrap();
        assert!(load_config(Some(bad.path())).is_err());
    }
}
