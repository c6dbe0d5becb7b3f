//! Storage backend tests

#[cfg(feature = "native-fs")]
mod filesystem_tests {
    use datahub_schema::storage::filesystem::FileSystemStorageBackend;
    use datahub_schema::storage::{StorageBackend, StorageError};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        backend
            .write_file("datasets/BDS/GRADE_OBJECTS.json", b"{}")
            .await
            .unwrap();

        assert!(temp.path().join("datasets/BDS/GRADE_OBJECTS.json").is_file());
        assert!(backend.dir_exists("datasets/BDS").await.unwrap());
        assert_eq!(
            backend
                .read_file("datasets/BDS/GRADE_OBJECTS.json")
                .await
                .unwrap(),
            b"{}"
        );
    }

    #[tokio::test]
    async fn test_list_files_sorted_and_files_only() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        backend.write_file("tables/mysql/B.sql", b"b").await.unwrap();
        backend.write_file("tables/mysql/A.sql", b"a").await.unwrap();
        backend
            .write_file("tables/mysql/table_map.json", b"{}")
            .await
            .unwrap();
        backend.create_dir("tables/mysql/archive").await.unwrap();

        assert_eq!(
            backend.list_files("tables/mysql").await.unwrap(),
            vec!["A.sql", "B.sql", "table_map.json"]
        );
    }

    #[tokio::test]
    async fn test_missing_entries() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        assert!(matches!(
            backend.read_file("modules/GRADES.html").await,
            Err(StorageError::FileNotFound(_))
        ));
        assert!(matches!(
            backend.list_files("modules").await,
            Err(StorageError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            backend.delete_file("modules/GRADES.html").await,
            Err(StorageError::FileNotFound(_))
        ));
        assert!(!backend.file_exists("modules/GRADES.html").await.unwrap());
        assert!(!backend.dir_exists("modules").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_file() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        backend.write_file("modules/GRADES.html", b"<html>").await.unwrap();
        assert!(backend.file_exists("modules/GRADES.html").await.unwrap());
        backend.delete_file("modules/GRADES.html").await.unwrap();
        assert!(!backend.file_exists("modules/GRADES.html").await.unwrap());
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path().join("schema"));

        assert!(matches!(
            backend.write_file("../outside.txt", b"x").await,
            Err(StorageError::PermissionDenied(_))
        ));
        assert!(!temp.path().join("outside.txt").exists());
    }
}
