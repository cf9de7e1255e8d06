use std::path::{Path, PathBuf};

use crate::error::FsError;

/// File access used to load and save project directories.
pub trait FileSystem {
    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8.
    fn read_file(&self, path: &Path) -> Result<String, FsError>;

    /// Write a whole file, creating parent directories as needed.
    fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError>;

    /// List the files directly inside a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, FsError>;

    /// Delete a file.
    fn remove_file(&self, path: &Path) -> Result<(), FsError>;
}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::RwLock;

    /// In-memory file system for testing.
    #[derive(Default)]
    pub struct InMemoryFileSystem {
        files: RwLock<BTreeMap<PathBuf, String>>,
    }

    impl InMemoryFileSystem {
        pub fn new() -> Self {
            Self::default()
        }

        /// Paths of every stored file, sorted.
        pub fn paths(&self) -> Vec<PathBuf> {
            self.files.read().unwrap().keys().cloned().collect()
        }
    }

    impl FileSystem for InMemoryFileSystem {
        fn exists(&self, path: &Path) -> bool {
            let files = self.files.read().unwrap();
            files.contains_key(path) || files.keys().any(|p| p.starts_with(path))
        }

        fn read_file(&self, path: &Path) -> Result<String, FsError> {
            self.files
                .read()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
        }

        fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
            self.files
                .write()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, FsError> {
            let files = self.files.read().unwrap();
            let entries: Vec<PathBuf> = files
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect();
            if entries.is_empty() && !files.keys().any(|p| p.starts_with(path)) {
                return Err(FsError::NotFound(path.to_path_buf()));
            }
            Ok(entries)
        }

        fn remove_file(&self, path: &Path) -> Result<(), FsError> {
            self.files
                .write()
                .unwrap()
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_write_then_read() {
            let fs = InMemoryFileSystem::new();
            let path = Path::new("/p/Components/Admin.json");
            fs.write_file(path, "{}").unwrap();

            assert!(fs.exists(path));
            assert!(fs.exists(Path::new("/p/Components")));
            assert_eq!(fs.read_file(path).unwrap(), "{}");
            assert!(matches!(
                fs.read_file(Path::new("/p/missing.json")),
                Err(FsError::NotFound(_))
            ));
        }

        #[test]
        fn test_read_dir_lists_direct_children() {
            let fs = InMemoryFileSystem::new();
            fs.write_file(Path::new("/p/Queries.json"), "[]").unwrap();
            fs.write_file(Path::new("/p/Components/A.json"), "{}").unwrap();
            fs.write_file(Path::new("/p/Components/B.json"), "{}").unwrap();

            let entries = fs.read_dir(Path::new("/p/Components")).unwrap();
            assert_eq!(
                entries,
                vec![
                    PathBuf::from("/p/Components/A.json"),
                    PathBuf::from("/p/Components/B.json")
                ]
            );
            assert_eq!(
                fs.read_dir(Path::new("/p")).unwrap(),
                vec![PathBuf::from("/p/Queries.json")]
            );
            assert!(fs.read_dir(Path::new("/q")).is_err());

            fs.remove_file(Path::new("/p/Queries.json")).unwrap();
            assert!(!fs.exists(Path::new("/p/Queries.json")));
            assert!(fs.remove_file(Path::new("/p/Queries.json")).is_err());
        }
    }
}
