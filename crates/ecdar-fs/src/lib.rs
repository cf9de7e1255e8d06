//! Ecdar FS - std::fs implementation of the core `FileSystem` trait.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ecdar_core::{FileSystem, FsError};

/// Reads and writes project directories on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn io_error(path: &Path, err: std::io::Error) -> FsError {
    if err.kind() == ErrorKind::NotFound {
        FsError::NotFound(path.to_path_buf())
    } else {
        FsError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        tracing::debug!("Reading {}", path.display());
        std::fs::read_to_string(path).map_err(|e| io_error(path, e))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        tracing::debug!("Writing {} ({} bytes)", path.display(), content.len());
        std::fs::write(path, content).map_err(|e| io_error(path, e))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, FsError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| io_error(path, e))? {
            let entry = entry.map_err(|e| io_error(path, e))?;
            let file_type = entry.file_type().map_err(|e| io_error(&entry.path(), e))?;
            // Subdirectories are not part of a listing
            if file_type.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        tracing::debug!("Removing {}", path.display());
        std::fs::remove_file(path).map_err(|e| io_error(path, e))
    }
}
