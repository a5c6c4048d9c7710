use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::types::{FileStats, FileSystem, ReadonlyFileSystem};

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeJSFileSystem;

impl NodeJSFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl ReadonlyFileSystem for NodeJSFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStats> {
        let meta = fs::metadata(path)?;
        Ok(FileStats {
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
        })
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn readdir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(path)? {
            result.push(entry?.path());
        }
        result.sort();
        Ok(result)
    }

    fn pwd(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

impl FileSystem for NodeJSFileSystem {
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(path, data)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}
