use std::io;
use std::path::{Path, PathBuf};

/// Information about an object in the file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub is_file: bool,
    pub is_directory: bool,
}

/// An abstraction over the read-only aspects of a file-system.
///
/// Implementations must be shareable across the rayon pool.
pub trait ReadonlyFileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> io::Result<FileStats>;
    fn read_file(&self, path: &Path) -> io::Result<String>;
    /// Absolute paths of the direct children of `path`.
    fn readdir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
    fn pwd(&self) -> PathBuf;

    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.stat(path).map(|s| s.is_file).unwrap_or(false)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.stat(path).map(|s| s.is_directory).unwrap_or(false)
    }
}

/// A basic interface to abstract the underlying file-system.
pub trait FileSystem: ReadonlyFileSystem {
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;
}
