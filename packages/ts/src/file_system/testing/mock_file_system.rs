use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::file_system::types::{FileStats, FileSystem, ReadonlyFileSystem};
use crate::file_system::util::clean_path;

/// An in-memory POSIX file system.
///
/// Directories are implied by the files beneath them. Every `stat` call is
/// counted so tests can assert how often a component probed the disk.
#[derive(Clone, Debug)]
pub struct MockFileSystem {
    cwd: PathBuf,
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    probes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MockFileSystem {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        MockFileSystem {
            cwd: cwd.into(),
            files: Arc::new(Mutex::new(BTreeMap::new())),
            probes: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builds a file system holding `files`, paths relative to the cwd.
    pub fn with_files(cwd: impl Into<PathBuf>, files: &[(&str, &str)]) -> Self {
        let fs = Self::new(cwd);
        fs.init_with_files(files);
        fs
    }

    pub fn init_with_files(&self, files: &[(&str, &str)]) {
        let mut tree = self.lock();
        for (path, content) in files {
            tree.insert(clean_path(&self.cwd.join(path)), content.to_string());
        }
    }

    /// Number of `stat`-based probes (`exists`, `is_file`, ...) so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.probes.store(0, Ordering::SeqCst);
        self.reads.store(0, Ordering::SeqCst);
    }

    /// Contents of a file, if present. Not counted as a read.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = clean_path(&self.cwd.join(path));
        self.lock().get(&path).cloned()
    }

    /// All file paths currently stored.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, String>> {
        match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        clean_path(&self.cwd.join(path))
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
    }
}

impl ReadonlyFileSystem for MockFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStats> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let path = self.absolute(path);
        let tree = self.lock();
        if tree.contains_key(&path) {
            return Ok(FileStats {
                is_file: true,
                is_directory: false,
            });
        }
        if tree.keys().any(|p| p != &path && p.starts_with(&path)) {
            return Ok(FileStats {
                is_file: false,
                is_directory: true,
            });
        }
        Err(Self::not_found(&path))
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let path = self.absolute(path);
        self.lock()
            .get(&path)
            .cloned()
            .ok_or_else(|| Self::not_found(&path))
    }

    fn readdir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = self.absolute(path);
        let tree = self.lock();
        let mut children: Vec<PathBuf> = tree
            .keys()
            .filter_map(|p| p.strip_prefix(&dir).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| dir.join(first.as_os_str()))
            .collect();
        if children.is_empty() && !tree.contains_key(&dir) {
            return Err(Self::not_found(&dir));
        }
        children.dedup();
        Ok(children)
    }

    fn pwd(&self) -> PathBuf {
        self.cwd.clone()
    }
}

impl FileSystem for MockFileSystem {
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let path = self.absolute(path);
        let content = String::from_utf8_lossy(data).to_string();
        self.lock().insert(path, content);
        Ok(())
    }

    fn ensure_dir(&self, _path: &Path) -> io::Result<()> {
        // Directories only exist through the files they hold.
        Ok(())
    }
}
