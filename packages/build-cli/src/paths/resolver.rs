use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};
use ts::file_system::{is_relative_specifier, resolve_from, ReadonlyFileSystem};

use super::AliasTable;

/// Extensions tried after the bare candidate path, in priority order.
pub const RESOLVE_EXTENSIONS: [&str; 6] = [".tsx", ".ts", ".jsx", ".js", ".css", ".json"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The alias points at this existing file.
    Aliased(PathBuf),
    /// Not an alias, or no candidate exists. The import is left alone.
    Unresolved,
}

impl Resolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Aliased(path) => Some(path),
            Resolution::Unresolved => None,
        }
    }
}

type Slot = Arc<OnceCell<Resolution>>;

/// Resolves path aliases against the file system, memoizing per specifier.
///
/// Concurrent callers asking for the same specifier share one lookup: the
/// first one probes, the others block on the same cell.
pub struct PathResolver<'a> {
    fs: &'a dyn ReadonlyFileSystem,
    aliases: AliasTable,
    cache: Mutex<HashMap<String, Slot>>,
}

impl<'a> PathResolver<'a> {
    pub fn new(fs: &'a dyn ReadonlyFileSystem, aliases: AliasTable) -> Self {
        PathResolver {
            fs,
            aliases,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, specifier: &str, importer: &Path) -> Resolution {
        if is_relative_specifier(specifier) || Path::new(specifier).is_absolute() {
            return Resolution::Unresolved;
        }

        let slot = self
            .lock()
            .entry(specifier.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        slot.get_or_init(|| self.lookup(specifier, importer)).clone()
    }

    /// Number of distinct specifiers looked up so far.
    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lookup(&self, specifier: &str, importer: &Path) -> Resolution {
        for candidate in self.aliases.candidates(specifier) {
            if let Some(path) = self.probe(&candidate) {
                debug!(specifier, importer = %importer.display(), resolved = %path.display(), "alias resolved");
                return Resolution::Aliased(path);
            }
        }
        debug!(specifier, importer = %importer.display(), "no alias match");
        Resolution::Unresolved
    }

    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        if self.fs.is_file(candidate) {
            return Some(candidate.to_path_buf());
        }
        self.probe_extensions(candidate)
            .or_else(|| self.probe_package_main(candidate))
            .or_else(|| self.probe_extensions(&candidate.join("index")))
    }

    fn probe_extensions(&self, stem: &Path) -> Option<PathBuf> {
        RESOLVE_EXTENSIONS.iter().find_map(|ext| {
            let mut raw: OsString = stem.as_os_str().to_os_string();
            raw.push(ext);
            let path = PathBuf::from(raw);
            self.fs.is_file(&path).then_some(path)
        })
    }

    fn probe_package_main(&self, dir: &Path) -> Option<PathBuf> {
        let manifest = dir.join("package.json");
        if !self.fs.is_file(&manifest) {
            return None;
        }
        let main = match self
            .fs
            .read_file(&manifest)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string()))
        {
            Ok(json) => json.get("main").and_then(|m| m.as_str()).map(str::to_string)?,
            Err(message) => {
                warn!(manifest = %manifest.display(), error = %message, "skipping unreadable package.json");
                return None;
            }
        };
        let main = resolve_from(dir, main);
        if self.fs.is_file(&main) {
            return Some(main);
        }
        self.probe_extensions(&main)
    }
}
