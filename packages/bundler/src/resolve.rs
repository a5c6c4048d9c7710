//! The host's own resolution, used when no plugin answers.

use std::path::{Path, PathBuf};

use ts::file_system::{is_relative_specifier, resolve_from, ReadonlyFileSystem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultResolution {
    File(PathBuf),
    /// Bare specifiers are left to the runtime.
    External,
    NotFound,
}

pub fn resolve_default(
    fs: &dyn ReadonlyFileSystem,
    specifier: &str,
    resolve_dir: &Path,
    extensions: &[String],
) -> DefaultResolution {
    if !is_relative_specifier(specifier) && !Path::new(specifier).is_absolute() {
        return DefaultResolution::External;
    }
    let base = resolve_from(resolve_dir, specifier);
    match probe_file(fs, &base, extensions) {
        Some(path) => DefaultResolution::File(path),
        None => DefaultResolution::NotFound,
    }
}

/// `base`, then `base` plus each extension, then `base/index` plus each
/// extension.
pub fn probe_file(fs: &dyn ReadonlyFileSystem, base: &Path, extensions: &[String]) -> Option<PathBuf> {
    if fs.is_file(base) {
        return Some(base.to_path_buf());
    }
    let with_ext = |stem: &Path| {
        extensions.iter().find_map(|ext| {
            let mut candidate = stem.as_os_str().to_os_string();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            fs.is_file(&candidate).then_some(candidate)
        })
    };
    with_ext(base).or_else(|| with_ext(&base.join("index")))
}
