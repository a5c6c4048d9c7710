use std::path::{Component, Path, PathBuf};

/// Convert Windows-style separators to POSIX separators.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lexically resolve `.` and `..` segments without touching the disk.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join `path` onto `base` unless it is already absolute, then clean it.
pub fn resolve_from(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    clean_path(&base.join(path))
}

/// Compute the relative path from directory `from` to `to`, POSIX separated.
///
/// Both paths are expected to be absolute. Returns `.` when they are equal.
pub fn relative(from: &Path, to: &Path) -> String {
    let from = clean_path(from);
    let to = clean_path(to);
    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &to_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().to_string());
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// True for specifiers that name a file relative to the importer.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Express `relative` as a module specifier: `./` is prepended unless the
/// path already climbs out with `../`.
pub fn to_module_specifier(relative: &str) -> String {
    if relative.starts_with("../") || relative == ".." {
        relative.to_string()
    } else if relative == "." {
        "./".to_string()
    } else {
        format!("./{}", relative)
    }
}
