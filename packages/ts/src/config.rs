//! tsconfig.json discovery, reading and resolution.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::file_system::{clean_path, resolve_from, ReadonlyFileSystem};
use crate::jsonc::strip_jsonc;
use crate::{CompilerOptions, Diagnostic, ParsedCommandLine};

pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];
const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx"];

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("cannot find base configuration '{extends}' extended by {from}")]
    ExtendsNotFound { extends: String, from: PathBuf },
    #[error("circular 'extends' chain through {path}")]
    CircularExtends { path: PathBuf },
}

/// Search `search_path` and its ancestors for a `tsconfig.json`.
pub fn find_config_file(search_path: &Path, fs: &dyn ReadonlyFileSystem) -> Option<PathBuf> {
    let mut dir = clean_path(search_path);
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if fs.is_file(&candidate) {
            debug!(path = %candidate.display(), "found config file");
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Read a config file and parse it as JSON with comments.
pub fn read_config_file(path: &Path, fs: &dyn ReadonlyFileSystem) -> Result<Value, ConfigError> {
    let content = fs.read_file(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_file_text(path, &content)
}

/// Parse the text of a config file. The root value must be an object.
pub fn parse_config_file_text(path: &Path, text: &str) -> Result<Value, ConfigError> {
    let value: Value = serde_json::from_str(&strip_jsonc(text)).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: "the root value of a tsconfig.json file must be an object".to_string(),
        });
    }
    Ok(value)
}

/// Resolve a parsed config: follow `extends`, apply defaults and expand the
/// root file list.
///
/// Relative paths in `json` are resolved against `base_path`; relative paths
/// in extended files against the extended file's own directory.
pub fn parse_json_config_file_content(
    json: &Value,
    fs: &dyn ReadonlyFileSystem,
    base_path: &Path,
    config_file_name: Option<&Path>,
) -> Result<ParsedCommandLine, ConfigError> {
    let base_path = clean_path(base_path);
    let origin = config_file_name
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_path.join(CONFIG_FILE_NAME));

    let mut stack = vec![origin.clone()];
    let layer = build_layer(json, &base_path, &origin, fs, &mut stack)?;

    let mut errors = Vec::new();
    let allow_js = layer.options.allow_js.unwrap_or(false);
    let file_names = expand_file_names(&layer, &base_path, allow_js, fs, &mut errors);

    if file_names.is_empty() {
        let mut diagnostic = Diagnostic::error(
            format!("No inputs were found in config file '{}'.", origin.display()),
            Some(origin.to_string_lossy().to_string()),
        );
        diagnostic.code = 18003;
        errors.push(diagnostic);
    }

    Ok(ParsedCommandLine {
        options: layer.options,
        file_names,
        errors,
    })
}

/// One config file with its `extends` chain applied. All paths absolute.
#[derive(Debug, Default)]
struct ConfigLayer {
    options: CompilerOptions,
    files: Option<Vec<PathBuf>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl ConfigLayer {
    fn overlay(&mut self, other: ConfigLayer) {
        self.options.merge(other.options);
        if other.files.is_some() {
            self.files = other.files;
        }
        if other.include.is_some() {
            self.include = other.include;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
    }
}

fn build_layer(
    json: &Value,
    dir: &Path,
    file: &Path,
    fs: &dyn ReadonlyFileSystem,
    stack: &mut Vec<PathBuf>,
) -> Result<ConfigLayer, ConfigError> {
    let mut layer = ConfigLayer::default();

    for extends in extends_list(json, file)? {
        let parent_path =
            resolve_extends(&extends, dir, fs).ok_or_else(|| ConfigError::ExtendsNotFound {
                extends: extends.clone(),
                from: file.to_path_buf(),
            })?;
        if stack.contains(&parent_path) {
            return Err(ConfigError::CircularExtends { path: parent_path });
        }
        debug!(from = %file.display(), parent = %parent_path.display(), "following extends");

        let parent_json = read_config_file(&parent_path, fs)?;
        let parent_dir = parent_path.parent().unwrap_or(Path::new("/")).to_path_buf();
        stack.push(parent_path.clone());
        let parent = build_layer(&parent_json, &parent_dir, &parent_path, fs, stack)?;
        stack.pop();
        layer.overlay(parent);
    }

    let own = ConfigLayer {
        options: own_compiler_options(json, dir, file)?,
        files: string_list(json, "files", file)?
            .map(|files| files.iter().map(|f| resolve_from(dir, f)).collect()),
        include: string_list(json, "include", file)?.map(|patterns| absolute_patterns(dir, patterns)),
        exclude: string_list(json, "exclude", file)?.map(|patterns| absolute_patterns(dir, patterns)),
    };
    layer.overlay(own);
    Ok(layer)
}

fn extends_list(json: &Value, file: &Path) -> Result<Vec<String>, ConfigError> {
    match json.get("extends") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| ConfigError::Parse {
                    path: file.to_path_buf(),
                    message: "'extends' entries must be strings".to_string(),
                })
            })
            .collect(),
        Some(_) => Err(ConfigError::Parse {
            path: file.to_path_buf(),
            message: "'extends' must be a string or an array of strings".to_string(),
        }),
    }
}

fn resolve_extends(extends: &str, dir: &Path, fs: &dyn ReadonlyFileSystem) -> Option<PathBuf> {
    let with_json = |p: PathBuf| -> Vec<PathBuf> {
        if p.extension().map_or(false, |e| e == "json") {
            vec![p]
        } else {
            let mut json = p.clone().into_os_string();
            json.push(".json");
            vec![p.clone(), PathBuf::from(json), p.join(CONFIG_FILE_NAME)]
        }
    };

    let is_path = extends.starts_with("./")
        || extends.starts_with("../")
        || Path::new(extends).is_absolute();

    if is_path {
        return with_json(resolve_from(dir, extends))
            .into_iter()
            .find(|candidate| fs.is_file(candidate));
    }

    let mut current = dir.to_path_buf();
    loop {
        let package = current.join("node_modules").join(extends);
        if let Some(found) = with_json(package).into_iter().find(|c| fs.is_file(c)) {
            return Some(found);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn own_compiler_options(json: &Value, dir: &Path, file: &Path) -> Result<CompilerOptions, ConfigError> {
    let mut options = match json.get("compilerOptions") {
        None | Some(Value::Null) => CompilerOptions::default(),
        Some(raw) => serde_json::from_value::<CompilerOptions>(raw.clone()).map_err(|e| {
            ConfigError::Parse {
                path: file.to_path_buf(),
                message: format!("invalid compilerOptions: {}", e),
            }
        })?,
    };

    let absolute = |p: &Option<String>| {
        p.as_ref()
            .map(|p| resolve_from(dir, p).to_string_lossy().to_string())
    };
    options.base_url = absolute(&options.base_url);
    options.out_dir = absolute(&options.out_dir);
    options.root_dir = absolute(&options.root_dir);
    if options.paths.is_some() {
        options.paths_base_path = Some(dir.to_string_lossy().to_string());
    }
    Ok(options)
}

fn string_list(json: &Value, key: &str, file: &Path) -> Result<Option<Vec<String>>, ConfigError> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| ConfigError::Parse {
                    path: file.to_path_buf(),
                    message: format!("'{}' entries must be strings", key),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(ConfigError::Parse {
            path: file.to_path_buf(),
            message: format!("'{}' must be an array", key),
        }),
    }
}

fn absolute_patterns(dir: &Path, patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| resolve_from(dir, p).to_string_lossy().to_string())
        .collect()
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

/// Turn an include pattern into a file pattern: directories and extension-less
/// last segments match every supported file beneath them.
fn include_file_pattern(pattern: &str, fs: &dyn ReadonlyFileSystem) -> String {
    let last = pattern.rsplit('/').next().unwrap_or(pattern);
    if has_wildcard(last) || fs.is_file(Path::new(pattern)) {
        return pattern.to_string();
    }
    if last.contains('.') && !fs.is_directory(Path::new(pattern)) {
        return pattern.to_string();
    }
    format!("{}/**/*", pattern.trim_end_matches('/'))
}

/// The longest directory prefix of `pattern` free of wildcards.
fn literal_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if has_wildcard(&text) {
            break;
        }
        root.push(component.as_os_str());
    }
    root
}

struct ExcludeMatcher {
    patterns: Vec<Pattern>,
}

impl ExcludeMatcher {
    fn new(excludes: &[String]) -> Self {
        let mut patterns = Vec::new();
        for exclude in excludes {
            let trimmed = exclude.trim_end_matches('/');
            for candidate in [trimmed.to_string(), format!("{}/**/*", trimmed)] {
                if let Ok(pattern) = Pattern::new(&candidate) {
                    patterns.push(pattern);
                }
            }
        }
        ExcludeMatcher { patterns }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(path, GLOB_OPTIONS))
    }
}

fn expand_file_names(
    layer: &ConfigLayer,
    base_path: &Path,
    allow_js: bool,
    fs: &dyn ReadonlyFileSystem,
    errors: &mut Vec<Diagnostic>,
) -> Vec<PathBuf> {
    let mut result = BTreeSet::new();

    if let Some(files) = &layer.files {
        for file in files {
            if fs.is_file(file) {
                result.insert(file.clone());
            } else {
                let mut diagnostic = Diagnostic::error(
                    format!("File '{}' not found.", file.display()),
                    Some(file.to_string_lossy().to_string()),
                );
                diagnostic.code = 6053;
                errors.push(diagnostic);
            }
        }
    }

    let include = match (&layer.include, &layer.files) {
        (Some(include), _) => include.clone(),
        (None, Some(_)) => Vec::new(),
        (None, None) => vec![base_path.join("**/*").to_string_lossy().to_string()],
    };

    let excludes = match &layer.exclude {
        Some(exclude) => exclude.clone(),
        None => {
            let mut defaults: Vec<String> = DEFAULT_EXCLUDES
                .iter()
                .map(|d| base_path.join(d).to_string_lossy().to_string())
                .collect();
            if let Some(out_dir) = &layer.options.out_dir {
                defaults.push(out_dir.clone());
            }
            defaults
        }
    };
    let exclude = ExcludeMatcher::new(&excludes);

    let mut extensions: Vec<&str> = TS_EXTENSIONS.to_vec();
    if allow_js {
        extensions.extend_from_slice(JS_EXTENSIONS);
    }

    for raw in &include {
        let file_pattern = include_file_pattern(raw, fs);
        let pattern = match Pattern::new(&file_pattern) {
            Ok(p) => p,
            Err(e) => {
                errors.push(Diagnostic::error(
                    format!("Invalid include pattern '{}': {}", raw, e),
                    None,
                ));
                continue;
            }
        };
        let explicit_file = !has_wildcard(&file_pattern);
        let root = literal_root(&file_pattern);
        let mut found = Vec::new();
        if fs.is_file(&root) {
            found.push(root);
        } else {
            walk(&root, fs, &exclude, &mut found);
        }

        for path in found {
            if exclude.is_excluded(&path) || !pattern.matches_path_with(&path, GLOB_OPTIONS) {
                continue;
            }
            let name = path.to_string_lossy();
            if explicit_file || extensions.iter().any(|ext| name.ends_with(ext)) {
                result.insert(path);
            }
        }
    }

    debug!(count = result.len(), "expanded root file names");
    result.into_iter().collect()
}

fn walk(dir: &Path, fs: &dyn ReadonlyFileSystem, exclude: &ExcludeMatcher, out: &mut Vec<PathBuf>) {
    let entries = match fs.readdir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries {
        if exclude.is_excluded(&entry) {
            continue;
        }
        if fs.is_directory(&entry) {
            walk(&entry, fs, exclude, out);
        } else {
            out.push(entry);
        }
    }
}
