use std::path::{Path, PathBuf};

use bundler::SourceMapMode;
use tracing::{info, warn};
use ts::file_system::{resolve_from, ReadonlyFileSystem};
use ts::{CompilerOptions, Diagnostic, CONFIG_FILE_NAME};

use crate::paths::AliasTable;
use crate::BuildError;

/// The resolved project, loaded once per run.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    /// Directory relative paths of the run are anchored at.
    pub base_path: PathBuf,
    pub entry_points: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub base_url: PathBuf,
    pub aliases: AliasTable,
    pub source_map: SourceMapMode,
    pub compiler_options: CompilerOptions,
    /// Non-fatal problems reported while reading the configuration.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProjectConfig {
    /// Load the project named by `project` (a config file or a directory
    /// holding one), or the nearest `tsconfig.json` above the working
    /// directory.
    pub fn load(fs: &dyn ReadonlyFileSystem, project: Option<&Path>) -> Result<Self, BuildError> {
        let cwd = fs.pwd();
        let (config_path, base_path) = match project {
            Some(project) => {
                let mut path = resolve_from(&cwd, project);
                if fs.is_directory(&path) {
                    path = path.join(CONFIG_FILE_NAME);
                }
                if !fs.is_file(&path) {
                    return Err(BuildError::ConfigNotFound { search_dir: path });
                }
                let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
                (path, base)
            }
            None => {
                let path = ts::find_config_file(&cwd, fs)
                    .ok_or_else(|| BuildError::ConfigNotFound { search_dir: cwd.clone() })?;
                (path, cwd)
            }
        };

        let json = ts::read_config_file(&config_path, fs)?;
        let parsed = ts::parse_json_config_file_content(&json, fs, &base_path, Some(&config_path))?;
        for diagnostic in &parsed.errors {
            warn!("{}", diagnostic);
        }

        let options = parsed.options;
        let out_dir = options
            .out_dir
            .as_deref()
            .map(|dir| resolve_from(&base_path, dir))
            .unwrap_or_else(|| base_path.clone());
        let base_url = options
            .base_url
            .as_deref()
            .map(|url| resolve_from(&base_path, url))
            .unwrap_or_else(|| base_path.clone());
        let alias_base = options
            .base_url
            .as_deref()
            .or(options.paths_base_path.as_deref())
            .map(|dir| resolve_from(&base_path, dir))
            .unwrap_or_else(|| base_path.clone());
        let aliases = options
            .paths
            .as_ref()
            .map(|paths| AliasTable::new(paths, alias_base.clone()))
            .unwrap_or_else(|| AliasTable::empty(alias_base));

        info!(
            config = %config_path.display(),
            entries = parsed.file_names.len(),
            aliases = aliases.len(),
            "loaded project configuration"
        );

        Ok(ProjectConfig {
            source_map: source_map_mode(&options),
            config_path,
            base_path,
            entry_points: parsed.file_names,
            out_dir,
            base_url,
            aliases,
            compiler_options: options,
            diagnostics: parsed.errors,
        })
    }
}

/// `sourceMap` decides whether maps are produced at all; `inlineSourceMap`
/// only picks inline over external when `sourceMap` is on.
pub fn source_map_mode(options: &CompilerOptions) -> SourceMapMode {
    match (options.source_map, options.inline_source_map) {
        (Some(true), Some(true)) => SourceMapMode::Inline,
        (Some(true), _) => SourceMapMode::External,
        _ => SourceMapMode::None,
    }
}
