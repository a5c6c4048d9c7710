use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info};

use ts::file_system::{clean_path, normalize_separators, resolve_from, FileSystem};

use crate::emit::{emit_module, LoadedModule};
use crate::options::ExternalPatterns;
use crate::resolve::{resolve_default, DefaultResolution};
use crate::scan::scan_imports;
use crate::{BuildError, BuildOptions, ImportKind, LoadArgs, Loader, Plugin, ResolveArgs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    /// One JavaScript (or CSS) file per entry point, plus external maps.
    pub output_files: Vec<OutputFile>,
    /// Every module loaded, in breadth-first order from the entry points.
    pub modules: Vec<PathBuf>,
}

/// Run one build.
///
/// With `bundle` set, imports are followed breadth-first and every frontier
/// is loaded on the rayon pool, so plugin hooks can run concurrently. Output
/// files are written only once every output has been generated.
pub fn build(fs: &dyn FileSystem, options: &BuildOptions, plugins: &[&dyn Plugin]) -> Result<BuildResult, BuildError> {
    let host = BuildHost {
        fs,
        options,
        plugins,
        external: ExternalPatterns::compile(&options.external)?,
    };

    let entries: Vec<PathBuf> = options
        .entry_points
        .iter()
        .map(|entry| resolve_from(&options.working_dir, entry))
        .fold(Vec::new(), |mut acc, entry| {
            if !acc.contains(&entry) {
                acc.push(entry);
            }
            acc
        });

    let modules = host.load_graph(&entries)?;
    let outbase = match &options.outbase {
        Some(outbase) => resolve_from(&options.working_dir, outbase),
        None => lowest_common_ancestor(&entries),
    };

    let emitted = entries
        .par_iter()
        .filter_map(|entry| modules.get(entry))
        .map(|module| {
            let output_path = output_path(&module.path, &outbase, &options.outdir, module.loader);
            emit_module(module, &output_path, options)
        })
        .collect::<Result<Vec<_>, BuildError>>()?;
    let output_files: Vec<OutputFile> = emitted.into_iter().flatten().collect();

    if options.write {
        for file in &output_files {
            if let Some(parent) = file.path.parent() {
                fs.ensure_dir(parent).map_err(|source| BuildError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs.write_file(&file.path, file.contents.as_bytes())
                .map_err(|source| BuildError::Write {
                    path: file.path.clone(),
                    source,
                })?;
        }
    }

    info!(
        entries = entries.len(),
        modules = modules.len(),
        outputs = output_files.len(),
        written = options.write,
        "build finished"
    );
    Ok(BuildResult {
        output_files,
        modules: modules.into_keys().collect(),
    })
}

struct BuildHost<'a> {
    fs: &'a dyn FileSystem,
    options: &'a BuildOptions,
    plugins: &'a [&'a dyn Plugin],
    external: ExternalPatterns,
}

impl BuildHost<'_> {
    fn load_graph(&self, entries: &[PathBuf]) -> Result<IndexMap<PathBuf, LoadedModule>, BuildError> {
        let mut modules = IndexMap::new();
        let mut seen: HashSet<PathBuf> = entries.iter().cloned().collect();
        let mut frontier = entries.to_vec();

        while !frontier.is_empty() {
            let loaded = frontier
                .par_iter()
                .map(|path| {
                    let module = self.load(path)?;
                    let deps = if self.options.bundle {
                        self.dependencies(&module)?
                    } else {
                        Vec::new()
                    };
                    Ok((module, deps))
                })
                .collect::<Result<Vec<_>, BuildError>>()?;

            let mut next = Vec::new();
            for (module, deps) in loaded {
                for dep in deps {
                    if seen.insert(dep.clone()) {
                        next.push(dep);
                    }
                }
                modules.insert(module.path.clone(), module);
            }
            frontier = next;
        }

        Ok(modules)
    }

    fn load(&self, path: &Path) -> Result<LoadedModule, BuildError> {
        let path_str = normalize_separators(&path.to_string_lossy());
        for plugin in self.plugins {
            let Some(filter) = plugin.load_filter() else { continue };
            if !filter.is_match(&path_str) {
                continue;
            }
            let loaded = plugin
                .on_load(&LoadArgs { path })
                .map_err(|err| plugin_error(*plugin, path, err))?;
            if let Some(result) = loaded {
                debug!(plugin = plugin.name(), path = %path.display(), "loaded by plugin");
                return Ok(LoadedModule {
                    path: path.to_path_buf(),
                    contents: result.contents,
                    loader: result.loader,
                });
            }
        }

        let loader = Loader::from_path(path).ok_or_else(|| BuildError::NoLoader {
            path: path.to_path_buf(),
        })?;
        let contents = self.fs.read_file(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded");
        Ok(LoadedModule {
            path: path.to_path_buf(),
            contents,
            loader,
        })
    }

    fn dependencies(&self, module: &LoadedModule) -> Result<Vec<PathBuf>, BuildError> {
        let Some(source_type) = module.loader.source_type() else {
            return Ok(Vec::new());
        };
        let mut deps = Vec::new();
        for (specifier, kind) in scan_imports(&module.path, &module.contents, source_type)? {
            if let Some(path) = self.resolve(&specifier, &module.path, kind)? {
                deps.push(path);
            }
        }
        Ok(deps)
    }

    /// `None` means the import stays external.
    fn resolve(&self, specifier: &str, importer: &Path, kind: ImportKind) -> Result<Option<PathBuf>, BuildError> {
        let resolve_dir = importer.parent().unwrap_or(Path::new("/"));
        let args = ResolveArgs {
            path: specifier,
            importer,
            resolve_dir,
            kind,
        };

        for plugin in self.plugins {
            let Some(filter) = plugin.resolve_filter() else { continue };
            if !filter.is_match(specifier) {
                continue;
            }
            let resolved = plugin
                .on_resolve(&args)
                .map_err(|err| plugin_error(*plugin, importer, err))?;
            if let Some(result) = resolved {
                let path = clean_path(&result.path);
                if result.external || self.is_external(&path) {
                    debug!(plugin = plugin.name(), specifier, "external");
                    return Ok(None);
                }
                debug!(plugin = plugin.name(), specifier, path = %path.display(), "resolved by plugin");
                return Ok(Some(path));
            }
        }

        match resolve_default(self.fs, specifier, resolve_dir, &self.options.resolve_extensions) {
            DefaultResolution::File(path) if self.is_external(&path) => Ok(None),
            DefaultResolution::File(path) => Ok(Some(path)),
            DefaultResolution::External => Ok(None),
            DefaultResolution::NotFound => Err(BuildError::Resolve {
                specifier: specifier.to_string(),
                importer: importer.to_path_buf(),
            }),
        }
    }

    fn is_external(&self, path: &Path) -> bool {
        self.external.matches(&self.options.working_dir, path)
    }
}

fn plugin_error(plugin: &dyn Plugin, path: &Path, err: anyhow::Error) -> BuildError {
    BuildError::Plugin {
        plugin: plugin.name().to_string(),
        path: path.to_path_buf(),
        message: format!("{:#}", err),
    }
}

/// Deepest directory containing every entry point.
fn lowest_common_ancestor(entries: &[PathBuf]) -> PathBuf {
    let mut dirs = entries.iter().map(|e| e.parent().unwrap_or(Path::new("/")).to_path_buf());
    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };
    dirs.fold(first, |common, dir| {
        common
            .components()
            .zip(dir.components())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect()
    })
}

fn output_path(path: &Path, outbase: &Path, outdir: &Path, loader: Loader) -> PathBuf {
    let relative = path
        .strip_prefix(outbase)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
    let extension = match loader {
        Loader::Css => "css",
        _ => "js",
    };
    outdir.join(relative).with_extension(extension)
}
