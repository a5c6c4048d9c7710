//! Rewrite pass: the real build, with aliased imports replaced by relative
//! ones as each file is loaded.

use std::path::{Path, PathBuf};

use bundler::{BuildOptions, BuildResult, Format, LoadArgs, LoadResult, Loader, Plugin};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use ts::file_system::{is_relative_specifier, relative, to_module_specifier, FileSystem, ReadonlyFileSystem};
use ts::{transpile_module, CompilerOptions, TranspileOptions};

use crate::analysis::{FileImports, ImportTable};
use crate::config::ProjectConfig;
use crate::BuildError;

/// Files matching this are run through `transpile_module` after rewriting.
static TRANSPILE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"// +transpileModule = On").unwrap());

pub const DEFAULT_LOAD_FILTER: &str = r"\.tsx?$";

const QUOTES: [char; 3] = ['\'', '"', '`'];

/// Replace every quoted occurrence of each recorded alias with the path of
/// its target relative to `importer`'s directory.
///
/// Relative specifiers and unresolved aliases are left as they are, so
/// running this twice changes nothing the second time.
pub fn rewrite_imports(content: &str, importer: &Path, imports: &FileImports) -> String {
    let importer_dir = importer.parent().unwrap_or(Path::new("/"));
    let mut content = content.to_string();
    for (specifier, resolved) in imports {
        let Some(resolved) = resolved else { continue };
        if is_relative_specifier(specifier) {
            continue;
        }
        let replacement = to_module_specifier(&relative(importer_dir, resolved));
        for quote in QUOTES {
            let from = format!("{quote}{specifier}{quote}");
            if content.contains(&from) {
                content = content.replace(&from, &format!("{quote}{replacement}{quote}"));
            }
        }
    }
    content
}

/// The load hook's work for one file: read, rewrite, and transpile when the
/// marker comment is present.
pub fn transform_load(
    fs: &dyn ReadonlyFileSystem,
    path: &Path,
    table: &ImportTable,
    compiler_options: &CompilerOptions,
) -> Result<LoadResult, BuildError> {
    let raw = fs.read_file(path).map_err(|source| BuildError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut contents = match table.imports_of(path) {
        Some(imports) => rewrite_imports(&raw, path, imports),
        None => raw,
    };

    if TRANSPILE_MARKER.is_match(&contents) {
        let options = TranspileOptions {
            compiler_options: Some(compiler_options),
            file_name: Some(path),
        };
        contents = transpile_module(&contents, &options)
            .map_err(|source| BuildError::Transform {
                path: path.to_path_buf(),
                source,
            })?
            .output_text;
        debug!(path = %path.display(), "transpiled marked module");
    }

    Ok(LoadResult {
        contents,
        loader: Loader::Tsx,
    })
}

pub struct AliasRewritePlugin<'a> {
    fs: &'a dyn ReadonlyFileSystem,
    table: &'a ImportTable,
    compiler_options: &'a CompilerOptions,
    filter: Regex,
}

impl<'a> AliasRewritePlugin<'a> {
    pub fn new(
        fs: &'a dyn ReadonlyFileSystem,
        table: &'a ImportTable,
        compiler_options: &'a CompilerOptions,
        filter: Regex,
    ) -> Self {
        AliasRewritePlugin {
            fs,
            table,
            compiler_options,
            filter,
        }
    }
}

impl Plugin for AliasRewritePlugin<'_> {
    fn name(&self) -> &str {
        "alias-rewrite"
    }

    fn load_filter(&self) -> Option<&Regex> {
        Some(&self.filter)
    }

    fn on_load(&self, args: &LoadArgs<'_>) -> anyhow::Result<Option<LoadResult>> {
        let loaded = transform_load(self.fs, args.path, self.table, self.compiler_options)?;
        Ok(Some(loaded))
    }
}

/// Run the emitting build, one output per entry point under `outDir`.
pub fn run_rewrite(
    fs: &dyn FileSystem,
    config: &ProjectConfig,
    table: &ImportTable,
    format: Format,
    filter: Regex,
) -> Result<BuildResult, BuildError> {
    let plugin = AliasRewritePlugin::new(fs, table, &config.compiler_options, filter);
    let options = BuildOptions {
        entry_points: config.entry_points.clone(),
        outdir: config.out_dir.clone(),
        outbase: config.compiler_options.root_dir.as_ref().map(PathBuf::from),
        bundle: false,
        write: true,
        format,
        sourcemap: config.source_map,
        compiler_options: config.compiler_options.clone(),
        ..BuildOptions::new(config.base_path.clone())
    };
    let result = bundler::build(fs, &options, &[&plugin])?;
    info!(outputs = result.output_files.len(), out_dir = %config.out_dir.display(), "rewrite complete");
    Ok(result)
}
