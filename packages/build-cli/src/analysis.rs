//! Analysis pass: a dry-run build that records, for every source file, what
//! each of its import specifiers resolves to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use bundler::{BuildOptions, Plugin, ResolveArgs, ResolveResult, SourceMapMode};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;
use ts::file_system::FileSystem;

use crate::config::ProjectConfig;
use crate::paths::{PathResolver, Resolution};
use crate::BuildError;

/// Specifier to resolved path; `None` when the specifier is not an alias.
pub type FileImports = BTreeMap<String, Option<PathBuf>>;

/// Packages installed under this zone are never traversed.
pub const EXTERNAL_ZONE: &str = "./node_modules/*";

static ANY_SPECIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(".*").unwrap());

/// Collects import records while the analysis build runs.
#[derive(Debug, Default)]
pub struct ImportTableBuilder {
    files: Mutex<BTreeMap<PathBuf, FileImports>>,
}

impl ImportTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, importer: &Path, specifier: &str, resolved: Option<PathBuf>) {
        self.lock()
            .entry(importer.to_path_buf())
            .or_default()
            .insert(specifier.to_string(), resolved);
    }

    pub fn freeze(self) -> ImportTable {
        let files = match self.files.into_inner() {
            Ok(files) => files,
            Err(poisoned) => poisoned.into_inner(),
        };
        ImportTable { files }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, FileImports>> {
        match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Read-only view of everything the analysis pass recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    files: BTreeMap<PathBuf, FileImports>,
}

impl ImportTable {
    pub fn imports_of(&self, file: &Path) -> Option<&FileImports> {
        self.files.get(file)
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &FileImports)> {
        self.files.iter().map(|(path, imports)| (path.as_path(), imports))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Records every resolution request and answers aliased ones, so the host
/// follows aliases into the files they point at.
pub struct ImportAnalyzePlugin<'a> {
    resolver: &'a PathResolver<'a>,
    table: ImportTableBuilder,
}

impl<'a> ImportAnalyzePlugin<'a> {
    pub fn new(resolver: &'a PathResolver<'a>) -> Self {
        ImportAnalyzePlugin {
            resolver,
            table: ImportTableBuilder::new(),
        }
    }

    pub fn into_table(self) -> ImportTable {
        self.table.freeze()
    }
}

impl Plugin for ImportAnalyzePlugin<'_> {
    fn name(&self) -> &str {
        "import-analyze"
    }

    fn resolve_filter(&self) -> Option<&Regex> {
        Some(&*ANY_SPECIFIER)
    }

    fn on_resolve(&self, args: &ResolveArgs<'_>) -> anyhow::Result<Option<ResolveResult>> {
        let resolution = self.resolver.resolve(args.path, args.importer);
        self.table
            .record(args.importer, args.path, resolution.path().map(Path::to_path_buf));
        Ok(match resolution {
            Resolution::Aliased(path) => Some(ResolveResult::file(path)),
            Resolution::Unresolved => None,
        })
    }
}

/// Run the analysis build over the project's entry points. Nothing is
/// written.
pub fn run_analysis(
    fs: &dyn FileSystem,
    config: &ProjectConfig,
    resolver: &PathResolver<'_>,
) -> Result<ImportTable, BuildError> {
    let plugin = ImportAnalyzePlugin::new(resolver);
    let options = BuildOptions {
        entry_points: config.entry_points.clone(),
        outdir: config.out_dir.clone(),
        bundle: true,
        write: false,
        sourcemap: SourceMapMode::None,
        external: vec![EXTERNAL_ZONE.to_string()],
        compiler_options: config.compiler_options.clone(),
        ..BuildOptions::new(config.base_path.clone())
    };
    let result = bundler::build(fs, &options, &[&plugin])?;

    let table = plugin.into_table();
    info!(modules = result.modules.len(), files = table.len(), "analysis complete");
    Ok(table)
}
