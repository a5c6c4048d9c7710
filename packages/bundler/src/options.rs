use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use glob::Pattern;

use crate::BuildError;

/// Module format of the emitted JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Cjs,
    Esm,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cjs" | "commonjs" => Ok(Format::Cjs),
            "esm" | "module" => Ok(Format::Esm),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Cjs => f.write_str("cjs"),
            Format::Esm => f.write_str("esm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceMapMode {
    #[default]
    None,
    /// Appended to the output as a base64 data URL.
    Inline,
    /// Written next to the output as `<file>.map`.
    External,
}

pub const DEFAULT_RESOLVE_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js", ".css", ".json"];

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub entry_points: Vec<PathBuf>,
    pub outdir: PathBuf,
    /// Outputs mirror the entries' paths below this directory; defaults to
    /// the deepest directory holding every entry.
    pub outbase: Option<PathBuf>,
    /// Relative entry points and `external` patterns are anchored here.
    pub working_dir: PathBuf,
    /// Follow imports from the entry points instead of only loading them.
    pub bundle: bool,
    /// Write outputs to disk. Outputs are returned either way.
    pub write: bool,
    pub format: Format,
    pub sourcemap: SourceMapMode,
    /// Glob patterns such as `./node_modules/*`, matched against `./`
    /// followed by the resolved path relative to `working_dir`.
    pub external: Vec<String>,
    pub resolve_extensions: Vec<String>,
    /// `target`, `experimentalDecorators` and `removeComments` shape the
    /// emitted code.
    pub compiler_options: ts::CompilerOptions,
}

impl BuildOptions {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            entry_points: Vec::new(),
            outdir: working_dir.join("dist"),
            outbase: None,
            working_dir,
            bundle: false,
            write: true,
            format: Format::default(),
            sourcemap: SourceMapMode::default(),
            external: Vec::new(),
            resolve_extensions: DEFAULT_RESOLVE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            compiler_options: ts::CompilerOptions::default(),
        }
    }
}

/// Compiled form of [`BuildOptions::external`].
#[derive(Debug, Clone, Default)]
pub(crate) struct ExternalPatterns {
    patterns: Vec<Pattern>,
}

impl ExternalPatterns {
    pub(crate) fn compile(patterns: &[String]) -> Result<Self, BuildError> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                Pattern::new(raw).map_err(|source| BuildError::Pattern {
                    pattern: raw.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub(crate) fn matches(&self, working_dir: &Path, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let relative = ts::file_system::relative(working_dir, path);
        let candidate = ts::file_system::to_module_specifier(&relative);
        self.patterns.iter().any(|p| p.matches(&candidate))
    }
}
