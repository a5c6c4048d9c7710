//! Resolve and load hooks.
//!
//! A hook only runs when its filter matches: resolve filters are tested
//! against the import specifier, load filters against the absolute path.
//! Plugins are asked in registration order and the first `Some` wins;
//! when every plugin declines, the host falls back to its own behavior.

use std::path::{Path, PathBuf};

use oxc_span::SourceType;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import … from 'x'` or `import 'x'`.
    ImportStatement,
    /// `export … from 'x'` or `export * from 'x'`.
    ReExport,
    /// `import('x')` with a literal specifier.
    DynamicImport,
    /// `require('x')` with a literal specifier.
    RequireCall,
    /// TypeScript's `import x = require('x')`.
    ImportRequire,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveArgs<'a> {
    pub path: &'a str,
    pub importer: &'a Path,
    pub resolve_dir: &'a Path,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    pub path: PathBuf,
    pub external: bool,
}

impl ResolveResult {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            external: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoadArgs<'a> {
    pub path: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loader {
    Ts,
    Tsx,
    Js,
    Jsx,
    Json,
    Css,
}

impl Loader {
    /// The loader the host uses when no plugin claims a file.
    pub fn from_path(path: &Path) -> Option<Loader> {
        let ext = path.extension()?.to_str()?;
        let loader = match ext {
            "ts" | "mts" | "cts" => Loader::Ts,
            "tsx" => Loader::Tsx,
            "js" | "mjs" | "cjs" => Loader::Js,
            "jsx" => Loader::Jsx,
            "json" => Loader::Json,
            "css" => Loader::Css,
            _ => return None,
        };
        Some(loader)
    }

    /// Source type for script loaders, `None` for data loaders.
    pub fn source_type(self) -> Option<SourceType> {
        match self {
            Loader::Ts => Some(SourceType::ts()),
            Loader::Tsx => Some(SourceType::tsx()),
            Loader::Js => Some(SourceType::mjs()),
            Loader::Jsx => Some(SourceType::jsx()),
            Loader::Json | Loader::Css => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub contents: String,
    pub loader: Loader,
}

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn resolve_filter(&self) -> Option<&Regex> {
        None
    }

    fn on_resolve(&self, _args: &ResolveArgs<'_>) -> anyhow::Result<Option<ResolveResult>> {
        Ok(None)
    }

    fn load_filter(&self) -> Option<&Regex> {
        None
    }

    fn on_load(&self, _args: &LoadArgs<'_>) -> anyhow::Result<Option<LoadResult>> {
        Ok(None)
    }
}
