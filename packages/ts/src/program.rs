use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{Diagnostic, JsxEmit, ScriptTarget};

/// The subset of `compilerOptions` the build reads.
///
/// Options not listed here are accepted and ignored. Path-valued options are
/// stored exactly as written; [`crate::parse_json_config_file_content`]
/// rewrites them to absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub allow_js: Option<bool>,
    pub base_url: Option<String>,
    pub emit_decorator_metadata: Option<bool>,
    pub experimental_decorators: Option<bool>,
    pub inline_source_map: Option<bool>,
    pub jsx: Option<JsxEmit>,
    pub out_dir: Option<String>,
    pub paths: Option<IndexMap<String, Vec<String>>>,
    pub remove_comments: Option<bool>,
    pub root_dir: Option<String>,
    pub source_map: Option<bool>,
    pub target: Option<ScriptTarget>,
    /// Directory `paths` are resolved against when `baseUrl` is unset.
    #[serde(skip)]
    pub paths_base_path: Option<String>,
}

impl CompilerOptions {
    /// Overlays `other` on top of `self`, key by key.
    pub fn merge(&mut self, other: CompilerOptions) {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        overlay!(
            allow_js,
            base_url,
            emit_decorator_metadata,
            experimental_decorators,
            inline_source_map,
            jsx,
            out_dir,
            paths,
            remove_comments,
            root_dir,
            source_map,
            target,
            paths_base_path
        );
    }
}

/// Fully resolved configuration, the result of
/// [`crate::parse_json_config_file_content`].
#[derive(Debug, Clone, Default)]
pub struct ParsedCommandLine {
    pub options: CompilerOptions,
    /// Root source files, absolute, sorted and de-duplicated.
    pub file_names: Vec<PathBuf>,
    /// Non-fatal problems found while resolving the configuration.
    pub errors: Vec<Diagnostic>,
}
