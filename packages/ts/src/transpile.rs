//! Single-file transpilation, the counterpart of `ts.transpileModule`.
//!
//! No type information is used: the module is parsed, its TypeScript syntax
//! stripped and JavaScript generated again.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{CompilerOptions, JsxEmit, ScriptTarget};

#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("failed to parse {file}: {}", messages.join("; "))]
    Parse { file: PathBuf, messages: Vec<String> },
    #[error("failed to transform {file}: {}", messages.join("; "))]
    Transform { file: PathBuf, messages: Vec<String> },
}

#[derive(Debug, Clone, Default)]
pub struct TranspileOptions<'a> {
    pub compiler_options: Option<&'a CompilerOptions>,
    /// Name used for diagnostics and to pick the source dialect.
    pub file_name: Option<&'a Path>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOutput {
    pub output_text: String,
    /// Present when `sourceMap` is enabled in the compiler options.
    pub source_map_text: Option<String>,
}

/// Transpile one module from TypeScript to JavaScript.
pub fn transpile_module(input: &str, options: &TranspileOptions<'_>) -> Result<TranspileOutput, TranspileError> {
    let compiler_options = options.compiler_options.cloned().unwrap_or_default();
    let file_name = match options.file_name {
        Some(name) => name.to_path_buf(),
        None if jsx_enabled(&compiler_options) => PathBuf::from("module.tsx"),
        None => PathBuf::from("module.ts"),
    };
    let source_type = SourceType::from_path(&file_name).unwrap_or_else(|_| SourceType::ts());

    let allocator = Allocator::default();
    let mut parse_result = Parser::new(&allocator, input, source_type).parse();
    if !parse_result.errors.is_empty() {
        return Err(TranspileError::Parse {
            file: file_name,
            messages: parse_result.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let semantic = SemanticBuilder::new()
        .with_excess_capacity(0.0)
        .build(&parse_result.program);

    let transform_options = transform_options(&compiler_options);
    let transformer = Transformer::new(&allocator, &file_name, &transform_options);
    let transformed =
        transformer.build_with_scoping(semantic.semantic.into_scoping(), &mut parse_result.program);
    if !transformed.errors.is_empty() {
        return Err(TranspileError::Transform {
            file: file_name,
            messages: transformed.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let want_map = compiler_options.source_map.unwrap_or(false);
    let codegen_options = codegen_options(&compiler_options, want_map.then(|| file_name.clone()));
    let generated = Codegen::new()
        .with_options(codegen_options)
        .build(&parse_result.program);

    debug!(file = %file_name.display(), "transpiled module");
    Ok(TranspileOutput {
        output_text: generated.code,
        source_map_text: generated.map.map(|map| map.to_json_string()),
    })
}

/// The oxc transform matching `options`: `target` picks the syntax level
/// and `experimentalDecorators` selects legacy decorators.
pub fn transform_options(options: &CompilerOptions) -> TransformOptions {
    let mut transform = match options.target {
        Some(target) => TransformOptions::from_target(oxc_target(target)).unwrap_or_else(|message| {
            warn!(error = %message, "unsupported target, keeping syntax as written");
            TransformOptions::default()
        }),
        None => TransformOptions::default(),
    };
    transform.decorator.legacy = options.experimental_decorators.unwrap_or(false);
    transform.decorator.emit_decorator_metadata = options.emit_decorator_metadata.unwrap_or(false);
    transform
}

pub fn codegen_options(options: &CompilerOptions, source_map_path: Option<PathBuf>) -> CodegenOptions {
    let mut codegen = CodegenOptions {
        source_map_path,
        ..CodegenOptions::default()
    };
    if options.remove_comments.unwrap_or(false) {
        codegen.comments = CommentOptions::disabled();
    }
    codegen
}

fn oxc_target(target: ScriptTarget) -> &'static str {
    match target {
        ScriptTarget::ES3 | ScriptTarget::ES5 => "es5",
        ScriptTarget::ES2015 => "es2015",
        ScriptTarget::ES2016 => "es2016",
        ScriptTarget::ES2017 => "es2017",
        ScriptTarget::ES2018 => "es2018",
        ScriptTarget::ES2019 => "es2019",
        ScriptTarget::ES2020 => "es2020",
        ScriptTarget::ES2021 => "es2021",
        ScriptTarget::ES2022 => "es2022",
        ScriptTarget::ESNext | ScriptTarget::JSON | ScriptTarget::Latest => "esnext",
    }
}

fn jsx_enabled(options: &CompilerOptions) -> bool {
    !matches!(options.jsx, None | Some(JsxEmit::None))
}
