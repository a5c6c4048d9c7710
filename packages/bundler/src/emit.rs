use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::Transformer;
use tracing::debug;

use crate::build::OutputFile;
use crate::{format, BuildError, BuildOptions, Format, Loader, SourceMapMode};

/// A module as handed over by a load hook or read from disk.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub contents: String,
    pub loader: Loader,
}

struct Compiled {
    code: String,
    /// Data URL for inline maps, JSON for external ones.
    map_text: Option<String>,
}

/// Produce the output file(s) for one entry module: the JavaScript (or CSS)
/// itself plus an external `.map` when requested.
pub fn emit_module(module: &LoadedModule, output_path: &Path, options: &BuildOptions) -> Result<Vec<OutputFile>, BuildError> {
    let source_type = match module.loader.source_type() {
        Some(source_type) => source_type,
        None => {
            let contents = emit_data_module(module, options.format)?;
            return Ok(vec![OutputFile {
                path: output_path.to_path_buf(),
                contents,
            }]);
        }
    };

    let output_dir = output_path.parent().unwrap_or(Path::new("."));
    let map_source = (options.sourcemap != SourceMapMode::None)
        .then(|| PathBuf::from(ts::file_system::relative(output_dir, &module.path)));
    let compiled = compile(module, source_type, map_source, options)?;
    let mut code = format::finalize(&module.path, &compiled.code, options.format)?;
    if !code.ends_with('\n') {
        code.push('\n');
    }

    let mut outputs = Vec::with_capacity(2);
    match (options.sourcemap, compiled.map_text) {
        (SourceMapMode::Inline, Some(data_url)) => {
            code.push_str(&format!("//# sourceMappingURL={}\n", data_url));
        }
        (SourceMapMode::External, Some(json)) => {
            let map_path = with_appended_extension(output_path, "map");
            let map_name = map_path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            code.push_str(&format!("//# sourceMappingURL={}\n", map_name));
            outputs.push(OutputFile {
                path: map_path,
                contents: json,
            });
        }
        _ => {}
    }

    debug!(path = %module.path.display(), output = %output_path.display(), "emitted module");
    outputs.insert(
        0,
        OutputFile {
            path: output_path.to_path_buf(),
            contents: code,
        },
    );
    Ok(outputs)
}

fn compile(
    module: &LoadedModule,
    source_type: SourceType,
    map_source: Option<PathBuf>,
    options: &BuildOptions,
) -> Result<Compiled, BuildError> {
    let allocator = Allocator::default();
    let mut parse_result = Parser::new(&allocator, &module.contents, source_type).parse();
    if !parse_result.errors.is_empty() {
        return Err(BuildError::Parse {
            path: module.path.clone(),
            messages: parse_result.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let semantic = SemanticBuilder::new()
        .with_excess_capacity(0.0)
        .build(&parse_result.program);

    let transform_options = ts::transform_options(&options.compiler_options);
    let transformed = Transformer::new(&allocator, &module.path, &transform_options)
        .build_with_scoping(semantic.semantic.into_scoping(), &mut parse_result.program);
    if !transformed.errors.is_empty() {
        return Err(BuildError::Transform {
            path: module.path.clone(),
            messages: transformed.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let generated = Codegen::new()
        .with_options(ts::codegen_options(&options.compiler_options, map_source))
        .build(&parse_result.program);

    let map_text = generated.map.and_then(|map| match options.sourcemap {
        SourceMapMode::Inline => Some(map.to_data_url()),
        SourceMapMode::External => Some(map.to_json_string()),
        SourceMapMode::None => None,
    });
    Ok(Compiled {
        code: generated.code,
        map_text,
    })
}

fn emit_data_module(module: &LoadedModule, format: Format) -> Result<String, BuildError> {
    match module.loader {
        Loader::Json => {
            serde_json::from_str::<serde_json::Value>(&module.contents).map_err(|e| BuildError::Parse {
                path: module.path.clone(),
                messages: vec![e.to_string()],
            })?;
            let body = module.contents.trim();
            Ok(match format {
                Format::Cjs => format!("module.exports = {};\n", body),
                Format::Esm => format!("export default {};\n", body),
            })
        }
        _ => Ok(module.contents.clone()),
    }
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}
