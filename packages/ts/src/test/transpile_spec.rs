use std::path::Path;

use crate::{transpile_module, CompilerOptions, ScriptTarget, TranspileError, TranspileOptions};

#[test]
fn test_transpile_strips_types() {
    let out = transpile_module(
        "const answer: number = 42;\nexport function id<T>(x: T): T { return x; }\n",
        &TranspileOptions::default(),
    )
    .unwrap();
    assert!(out.output_text.contains("const answer = 42"));
    assert!(out.output_text.contains("export function id(x)"));
    assert!(!out.output_text.contains(": number"));
    assert!(out.source_map_text.is_none());
}

#[test]
fn test_transpile_drops_type_only_imports() {
    let out = transpile_module(
        "import type { Shape } from './shape';\nexport const s: Shape | null = null;\n",
        &TranspileOptions::default(),
    )
    .unwrap();
    assert!(!out.output_text.contains("./shape"));
}

#[test]
fn test_transpile_emits_source_map_when_enabled() {
    let options = CompilerOptions {
        source_map: Some(true),
        ..CompilerOptions::default()
    };
    let out = transpile_module(
        "export const a: string = 'a';\n",
        &TranspileOptions {
            compiler_options: Some(&options),
            file_name: Some(Path::new("src/a.ts")),
        },
    )
    .unwrap();
    let map = out.source_map_text.expect("source map");
    assert!(map.contains("\"mappings\""));
}

#[test]
fn test_transpile_reports_syntax_errors() {
    let err = transpile_module("export const = ;", &TranspileOptions::default()).unwrap_err();
    assert!(matches!(err, TranspileError::Parse { .. }));
}

#[test]
fn test_transpile_lowers_legacy_decorators() {
    let source = "function sealed(target: unknown) { return target; }\n@sealed\nexport class Box {}\n";
    let plain = transpile_module(source, &TranspileOptions::default()).unwrap();
    assert!(plain.output_text.contains("@sealed"));

    let options = CompilerOptions {
        experimental_decorators: Some(true),
        ..CompilerOptions::default()
    };
    let out = transpile_module(
        source,
        &TranspileOptions {
            compiler_options: Some(&options),
            file_name: None,
        },
    )
    .unwrap();
    assert!(!out.output_text.contains("@sealed"), "{}", out.output_text);
}

#[test]
fn test_transpile_honors_target_and_remove_comments() {
    let options = CompilerOptions {
        target: Some(ScriptTarget::ES2019),
        remove_comments: Some(true),
        ..CompilerOptions::default()
    };
    let out = transpile_module(
        "// note\nexport const port = (cfg: { port?: number }) => cfg.port ?? 80;\n",
        &TranspileOptions {
            compiler_options: Some(&options),
            file_name: None,
        },
    )
    .unwrap();
    assert!(!out.output_text.contains("??"), "{}", out.output_text);
    assert!(!out.output_text.contains("note"));
}
