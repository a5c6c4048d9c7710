use std::path::{Path, PathBuf};

use bundler::Loader;
use pretty_assertions::assert_eq;
use ts::file_system::testing::MockFileSystem;
use ts::{transpile_module, CompilerOptions, TranspileOptions};

use crate::analysis::{FileImports, ImportTableBuilder};
use crate::rewrite::{rewrite_imports, transform_load};
use crate::BuildError;

fn imports(entries: &[(&str, Option<&str>)]) -> FileImports {
    entries
        .iter()
        .map(|(spec, path)| (spec.to_string(), path.map(PathBuf::from)))
        .collect()
}

#[test]
fn test_alias_becomes_relative_path_with_extension() {
    let table = imports(&[("@app/widget", Some("/p/src/widget.ts"))]);
    let out = rewrite_imports(
        "import { w } from '@app/widget';\n",
        Path::new("/p/src/app/index.ts"),
        &table,
    );
    assert_eq!(out, "import { w } from '../widget.ts';\n");
}

#[test]
fn test_same_directory_gets_dot_slash() {
    let table = imports(&[("@utils/log", Some("/p/src/utils/log.ts"))]);
    let out = rewrite_imports(
        "import { log } from \"@utils/log\";\nconst lazy = import(`@utils/log`);\n",
        Path::new("/p/src/main.ts"),
        &table,
    );
    assert_eq!(
        out,
        "import { log } from \"./utils/log.ts\";\nconst lazy = import(`./utils/log.ts`);\n"
    );
}

#[test]
fn test_only_exact_quoted_occurrences_change() {
    let table = imports(&[("@app/widget", Some("/p/src/widget.ts"))]);
    let source = "import a from '@app/widget-extra';\n// see @app/widget docs\nimport b from '@app/widget';\n";
    let out = rewrite_imports(source, Path::new("/p/src/main.ts"), &table);
    assert_eq!(
        out,
        "import a from '@app/widget-extra';\n// see @app/widget docs\nimport b from './widget.ts';\n"
    );
}

#[test]
fn test_unresolved_and_relative_specifiers_are_kept() {
    let table = imports(&[
        ("@missing/thing", None),
        ("./local", Some("/p/src/local.ts")),
    ]);
    let source = "import t from '@missing/thing';\nimport l from './local';\n";
    assert_eq!(rewrite_imports(source, Path::new("/p/src/main.ts"), &table), source);
}

#[test]
fn test_rewriting_twice_is_a_no_op() {
    let table = imports(&[
        ("@app/widget", Some("/p/src/widget.ts")),
        ("@lib", Some("/p/libs/lib/index.ts")),
    ]);
    let importer = Path::new("/p/src/app/index.ts");
    let once = rewrite_imports("import '@app/widget';\nimport '@lib';\n", importer, &table);
    let twice = rewrite_imports(&once, importer, &table);
    assert_eq!(once, "import '../widget.ts';\nimport '../../libs/lib/index.ts';\n");
    assert_eq!(twice, once);
}

#[test]
fn test_transform_load_rewrites_recorded_imports() {
    let fs = MockFileSystem::with_files("/", &[("p/src/main.ts", "import { log } from '@utils/log';\nlog(1);\n")]);
    let builder = ImportTableBuilder::new();
    builder.record(
        Path::new("/p/src/main.ts"),
        "@utils/log",
        Some(PathBuf::from("/p/src/utils/log.ts")),
    );
    let table = builder.freeze();

    let loaded = transform_load(&fs, Path::new("/p/src/main.ts"), &table, &CompilerOptions::default()).unwrap();
    assert_eq!(loaded.loader, Loader::Tsx);
    assert_eq!(loaded.contents, "import { log } from './utils/log.ts';\nlog(1);\n");
}

#[test]
fn test_marker_runs_transpile_module() {
    let source = "// transpileModule = On\nenum Color { Red, Green }\nexport const c: Color = Color.Green;\n";
    let fs = MockFileSystem::with_files("/", &[("p/src/color.ts", source)]);
    let options = CompilerOptions::default();
    let path = Path::new("/p/src/color.ts");

    let loaded = transform_load(&fs, path, &Default::default(), &options).unwrap();
    let expected = transpile_module(
        source,
        &TranspileOptions {
            compiler_options: Some(&options),
            file_name: Some(path),
        },
    )
    .unwrap();
    assert_eq!(loaded.contents, expected.output_text);
    assert!(!loaded.contents.contains(": Color"));
}

#[test]
fn test_marker_needs_exact_spelling() {
    let source = "//transpileModule = On\nexport const a: number = 1;\n";
    let fs = MockFileSystem::with_files("/", &[("p/a.ts", source)]);
    let loaded = transform_load(&fs, Path::new("/p/a.ts"), &Default::default(), &CompilerOptions::default()).unwrap();
    assert_eq!(loaded.contents, source);
}

#[test]
fn test_transform_load_errors() {
    let fs = MockFileSystem::with_files("/", &[("p/bad.ts", "// transpileModule = On\nexport const = ;\n")]);
    let options = CompilerOptions::default();

    let err = transform_load(&fs, Path::new("/p/missing.ts"), &Default::default(), &options).unwrap_err();
    assert!(matches!(err, BuildError::FileRead { .. }));

    let err = transform_load(&fs, Path::new("/p/bad.ts"), &Default::default(), &options).unwrap_err();
    assert!(matches!(err, BuildError::Transform { .. }));
}

#[test]
fn test_marker_honors_experimental_decorators() {
    let source = "// transpileModule = On\nfunction sealed(target: unknown) { return target; }\n@sealed\nexport class Box {}\n";
    let fs = MockFileSystem::with_files("/", &[("p/src/box.ts", source)]);
    let options = CompilerOptions {
        experimental_decorators: Some(true),
        ..CompilerOptions::default()
    };
    let loaded = transform_load(&fs, Path::new("/p/src/box.ts"), &Default::default(), &options).unwrap();
    assert!(!loaded.contents.contains("@sealed"), "{}", loaded.contents);
    assert!(loaded.contents.contains("Box"));
}
