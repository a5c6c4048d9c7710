use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use crate::file_system::testing::MockFileSystem;
use crate::{
    find_config_file, parse_json_config_file_content, read_config_file, ConfigError, ScriptTarget,
};

fn parse(fs: &MockFileSystem, base: &str) -> Result<crate::ParsedCommandLine, ConfigError> {
    let base = Path::new(base);
    let config_path = base.join("tsconfig.json");
    let json = read_config_file(&config_path, fs)?;
    parse_json_config_file_content(&json, fs, base, Some(&config_path))
}

#[test]
fn test_find_config_file_walks_upward() {
    let fs = MockFileSystem::with_files("/", &[("repo/tsconfig.json", "{}"), ("repo/src/app/main.ts", "")]);
    assert_eq!(
        find_config_file(Path::new("/repo/src/app"), &fs),
        Some(PathBuf::from("/repo/tsconfig.json"))
    );
    assert_eq!(find_config_file(Path::new("/elsewhere"), &fs), None);
}

#[test]
fn test_read_config_file_accepts_comments_and_trailing_commas() {
    let fs = MockFileSystem::with_files(
        "/",
        &[(
            "p/tsconfig.json",
            r#"{
                // aliases
                "compilerOptions": {
                    "baseUrl": ".", /* root */
                    "paths": { "@app/*": ["src/app/*"], },
                },
            }"#,
        )],
    );
    let json = read_config_file(Path::new("/p/tsconfig.json"), &fs).unwrap();
    assert_eq!(json["compilerOptions"]["paths"]["@app/*"][0], "src/app/*");
}

#[test]
fn test_read_config_file_reports_structural_errors() {
    let fs = MockFileSystem::with_files("/", &[("p/tsconfig.json", "{ \"compilerOptions\": ")]);
    let err = read_config_file(Path::new("/p/tsconfig.json"), &fs).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    let fs = MockFileSystem::with_files("/", &[("p/tsconfig.json", "[]")]);
    let err = read_config_file(Path::new("/p/tsconfig.json"), &fs).unwrap_err();
    assert!(err.to_string().contains("must be an object"));
}

#[test]
fn test_parse_resolves_paths_against_base() {
    let fs = MockFileSystem::with_files(
        "/",
        &[
            (
                "p/tsconfig.json",
                r#"{ "compilerOptions": { "baseUrl": "./src", "outDir": "dist", "target": "ES2019",
                     "sourceMap": true, "paths": { "@utils/*": ["utils/*"] } } }"#,
            ),
            ("p/src/main.ts", ""),
        ],
    );
    let parsed = parse(&fs, "/p").unwrap();
    assert_eq!(parsed.options.base_url.as_deref(), Some("/p/src"));
    assert_eq!(parsed.options.out_dir.as_deref(), Some("/p/dist"));
    assert_eq!(parsed.options.target, Some(ScriptTarget::ES2019));
    assert_eq!(parsed.options.source_map, Some(true));
    assert_eq!(parsed.options.paths_base_path.as_deref(), Some("/p"));
    let paths = parsed.options.paths.unwrap();
    assert_eq!(paths["@utils/*"], vec!["utils/*".to_string()]);
}

#[test]
fn test_default_include_skips_excluded_directories() {
    let fs = MockFileSystem::with_files(
        "/",
        &[
            ("p/tsconfig.json", r#"{ "compilerOptions": { "outDir": "dist" } }"#),
            ("p/src/main.ts", ""),
            ("p/src/view.tsx", ""),
            ("p/src/types.d.ts", ""),
            ("p/src/legacy.js", ""),
            ("p/node_modules/dep/index.ts", ""),
            ("p/dist/main.ts", ""),
        ],
    );
    let parsed = parse(&fs, "/p").unwrap();
    assert_eq!(
        parsed.file_names,
        vec![
            PathBuf::from("/p/src/main.ts"),
            PathBuf::from("/p/src/types.d.ts"),
            PathBuf::from("/p/src/view.tsx"),
        ]
    );
    assert!(parsed.errors.is_empty());
}

#[test]
fn test_include_directory_and_allow_js() {
    let fs = MockFileSystem::with_files(
        "/",
        &[
            (
                "p/tsconfig.json",
                r#"{ "compilerOptions": { "allowJs": true }, "include": ["src"], "exclude": ["src/**/*.spec.ts"] }"#,
            ),
            ("p/src/a.ts", ""),
            ("p/src/a.spec.ts", ""),
            ("p/src/deep/b.js", ""),
            ("p/scripts/c.ts", ""),
        ],
    );
    let parsed = parse(&fs, "/p").unwrap();
    assert_eq!(
        parsed.file_names,
        vec![PathBuf::from("/p/src/a.ts"), PathBuf::from("/p/src/deep/b.js")]
    );
}

#[test]
fn test_files_list_disables_default_include() {
    let fs = MockFileSystem::with_files(
        "/",
        &[
            ("p/tsconfig.json", r#"{ "files": ["src/main.ts", "src/gone.ts"] }"#),
            ("p/src/main.ts", ""),
            ("p/src/other.ts", ""),
        ],
    );
    let parsed = parse(&fs, "/p").unwrap();
    assert_eq!(parsed.file_names, vec![PathBuf::from("/p/src/main.ts")]);
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].code, 6053);
}

#[test]
fn test_no_inputs_is_reported_not_fatal() {
    let fs = MockFileSystem::with_files("/", &[("p/tsconfig.json", "{}")]);
    let parsed = parse(&fs, "/p").unwrap();
    assert!(parsed.file_names.is_empty());
    assert_eq!(parsed.errors[0].code, 18003);
}

#[test]
fn test_extends_merges_options_relative_to_parent() {
    let fs = MockFileSystem::with_files(
        "/",
        &[
            (
                "p/config/base.json",
                r#"{ "compilerOptions": { "baseUrl": "..", "outDir": "../build", "sourceMap": true,
                     "paths": { "@lib/*": ["lib/*"] } }, "include": ["../src"] }"#,
            ),
            (
                "p/tsconfig.json",
                r#"{ "extends": "./config/base", "compilerOptions": { "outDir": "out" } }"#,
            ),
            ("p/src/main.ts", ""),
        ],
    );
    let parsed = parse(&fs, "/p").unwrap();
    assert_eq!(parsed.options.base_url.as_deref(), Some("/p"));
    assert_eq!(parsed.options.out_dir.as_deref(), Some("/p/out"));
    assert_eq!(parsed.options.source_map, Some(true));
    assert_eq!(parsed.options.paths_base_path.as_deref(), Some("/p/config"));
    assert_eq!(parsed.file_names, vec![PathBuf::from("/p/src/main.ts")]);
}

#[test]
fn test_extends_from_node_modules() {
    let fs = MockFileSystem::with_files(
        "/",
        &[
            ("p/node_modules/@tsconfig/node18/tsconfig.json", r#"{ "compilerOptions": { "target": "es2022" } }"#),
            ("p/tsconfig.json", r#"{ "extends": "@tsconfig/node18/tsconfig.json" }"#),
            ("p/main.ts", ""),
        ],
    );
    let parsed = parse(&fs, "/p").unwrap();
    assert_eq!(parsed.options.target, Some(ScriptTarget::ES2022));
}

#[test]
fn test_extends_errors() {
    let fs = MockFileSystem::with_files("/", &[("p/tsconfig.json", r#"{ "extends": "./missing.json" }"#)]);
    assert!(matches!(parse(&fs, "/p"), Err(ConfigError::ExtendsNotFound { .. })));

    let fs = MockFileSystem::with_files(
        "/",
        &[
            ("p/tsconfig.json", r#"{ "extends": "./a.json" }"#),
            ("p/a.json", r#"{ "extends": "./tsconfig.json" }"#),
        ],
    );
    assert!(matches!(parse(&fs, "/p"), Err(ConfigError::CircularExtends { .. })));
}

#[test]
fn test_invalid_option_value_is_a_parse_error() {
    let fs = MockFileSystem::with_files("/", &[("p/tsconfig.json", r#"{ "compilerOptions": { "target": "bogus" } }"#)]);
    assert!(matches!(parse(&fs, "/p"), Err(ConfigError::Parse { .. })));
}
