use std::path::{Path, PathBuf};

use bundler::SourceMapMode;
use ts::file_system::testing::MockFileSystem;
use ts::CompilerOptions;

use crate::config::{source_map_mode, ProjectConfig};
use crate::BuildError;

#[test]
fn test_source_map_mode_mapping() {
    let mode = |source_map: Option<bool>, inline: Option<bool>| {
        source_map_mode(&CompilerOptions {
            source_map,
            inline_source_map: inline,
            ..CompilerOptions::default()
        })
    };
    assert_eq!(mode(None, None), SourceMapMode::None);
    assert_eq!(mode(Some(false), Some(true)), SourceMapMode::None);
    assert_eq!(mode(None, Some(true)), SourceMapMode::None);
    assert_eq!(mode(Some(true), None), SourceMapMode::External);
    assert_eq!(mode(Some(true), Some(false)), SourceMapMode::External);
    assert_eq!(mode(Some(true), Some(true)), SourceMapMode::Inline);
}

#[test]
fn test_load_searches_upward_and_defaults_to_cwd() {
    let fs = MockFileSystem::with_files(
        "/repo/src",
        &[
            ("../tsconfig.json", r#"{ "compilerOptions": { "paths": { "@/*": ["./*"] } }, "include": ["*.ts"] }"#),
            ("main.ts", ""),
        ],
    );
    let config = ProjectConfig::load(&fs, None).unwrap();
    assert_eq!(config.config_path, PathBuf::from("/repo/tsconfig.json"));
    assert_eq!(config.base_path, PathBuf::from("/repo/src"));
    assert_eq!(config.out_dir, PathBuf::from("/repo/src"));
    assert_eq!(config.base_url, PathBuf::from("/repo/src"));
    assert_eq!(config.entry_points, vec![PathBuf::from("/repo/src/main.ts")]);
    assert_eq!(config.source_map, SourceMapMode::None);
    assert_eq!(config.aliases.len(), 1);
}

#[test]
fn test_explicit_project_sets_base_path() {
    let fs = MockFileSystem::with_files(
        "/work",
        &[
            (
                "app/tsconfig.json",
                r#"{
                    "compilerOptions": {
                        "outDir": "dist",
                        "baseUrl": "src",
                        "sourceMap": true,
                        "inlineSourceMap": true,
                        "paths": { "@lib/*": ["lib/*"] }
                    }
                }"#,
            ),
            ("app/src/lib/a.ts", ""),
        ],
    );
    for project in ["app", "app/tsconfig.json", "/work/app"] {
        let config = ProjectConfig::load(&fs, Some(Path::new(project))).unwrap();
        assert_eq!(config.base_path, PathBuf::from("/work/app"));
        assert_eq!(config.out_dir, PathBuf::from("/work/app/dist"));
        assert_eq!(config.base_url, PathBuf::from("/work/app/src"));
        assert_eq!(config.source_map, SourceMapMode::Inline);
        assert_eq!(
            config.aliases.candidates("@lib/a").to_vec(),
            vec![PathBuf::from("/work/app/src/lib/a")]
        );
    }
}

#[test]
fn test_paths_without_base_url_are_relative_to_declaring_config() {
    let fs = MockFileSystem::with_files(
        "/p",
        &[
            ("configs/base.json", r#"{ "compilerOptions": { "paths": { "@shared/*": ["../shared/*"] } } }"#),
            ("tsconfig.json", r#"{ "extends": "./configs/base.json", "include": ["src"] }"#),
            ("src/main.ts", ""),
        ],
    );
    let config = ProjectConfig::load(&fs, None).unwrap();
    assert_eq!(config.aliases.base(), Path::new("/p/configs"));
    assert_eq!(
        config.aliases.candidates("@shared/x").to_vec(),
        vec![PathBuf::from("/p/shared/x")]
    );
}

#[test]
fn test_missing_config_is_reported() {
    let fs = MockFileSystem::with_files("/p", &[("src/main.ts", "")]);
    let err = ProjectConfig::load(&fs, None).unwrap_err();
    assert!(matches!(err, BuildError::ConfigNotFound { search_dir } if search_dir == PathBuf::from("/p")));

    let err = ProjectConfig::load(&fs, Some(Path::new("nowhere"))).unwrap_err();
    assert!(matches!(err, BuildError::ConfigNotFound { .. }));
}

#[test]
fn test_invalid_config_is_a_parse_error() {
    let fs = MockFileSystem::with_files("/p", &[("tsconfig.json", "{ \"compilerOptions\": ")]);
    let err = ProjectConfig::load(&fs, None).unwrap_err();
    assert!(matches!(err, BuildError::ConfigParse(_)));
}
