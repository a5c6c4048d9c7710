use std::path::PathBuf;

use bundler::Format;

use crate::cli::{command, settings_from_matches};
use crate::logging::LogLevel;
use crate::rewrite::DEFAULT_LOAD_FILTER;

#[test]
fn test_defaults() {
    let matches = command().try_get_matches_from(["tsbundle"]).unwrap();
    let (settings, level) = settings_from_matches(&matches);
    assert_eq!(settings.project, None);
    assert_eq!(settings.format, Format::Cjs);
    assert_eq!(settings.load_filter, DEFAULT_LOAD_FILTER);
    assert_eq!(level, LogLevel::Info);
}

#[test]
fn test_all_flags() {
    let matches = command()
        .try_get_matches_from([
            "tsbundle",
            "-p",
            "app/tsconfig.build.json",
            "--format",
            "esm",
            "--filter",
            r"\.ts$",
            "--log-level",
            "debug",
        ])
        .unwrap();
    let (settings, level) = settings_from_matches(&matches);
    assert_eq!(settings.project, Some(PathBuf::from("app/tsconfig.build.json")));
    assert_eq!(settings.format, Format::Esm);
    assert_eq!(settings.load_filter, r"\.ts$");
    assert_eq!(level, LogLevel::Debug);
}

#[test]
fn test_rejects_unknown_format() {
    assert!(command().try_get_matches_from(["tsbundle", "--format", "umd"]).is_err());
}

#[test]
fn test_log_level_parsing() {
    assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert!("loud".parse::<LogLevel>().is_err());
    assert_eq!(LogLevel::Error.to_string(), "error");
}
