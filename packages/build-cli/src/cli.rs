//! Command-line surface of the `tsbundle` binary.

use std::path::PathBuf;

use bundler::Format;
use clap::{Arg, ArgMatches, Command};

use crate::logging::LogLevel;
use crate::perform_build::BuildSettings;
use crate::rewrite::DEFAULT_LOAD_FILTER;

pub fn command() -> Command {
    Command::new("tsbundle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build a TypeScript project, rewriting tsconfig path aliases into relative imports")
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .value_name("PATH")
                .help("Path to tsconfig.json or a directory containing one"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .value_parser(["cjs", "esm"])
                .default_value("cjs")
                .help("Module format of the emitted files"),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("REGEX")
                .default_value(DEFAULT_LOAD_FILTER)
                .help("Files whose imports are rewritten"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["debug", "info", "warn", "error"])
                .default_value("info")
                .help("Log verbosity; RUST_LOG takes precedence"),
        )
}

/// Build settings and log level from parsed arguments.
pub fn settings_from_matches(matches: &ArgMatches) -> (BuildSettings, LogLevel) {
    let format = matches
        .get_one::<String>("format")
        .and_then(|f| f.parse::<Format>().ok())
        .unwrap_or_default();
    let level = matches
        .get_one::<String>("log-level")
        .and_then(|l| l.parse::<LogLevel>().ok())
        .unwrap_or_default();
    let settings = BuildSettings {
        project: matches.get_one::<String>("project").map(PathBuf::from),
        format,
        load_filter: matches
            .get_one::<String>("filter")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOAD_FILTER.to_string()),
    };
    (settings, level)
}
