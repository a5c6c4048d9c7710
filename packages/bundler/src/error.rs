use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no loader is configured for {path}")]
    NoLoader { path: PathBuf },
    #[error("failed to parse {path}: {}", messages.join("; "))]
    Parse { path: PathBuf, messages: Vec<String> },
    #[error("failed to transform {path}: {}", messages.join("; "))]
    Transform { path: PathBuf, messages: Vec<String> },
    #[error("could not resolve \"{specifier}\" from {importer}")]
    Resolve { specifier: String, importer: PathBuf },
    #[error("[plugin {plugin}] {path}: {message}")]
    Plugin {
        plugin: String,
        path: PathBuf,
        message: String,
    },
    #[error("could not write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid external pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
