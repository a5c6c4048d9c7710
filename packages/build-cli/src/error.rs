use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not find tsconfig.json from {search_dir}")]
    ConfigNotFound { search_dir: PathBuf },
    #[error("invalid configuration")]
    ConfigParse(#[from] ts::ConfigError),
    #[error("could not read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("transpileModule failed for {path}")]
    Transform {
        path: PathBuf,
        #[source]
        source: ts::TranspileError,
    },
    #[error("invalid load filter '{pattern}'")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("build failed")]
    Bundle(#[from] bundler::BuildError),
}
