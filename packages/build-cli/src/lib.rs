//! Build pipeline for TypeScript projects that use `compilerOptions.paths`.
//!
//! [`perform_build`] loads `tsconfig.json`, runs an analysis build that
//! records where every aliased import resolves to, then runs the real build
//! with each alias rewritten into a relative import.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod perform_build;
pub mod rewrite;

#[cfg(test)]
mod test;

pub use analysis::{run_analysis, ImportAnalyzePlugin, ImportTable, ImportTableBuilder};
pub use config::ProjectConfig;
pub use error::BuildError;
pub use paths::{AliasTable, PathResolver, Resolution};
pub use perform_build::{perform_build, BuildOutcome, BuildPipeline, BuildSettings, BuildState};
pub use rewrite::{rewrite_imports, run_rewrite, transform_load, AliasRewritePlugin};
