//! A small pluggable build host.
//!
//! [`build`] walks a module graph from a set of entry points, hands every
//! resolution request and every file load to the registered [`Plugin`]s, and
//! emits one JavaScript file per entry point. TypeScript stripping and code
//! generation are done by oxc; this crate only wires the pieces together.

pub mod build;
pub mod emit;
pub mod error;
pub mod format;
pub mod options;
pub mod plugin;
pub mod resolve;
pub mod scan;


pub use build::{build, BuildResult, OutputFile};
pub use error::BuildError;
pub use options::{BuildOptions, Format, SourceMapMode};
pub use plugin::{ImportKind, LoadArgs, LoadResult, Loader, Plugin, ResolveArgs, ResolveResult};
