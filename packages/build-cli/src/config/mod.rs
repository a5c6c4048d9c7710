//! Project configuration
//!
//! Everything the two passes need from `tsconfig.json`.

mod project;

pub use project::*;
