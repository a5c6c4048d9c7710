//! File System Abstraction
//!
//! Every component that touches the disk goes through [`FileSystem`], so the
//! build can run against [`testing::MockFileSystem`] in tests.

mod node_js_file_system;
mod types;
mod util;

pub mod testing;

#[cfg(test)]
mod test;

pub use node_js_file_system::*;
pub use types::*;
pub use util::*;
