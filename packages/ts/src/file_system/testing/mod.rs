//! In-memory file system for tests.

mod mock_file_system;

pub use mock_file_system::*;
