mod match_path;
mod resolver;

pub use match_path::*;
pub use resolver::*;
