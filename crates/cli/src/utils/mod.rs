pub mod config;
pub mod file;

pub use config::load_config;
pub use file::{absolute_path, infer_tool, is_source_for};
