//! Configuration management for checkrunner

pub mod dir_vars;
mod settings;
pub mod validation;

// Re-export main types
pub use dir_vars::{DirectoryVariables, DIRVAR_FILE_NAME};
pub use settings::{Config, ToolSettings, CONFIG_FILE_NAMES};
pub use validation::{ConfigValidator, MainConfigValidator};
