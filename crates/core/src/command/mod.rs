//! External tool command lines

pub mod invocation;

// Re-export commonly used types
pub use invocation::{EnvOverlay, ToolInvocation};
