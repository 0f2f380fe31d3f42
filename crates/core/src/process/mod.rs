//! Spawning external tools and capturing their output

mod env_guard;
pub mod handle;
pub mod runner;

pub use handle::ProcessHandle;
pub use runner::{EnvStrategy, ProcessRunner};
