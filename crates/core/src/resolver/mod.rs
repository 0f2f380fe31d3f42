//! Locating external interpreters and assembling their environment

pub mod environment;

pub use environment::{EnvironmentResolver, ResolutionSource, ResolvedTool};
