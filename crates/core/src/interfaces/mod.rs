//! Trait seams between the core and its environment
//!
//! The host supplies configuration through `ConfigStore`; filesystem lookups
//! go through `PathResolver` so tests can substitute either.

pub mod config_store;
pub mod path_resolver;

pub use config_store::ConfigStore;
pub use path_resolver::PathResolver;
