//! Default implementations of the core interfaces

pub mod default_path_resolver;

pub use default_path_resolver::DefaultPathResolver;
