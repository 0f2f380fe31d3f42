pub mod python_package;
pub mod serde_helpers;

pub use python_package::{PackageRoot, module_path};
