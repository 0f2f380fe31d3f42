pub mod check_result;
pub mod output;
pub mod severity;
pub mod tool;

// Re-export commonly used types
pub use check_result::{CheckResult, CheckRow, Location};
pub use output::CapturedOutput;
pub use severity::Severity;
pub use tool::{Interpreter, ToolName};
