pub mod formatter;

pub use formatter::{format_check_result, format_find_results, summary_line};
