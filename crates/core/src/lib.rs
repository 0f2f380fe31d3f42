//! checkrunner-core - Run external code checkers off the UI thread
//!
//! This crate provides functionality to:
//! - Resolve the interpreter behind a tool from configuration or `PATH`
//! - Launch the tool with an explicit working directory and environment
//! - Parse pylint, pep8, py_compile and `php -l` output into result rows
//! - Deliver every result exactly once on the thread that owns the UI loop
pub mod checkers;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod interfaces;
pub mod parsers;
pub mod process;
pub mod resolver;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

pub use checkers::{
    CheckCallback, Checker, CompileChecker, FindResults, Pep8Checker, PhpChecker, PylintChecker,
    PythonModuleFinder, ToolContext, checker_for,
};
pub use command::ToolInvocation;
pub use config::{Config, DirectoryVariables};
pub use dispatch::{Dispatcher, ErrorMarks, FromFault, RequestTracker, TaskHandle, Ticket, UiLoop};
pub use interfaces::{ConfigStore, PathResolver};
pub use parsers::OutputParser;
pub use process::{EnvStrategy, ProcessHandle, ProcessRunner};
pub use resolver::{EnvironmentResolver, ResolvedTool};
