use crate::impl_case_insensitive_names;

/// The fixed set of external tools a checker can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolName {
    Pylint,
    Pep8,
    Compile,
    Find,
    Php,
}

impl_case_insensitive_names!(
    ToolName,
    Pylint => "pylint",
    Pep8 => "pep8",
    Compile => "compile",
    Find => "find",
    Php => "php"
);

impl ToolName {
    pub fn interpreter(&self) -> Interpreter {
        match self {
            ToolName::Php => Interpreter::Php,
            ToolName::Pylint | ToolName::Pep8 | ToolName::Compile | ToolName::Find => {
                Interpreter::Python
            }
        }
    }

    /// Prefix used for this tool's log lines and worker thread names
    pub fn label(&self) -> &'static str {
        match self {
            ToolName::Pylint => "Pylint",
            ToolName::Pep8 => "Pep8",
            ToolName::Compile => "CompileCheck",
            ToolName::Find => "PyFind",
            ToolName::Php => "PHP",
        }
    }
}

/// Interpreter family a tool runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpreter {
    Python,
    Php,
}

impl Interpreter {
    /// Executable names searched on `PATH`, most preferred first
    pub fn default_executables(&self) -> &'static [&'static str] {
        match self {
            Interpreter::Python => &["python3", "python"],
            Interpreter::Php => &["php"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interpreter::Python => "Python",
            Interpreter::Php => "PHP",
        }
    }
}
