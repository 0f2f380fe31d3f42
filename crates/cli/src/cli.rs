use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use checkrunner_core::ToolName;

use crate::commands::{check_command, find_command, watch_command};

#[derive(Parser, Debug)]
#[command(name = "checkrunner")]
#[command(version, about = "Run Python and PHP checkers and collect their findings", long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check one file with an external tool
    #[command(visible_alias = "c")]
    Check {
        /// File to check
        file: PathBuf,

        /// Tool to run: pylint, pep8, compile or php (inferred from the extension if omitted)
        #[arg(short, long)]
        tool: Option<ToolName>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Terminate the tool after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Configuration file to use instead of the nearest .checkrunner.json
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Find the source files of a Python module
    #[command(visible_alias = "f")]
    Find {
        /// Module name, plain (`mime`) or dotted (`email.mime`)
        module: String,

        /// Directory searched before the interpreter's module path
        #[arg(short, long)]
        local: Option<PathBuf>,

        /// File whose directory variables add to the module search path
        #[arg(long, value_name = "FILE")]
        context: Option<PathBuf>,

        /// Stop at the first match
        #[arg(long)]
        first: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Configuration file to use instead of the nearest .checkrunner.json
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Re-check files under a directory whenever they are saved
    #[command(visible_alias = "w")]
    Watch {
        /// Directory to watch recursively
        dir: PathBuf,

        /// Tool to run on each saved file
        #[arg(short, long, default_value = "compile")]
        tool: ToolName,

        /// Configuration file to use instead of the nearest .checkrunner.json
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Check {
                file,
                tool,
                json,
                timeout,
                config,
            } => check_command(&file, tool, json, timeout, config.as_deref()),
            Commands::Find {
                module,
                local,
                context,
                first,
                json,
                config,
            } => find_command(
                &module,
                local.as_deref(),
                context.as_deref(),
                first,
                json,
                config.as_deref(),
            ),
            Commands::Watch { dir, tool, config } => watch_command(&dir, tool, config.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_arguments() {
        let cli = Cli::try_parse_from([
            "checkrunner", "check", "app/models.py", "--tool", "PEP8", "--json", "--timeout", "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Check {
                file,
                tool,
                json,
                timeout,
                config,
            } => {
                assert_eq!(file, PathBuf::from("app/models.py"));
                assert_eq!(tool, Some(ToolName::Pep8));
                assert!(json);
                assert_eq!(timeout, Some(5));
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        assert!(Cli::try_parse_from(["checkrunner", "check", "a.py", "--tool", "flake8"]).is_err());
    }

    #[test]
    fn test_watch_defaults_to_compile() {
        let cli = Cli::try_parse_from(["checkrunner", "watch", "."]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watch {
                tool: ToolName::Compile,
                ..
            }
        ));
    }
}
