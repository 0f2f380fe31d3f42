use anyhow::{Result, bail};
use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use checkrunner_core::{ToolContext, ToolName, UiLoop, checker_for};

use crate::display::format_check_result;
use crate::utils::{absolute_path, infer_tool, load_config};

pub fn check_command(
    file: &Path,
    tool: Option<ToolName>,
    json: bool,
    timeout: Option<u64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let target = absolute_path(file)?;
    if !target.is_file() {
        bail!("File not found: {}", target.display());
    }

    let Some(tool) = tool.or_else(|| infer_tool(&target)) else {
        bail!(
            "Cannot pick a tool for {}, pass --tool ({})",
            target.display(),
            ToolName::NAMES.join(", ")
        );
    };
    if tool == ToolName::Find {
        bail!("'find' is not a checker, use the find subcommand");
    }
    debug!("Checking {:?} with {}", target, tool);

    let start_dir = target.parent().unwrap_or(&target);
    let config = load_config(config_path, start_dir)?;
    let context = ToolContext::new(Arc::new(config));
    let Some(checker) = checker_for(tool, context, &target) else {
        bail!("No checker for {tool}");
    };

    let ui = UiLoop::new();
    let (tx, rx) = mpsc::channel();
    let handle = checker.check(
        &ui.dispatcher(),
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );

    let mut timed_out = false;
    match timeout {
        Some(secs) => {
            let deadline = Instant::now() + Duration::from_secs(secs);
            if !ui.run_until_idle_or(deadline) {
                warn!("{} did not finish within {}s, terminating", tool.label(), secs);
                eprintln!("{} timed out after {}s", tool.label(), secs);
                handle.terminate();
                ui.run_until_idle();
                timed_out = true;
            }
        }
        None => ui.run_until_idle(),
    }

    let Ok(result) = rx.try_recv() else {
        bail!("{} finished without a result", tool.label());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_check_result(file, &result));
    }

    if timed_out || result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
