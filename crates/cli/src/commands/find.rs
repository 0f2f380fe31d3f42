use anyhow::{Result, bail};
use std::path::Path;
use std::sync::{Arc, mpsc};
use tracing::debug;

use checkrunner_core::{PythonModuleFinder, ToolContext, UiLoop};

use crate::display::format_find_results;
use crate::utils::{absolute_path, load_config};

pub fn find_command(
    module: &str,
    local: Option<&Path>,
    context_file: Option<&Path>,
    first: bool,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    if module.trim().is_empty() {
        bail!("Module name must not be empty");
    }

    let cwd = std::env::current_dir()?;
    let local = local.map(absolute_path).transpose()?;
    let start_dir = local.clone().unwrap_or(cwd);
    let config = load_config(config_path, &start_dir)?;
    let context = ToolContext::new(Arc::new(config));

    let mut finder = PythonModuleFinder::new(context, module).with_first_match(first);
    if let Some(dir) = local {
        finder = finder.with_local_dir(dir);
    }
    if let Some(file) = context_file {
        finder = finder.with_context_file(absolute_path(file)?);
    }
    debug!("Searching for module {:?}", finder.module());

    let ui = UiLoop::new();
    let (tx, rx) = mpsc::channel();
    Arc::new(finder).find(
        &ui.dispatcher(),
        Box::new(move |found| {
            let _ = tx.send(found);
        }),
    );
    ui.run_until_idle();

    let Ok(found) = rx.try_recv() else {
        bail!("Module search finished without a result");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        print!("{}", format_find_results(module, &found));
    }

    if !found.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
