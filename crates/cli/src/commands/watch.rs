use anyhow::{Context, Result, bail};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::{debug, info, warn};

use checkrunner_core::{
    CheckResult, ErrorMarks, RequestTracker, TaskHandle, Ticket, ToolContext, ToolName, UiLoop,
    checker_for,
};

use crate::display::summary_line;
use crate::utils::{absolute_path, is_source_for, load_config};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn watch_command(dir: &Path, tool: ToolName, config_path: Option<&Path>) -> Result<()> {
    let root = absolute_path(dir)?;
    if !root.is_dir() {
        bail!("Directory not found: {}", root.display());
    }
    if tool == ToolName::Find {
        bail!("'find' is not a checker, pick another --tool");
    }

    let config = load_config(config_path, &root)?;
    if tool == ToolName::Compile && !config.compile_on_save {
        bail!("compile_on_save is disabled in the configuration");
    }
    let context = ToolContext::new(Arc::new(config));

    let (event_tx, event_rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(event_tx).context("Failed to create file watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;
    println!("Watching {} with {} (Ctrl+C to stop)", root.display(), tool);

    let ui = UiLoop::new();
    let dispatcher = ui.dispatcher();
    let (done_tx, done_rx) = mpsc::channel::<(Ticket, CheckResult)>();
    let mut tracker = RequestTracker::new();
    let mut marks = ErrorMarks::new();
    let mut running: HashMap<PathBuf, TaskHandle> = HashMap::new();

    loop {
        let mut saved = BTreeSet::new();
        match event_rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => collect_saved(event, tool, &mut saved),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        while let Ok(event) = event_rx.try_recv() {
            collect_saved(event, tool, &mut saved);
        }

        for path in saved {
            // A newer save supersedes the check still running for this file
            if let Some(previous) = running.remove(&path) {
                if !previous.is_finished() {
                    debug!("Terminating superseded check of {:?}", path);
                    previous.terminate();
                }
            }
            let Some(checker) = checker_for(tool, context.clone(), &path) else {
                continue;
            };
            let ticket = tracker.begin(path.clone());
            let tx = done_tx.clone();
            let handle = checker.check(
                &dispatcher,
                Box::new(move |result| {
                    let _ = tx.send((ticket, result));
                }),
            );
            running.insert(path, handle);
        }

        ui.pump();
        while let Ok((ticket, result)) = done_rx.try_recv() {
            if !tracker.is_current(&ticket) {
                debug!("Dropping stale result for {:?}", ticket.target);
                continue;
            }
            running.remove(&ticket.target);
            report(&root, &ticket.target, &result, &mut marks);
        }
    }

    info!("File watcher stopped");
    Ok(())
}

fn collect_saved(event: notify::Result<Event>, tool: ToolName, saved: &mut BTreeSet<PathBuf>) {
    match event {
        Ok(event) => {
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            saved.extend(
                event
                    .paths
                    .into_iter()
                    .filter(|path| is_source_for(tool, path) && path.is_file()),
            );
        }
        Err(e) => warn!("File watcher error: {}", e),
    }
}

fn report(root: &Path, target: &Path, result: &CheckResult, marks: &mut ErrorMarks) {
    let shown = target.strip_prefix(root).unwrap_or(target);
    println!("{}: {}", shown.display(), summary_line(result));
    match marks.record(target, result) {
        Some(mark) => println!("  line {}: {}", mark.location, mark.message),
        None => {
            for row in result.rows.iter().filter(|row| row.location.is_none()) {
                println!("  {}", row.message);
            }
        }
    }
}
