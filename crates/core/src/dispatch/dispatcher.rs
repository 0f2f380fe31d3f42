use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use super::{
    fault::FromFault,
    ui_loop::{LoopCounters, UiMessage},
};
use crate::{
    error::{Error, Result},
    process::ProcessHandle,
};

type Callback<R> = Box<dyn FnOnce(R) + Send + 'static>;

/// Holds the completion until exactly one party takes it: the worker when
/// it finishes, or the dispatcher when the worker could not be started.
struct CompletionSlot<R> {
    callback: Arc<Mutex<Option<Callback<R>>>>,
}

impl<R> Clone for CompletionSlot<R> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<R: Send + 'static> CompletionSlot<R> {
    fn new(callback: Callback<R>) -> Self {
        Self {
            callback: Arc::new(Mutex::new(Some(callback))),
        }
    }

    fn take(&self) -> Option<Callback<R>> {
        self.callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// Cloneable, `Send` front end of a [`UiLoop`](super::UiLoop).
///
/// Each dispatch runs on its own named thread. No pooling.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Sender<UiMessage>,
    counters: Arc<LoopCounters>,
}

impl Dispatcher {
    pub(crate) fn new(sender: Sender<UiMessage>, counters: Arc<LoopCounters>) -> Self {
        Self { sender, counters }
    }

    /// Run `work` on a worker thread and deliver its value to `on_complete`
    /// on the UI thread. `on_complete` runs exactly once: errors and panics
    /// in `work` are turned into an `R` through [`FromFault`].
    pub fn dispatch<R, W, C>(&self, label: impl Into<String>, work: W, on_complete: C) -> TaskHandle
    where
        R: FromFault + Send + 'static,
        W: FnOnce() -> Result<R> + Send + 'static,
        C: FnOnce(R) + Send + 'static,
    {
        self.spawn_task(label.into(), None, move |_| work(), on_complete)
    }

    /// Like `dispatch`, for work that launches a child process. The process
    /// handle given to `work` is the one `TaskHandle::terminate` kills.
    pub fn dispatch_process<R, W, C>(
        &self,
        label: impl Into<String>,
        work: W,
        on_complete: C,
    ) -> TaskHandle
    where
        R: FromFault + Send + 'static,
        W: FnOnce(&ProcessHandle) -> Result<R> + Send + 'static,
        C: FnOnce(R) + Send + 'static,
    {
        self.spawn_task(label.into(), Some(ProcessHandle::new()), work, on_complete)
    }

    fn spawn_task<R, W, C>(
        &self,
        label: String,
        process: Option<ProcessHandle>,
        work: W,
        on_complete: C,
    ) -> TaskHandle
    where
        R: FromFault + Send + 'static,
        W: FnOnce(&ProcessHandle) -> Result<R> + Send + 'static,
        C: FnOnce(R) + Send + 'static,
    {
        let id = self.counters.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let finished = Arc::new(AtomicBool::new(false));
        let slot = CompletionSlot::new(Box::new(on_complete));

        self.counters.pending.fetch_add(1, Ordering::SeqCst);

        let delivery = Delivery {
            id,
            label: label.clone(),
            sender: self.sender.clone(),
            finished: Arc::clone(&finished),
            slot: slot.clone(),
        };
        let worker_process = process.clone().unwrap_or_default();
        let worker_label = label.clone();

        debug!("[{}][info] Dispatching task {}", label, id);
        let spawned = std::thread::Builder::new()
            .name(format!("checkrunner-{label}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&worker_process)));
                let value = match outcome {
                    Ok(Ok(value)) => value,
                    Ok(Err(e)) => {
                        error!("[{}][err] {}", worker_label, e);
                        R::from_fault(&e)
                    }
                    Err(panic_err) => {
                        let fault = Error::WorkerThreadFault {
                            label: worker_label.clone(),
                            message: panic_message(panic_err.as_ref()),
                        };
                        error!("[{}][err] {}", worker_label, fault);
                        R::from_fault(&fault)
                    }
                };
                delivery.deliver(value);
            });

        if let Err(e) = spawned {
            // The closure, and with it the worker's Delivery, is gone. The
            // slot still holds the callback, so complete through it here.
            let fault = Error::WorkerThreadFault {
                label: label.clone(),
                message: format!("could not start worker thread: {e}"),
            };
            error!("[{}][err] {}", label, fault);
            Delivery {
                id,
                label: label.clone(),
                sender: self.sender.clone(),
                finished: Arc::clone(&finished),
                slot,
            }
            .deliver(R::from_fault(&fault));
        }

        TaskHandle {
            id,
            label,
            process,
            finished,
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.counters.pending.load(Ordering::SeqCst))
            .finish()
    }
}

struct Delivery<R> {
    id: u64,
    label: String,
    sender: Sender<UiMessage>,
    finished: Arc<AtomicBool>,
    slot: CompletionSlot<R>,
}

impl<R: Send + 'static> Delivery<R> {
    fn deliver(self, value: R) {
        let Some(callback) = self.slot.take() else {
            warn!("[{}][warn] Task {} already completed", self.label, self.id);
            return;
        };
        let finished = self.finished;
        let message = UiMessage {
            task_id: self.id,
            label: self.label.clone(),
            completion: Box::new(move || {
                finished.store(true, Ordering::SeqCst);
                callback(value);
            }),
        };
        if self.sender.send(message).is_err() {
            warn!(
                "[{}][warn] UI loop is gone, dropping completion for task {}",
                self.label, self.id
            );
        }
    }
}

fn panic_message(panic_err: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_err.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with unknown error".to_string()
    }
}

/// One in-flight task, as seen from the UI
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    label: String,
    process: Option<ProcessHandle>,
    finished: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True once the completion has run on the UI thread
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn process(&self) -> Option<&ProcessHandle> {
        self.process.as_ref()
    }

    /// Kill the task's child process. A process the work has not spawned yet
    /// is killed as soon as it starts. The completion still fires with
    /// whatever the tool printed.
    pub fn terminate(&self) {
        match &self.process {
            Some(process) => process.terminate(),
            None => debug!("[{}] terminate: task {} has no process", self.label, self.id),
        }
    }
}
