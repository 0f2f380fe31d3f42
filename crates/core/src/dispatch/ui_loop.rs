use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::ThreadId;
use std::time::{Duration, Instant};

use tracing::trace;

use super::dispatcher::Dispatcher;

pub(crate) type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Message sent from a worker to the UI loop
pub(crate) struct UiMessage {
    pub(crate) task_id: u64,
    pub(crate) label: String,
    pub(crate) completion: Completion,
}

/// Shared between the loop and every dispatcher cloned from it
#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    pub(crate) pending: AtomicUsize,
    pub(crate) next_id: AtomicU64,
}

/// The single consumer of completions.
///
/// Created and pumped on the UI thread. The type is `!Send`,
/// so completions can only ever run on the thread that built it.
pub struct UiLoop {
    sender: Sender<UiMessage>,
    receiver: Receiver<UiMessage>,
    counters: Arc<LoopCounters>,
    ui_thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl UiLoop {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            counters: Arc::new(LoopCounters::default()),
            ui_thread: std::thread::current().id(),
            _not_send: PhantomData,
        }
    }

    /// A handle workers use to schedule work whose completion lands here
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.sender.clone(), Arc::clone(&self.counters))
    }

    /// Identifier of the thread completions run on
    pub fn ui_thread(&self) -> ThreadId {
        self.ui_thread
    }

    /// Dispatched tasks whose completion has not run yet
    pub fn pending(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    /// Run every completion already queued, without blocking
    pub fn pump(&self) -> usize {
        let mut ran = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.complete(message);
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return ran,
            }
        }
    }

    /// Wait for one completion and run it, then drain whatever else is queued.
    /// Returns immediately with 0 when nothing is pending.
    pub fn pump_blocking(&self) -> usize {
        if self.pending() == 0 {
            return self.pump();
        }
        match self.receiver.recv() {
            Ok(message) => {
                self.complete(message);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    /// Like `pump_blocking`, giving up after `timeout`
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => {
                self.complete(message);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Pump until every dispatched task has completed
    pub fn run_until_idle(&self) {
        while self.pending() > 0 {
            self.pump_blocking();
        }
    }

    /// Pump until idle or until `deadline`; true when idle
    pub fn run_until_idle_or(&self, deadline: Instant) -> bool {
        while self.pending() > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.pump_timeout(deadline - now);
        }
        true
    }

    fn complete(&self, message: UiMessage) {
        trace!("[{}] running completion for task {}", message.label, message.task_id);
        self.counters.pending.fetch_sub(1, Ordering::SeqCst);
        (message.completion)();
    }
}

impl Default for UiLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UiLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiLoop")
            .field("ui_thread", &self.ui_thread)
            .field("pending", &self.pending())
            .finish()
    }
}
