//! Background execution of checks with completions delivered on the UI thread.
//!
//! Workers never call back into the UI. They send the completion over an
//! `mpsc` channel and the thread that owns the [`UiLoop`] runs it.

mod dispatcher;
mod fault;
mod ui_loop;
pub mod ui_state;

pub use dispatcher::{Dispatcher, TaskHandle};
pub use fault::FromFault;
pub use ui_loop::UiLoop;
pub use ui_state::{ErrorMark, ErrorMarks, RequestTracker, Ticket};
