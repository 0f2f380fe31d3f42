use crate::{error::Error, types::CheckResult};

/// Builds the value delivered to a completion when the work itself failed.
///
/// Whatever goes wrong on a worker reaches the UI as ordinary data.
pub trait FromFault: Sized {
    fn from_fault(error: &Error) -> Self;
}

impl FromFault for CheckResult {
    fn from_fault(error: &Error) -> Self {
        CheckResult::from_error(error)
    }
}
