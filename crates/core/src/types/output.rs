use std::borrow::Cow;

/// Everything a finished child process wrote, plus how it exited.
///
/// Bytes are kept as-is; the text accessors decode lossily so a tool that
/// prints invalid UTF-8 never makes a parse fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>, exit_code: Option<i32>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lossy_decode() {
        let output = CapturedOutput::new(vec![b'o', b'k', 0xff, 0xfe], Vec::new(), Some(0));
        assert!(output.stdout_text().starts_with("ok"));
        assert!(output.stdout_text().contains('\u{FFFD}'));
        assert!(output.success());
    }

    #[test]
    fn test_signal_exit_is_not_success() {
        let output = CapturedOutput::new("", "", None);
        assert!(!output.success());
    }
}
