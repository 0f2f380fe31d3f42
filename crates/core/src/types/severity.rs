use crate::impl_case_insensitive_names;

/// How serious a finding is. Ordering puts `Error` first so sorted results
/// show the worst problems at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl_case_insensitive_names!(
    Severity,
    Error => "error",
    Warning => "warning",
    Info => "info"
);

impl Severity {
    /// Map a pep8/pylint message-class letter onto a severity
    pub fn from_code_letter(letter: char) -> Self {
        match letter {
            'E' | 'F' => Severity::Error,
            'W' => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_sort_first() {
        let mut all = vec![Severity::Info, Severity::Error, Severity::Warning];
        all.sort();
        assert_eq!(all, vec![Severity::Error, Severity::Warning, Severity::Info]);
    }

    #[test]
    fn test_code_letters() {
        assert_eq!(Severity::from_code_letter('E'), Severity::Error);
        assert_eq!(Severity::from_code_letter('F'), Severity::Error);
        assert_eq!(Severity::from_code_letter('W'), Severity::Warning);
        assert_eq!(Severity::from_code_letter('C'), Severity::Info);
        assert_eq!(Severity::from_code_letter('R'), Severity::Info);
    }
}
