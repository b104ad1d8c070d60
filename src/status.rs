#![forbid(unsafe_code)]

//! Exit statuses and dispatch outcomes

/// Status returned by a command function
///
/// The same enum keys the cleanup buckets. `No` means "carry on with the next
/// queued command" and is never used as a bucket key; `Any` is never returned
/// by dispatch and names the bucket that runs after every other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    No,
    Success,
    Failure,
    UsageError,
    Any,
}

/// Final result of a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
    UsageError,
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => -1,
            Outcome::UsageError => -2,
        }
    }

    /// Maps a terminal exit status onto an outcome
    ///
    /// `No` and `Any` are not terminal and yield `None`.
    pub fn from_status(status: ExitStatus) -> Option<Self> {
        match status {
            ExitStatus::Success => Some(Outcome::Success),
            ExitStatus::Failure => Some(Outcome::Failure),
            ExitStatus::UsageError => Some(Outcome::UsageError),
            ExitStatus::No | ExitStatus::Any => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_codes() {
        assert_eq!(Outcome::Success.code(), 0);
        assert_eq!(Outcome::Failure.code(), -1);
        assert_eq!(Outcome::UsageError.code(), -2);
    }

    #[test]
    fn test_from_status() {
        assert_eq!(Outcome::from_status(ExitStatus::Failure), Some(Outcome::Failure));
        assert_eq!(Outcome::from_status(ExitStatus::No), None);
        assert_eq!(Outcome::from_status(ExitStatus::Any), None);
    }
}
