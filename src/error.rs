use std::fmt;

/// Process-fatal conditions.
///
/// Every variant here corresponds to a contract in the supervisor's
/// component design that says "fatal": a broken OS-call invariant, a
/// poisoned synchronization primitive, or a resource limit exceeded. None
/// of these are retried — the process prints a diagnostic and exits
/// non-zero.
#[derive(Debug)]
pub enum FatalError {
    Io(std::io::Error),
    Sync(&'static str),
    LineTooLong { limit: usize },
    TooManyTasks { limit: usize },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::Io(e) => write!(f, "fatal I/O error: {e}"),
            FatalError::Sync(what) => write!(f, "fatal synchronization error: {what}"),
            FatalError::LineTooLong { limit } => {
                write!(f, "line exceeds maximum length of {limit} characters")
            }
            FatalError::TooManyTasks { limit } => {
                write!(f, "task count exceeds maximum of {limit}")
            }
        }
    }
}

impl std::error::Error for FatalError {}

impl From<std::io::Error> for FatalError {
    fn from(e: std::io::Error) -> Self {
        FatalError::Io(e)
    }
}
