use std::collections::VecDeque;
use std::sync::Mutex;

/// How a task's child process ended. Replaces the raw OS wait-status with a
/// sum type — callers never see both a code and a signal flag, by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Exited(i32),
    Signalled,
}

impl TaskOutcome {
    pub fn from_exit_status(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        match status.code() {
            Some(code) => TaskOutcome::Exited(code),
            None => TaskOutcome::Signalled,
        }
    }
}

/// A finished-but-not-yet-announced task. Produced by a manager once its
/// child has been waited; consumed by the dispatcher at the next flush;
/// never retained across flushes.
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub task_number: usize,
    pub pid: u32,
    pub outcome: TaskOutcome,
}

impl CompletionRecord {
    /// The exact protocol line for this completion.
    pub fn render(&self) -> String {
        match self.outcome {
            TaskOutcome::Exited(code) => {
                format!("Task {} ended: status {}.", self.task_number, code)
            }
            TaskOutcome::Signalled => format!("Task {} ended: signalled.", self.task_number),
        }
    }
}

/// Bounded, ordered buffer of completion records. Writes append in
/// completion order; the dispatcher drains in insertion order, and only
/// while `command_in_flight` is false (enforced by the caller, not here).
#[derive(Default)]
pub struct CompletionQueue {
    records: Mutex<VecDeque<CompletionRecord>>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, record: CompletionRecord) {
        self.records.lock().unwrap().push_back(record);
    }

    /// Drain every buffered record, in insertion order.
    pub fn drain(&self) -> Vec<CompletionRecord> {
        self.records.lock().unwrap().drain(..).collect()
    }
}
