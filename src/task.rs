use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Which of a task's two output streams an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Per-task state: identity, the child's pid, last-line buffers for each
/// stream (each under its own lock, so a read of one stream can never tear
/// across the other), and the handle to this task's manager.
///
/// A slot is created once, at `run` time, and lives until the process
/// exits. `write_last` is called only from that task's own output readers;
/// `read_last` may be called from the dispatcher at any time.
pub struct TaskSlot {
    pub task_number: usize,
    pid: AtomicU32,
    stdout: Mutex<String>,
    stderr: Mutex<String>,
    /// The manager's join handle, consumed exactly once.
    manager: Mutex<Option<JoinHandle<()>>>,
    joined: AtomicBool,
}

impl TaskSlot {
    pub fn new(task_number: usize) -> Self {
        Self {
            task_number,
            pid: AtomicU32::new(0),
            stdout: Mutex::new(String::new()),
            stderr: Mutex::new(String::new()),
            manager: Mutex::new(None),
            joined: AtomicBool::new(false),
        }
    }

    pub fn set_pid(&self, pid: u32) {
        self.pid.store(pid, Ordering::SeqCst);
    }

    pub fn pid(&self) -> u32 {
        self.pid.load(Ordering::SeqCst)
    }

    pub fn set_manager_handle(&self, handle: JoinHandle<()>) {
        *self.manager.lock().unwrap() = Some(handle);
    }

    /// Take the manager's join handle, if it hasn't already been taken.
    /// Returns `None` if some other caller already took it — callers must
    /// not await a handle they didn't themselves take.
    pub fn take_manager_handle(&self) -> Option<JoinHandle<()>> {
        self.manager.lock().unwrap().take()
    }

    pub fn mark_joined(&self) {
        self.joined.store(true, Ordering::SeqCst);
    }

    pub fn is_joined(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }

    /// Atomically copy the latest complete line observed on `stream`. The
    /// empty string if nothing has arrived yet.
    pub fn read_last(&self, stream: Stream) -> String {
        let buf = match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        };
        buf.lock().unwrap().clone()
    }

    /// Replace the stored line under `stream`'s lock. Called only from the
    /// corresponding output reader.
    pub fn write_last(&self, stream: Stream, line: String) {
        let buf = match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        };
        *buf.lock().unwrap() = line;
    }
}
