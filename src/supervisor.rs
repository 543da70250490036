use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;

use crate::completion::{CompletionQueue, CompletionRecord};
use crate::config::LimitsConfig;
use crate::task::TaskSlot;

/// What the print lock additionally protects: the most recent manager
/// whose completion was announced immediately (outside a command), whose
/// join handle still needs reaping.
#[derive(Default)]
struct PrintState {
    trailing: Option<usize>,
}

/// Shared supervisor state: the task table, the completion queue, and the
/// four named locks (`queue`, `command_status`, `task_status`, `print`),
/// plus the `command_in_flight` flag they coordinate around.
///
/// Owned by the shell frame and handed to the dispatcher by reference and
/// to managers via `Arc`, replacing the original's process-wide globals.
pub struct Supervisor {
    tasks: Mutex<Vec<Arc<TaskSlot>>>,
    queue: CompletionQueue,
    /// Exclusive side: held by the dispatcher across a command, or by the
    /// first manager (per quiescent window) to observe a child death.
    ///
    /// Wrapped so an `OwnedMutexGuard` can be acquired by one manager and
    /// dropped by a different one — the manager whose decrement brings
    /// `pending_deaths` to zero releases it, which need not be the manager
    /// that acquired it.
    command_status: Arc<tokio::sync::Mutex<()>>,
    command_status_holder: Mutex<Option<OwnedMutexGuard<()>>>,
    /// Guards `pending_deaths`, the death-in-progress counter.
    task_status: Mutex<usize>,
    print: tokio::sync::Mutex<PrintState>,
    command_in_flight: AtomicBool,
    pub limits: LimitsConfig,
}

impl Supervisor {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            queue: CompletionQueue::new(),
            command_status: Arc::new(tokio::sync::Mutex::new(())),
            command_status_holder: Mutex::new(None),
            task_status: Mutex::new(0),
            print: tokio::sync::Mutex::new(PrintState::default()),
            command_in_flight: AtomicBool::new(false),
            limits,
        }
    }

    /// Allocate the next task slot. Task numbers are dense and monotone:
    /// the i-th call returns the task with number i.
    pub fn allocate_task(&self) -> Result<Arc<TaskSlot>, crate::error::FatalError> {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.len() >= self.limits.max_tasks {
            return Err(crate::error::FatalError::TooManyTasks {
                limit: self.limits.max_tasks,
            });
        }
        let slot = Arc::new(TaskSlot::new(tasks.len()));
        tasks.push(slot.clone());
        Ok(slot)
    }

    pub fn task(&self, task_number: usize) -> Option<Arc<TaskSlot>> {
        self.tasks.lock().unwrap().get(task_number).cloned()
    }

    pub fn all_tasks(&self) -> Vec<Arc<TaskSlot>> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn set_in_flight(&self, value: bool) {
        self.command_in_flight.store(value, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> bool {
        self.command_in_flight.load(Ordering::SeqCst)
    }

    /// Acquire `command_status` for the dispatcher's pre-amble: set
    /// `command_in_flight = true`, then join and clear any trailing
    /// manager before releasing.
    pub async fn begin_command(&self) {
        let _guard = self.command_status.lock().await;
        self.set_in_flight(true);
        self.join_trailing().await;
    }

    /// Drain and print every buffered completion, then clear
    /// `command_in_flight` — the dispatcher's post-amble, steps 1-3.
    pub async fn flush(&self) {
        let _cmd_guard = self.command_status.lock().await;
        let print_guard = self.print.lock().await;
        for record in self.queue.drain() {
            println!("{}", record.render());
            let _ = std::io::stdout().flush();
        }
        self.set_in_flight(false);
        drop(print_guard);
    }

    /// Print a line outside the completion protocol — used for the
    /// "started" announcement, which is never queued and never competes
    /// with a trailing manager.
    pub async fn print_line(&self, line: &str) {
        let _guard = self.print.lock().await;
        println!("{line}");
        let _ = std::io::stdout().flush();
    }

    /// Join whatever manager is currently the trailing one, if any. Part of
    /// the dispatcher's pre-amble, called via `begin_command` before every
    /// command body runs, `quit`'s included.
    async fn join_trailing(&self) {
        let mut print_guard = self.print.lock().await;
        if let Some(idx) = print_guard.trailing.take() {
            drop(print_guard);
            self.join_task_manager(idx).await;
        }
    }

    async fn join_task_manager(&self, task_number: usize) {
        let handle = self
            .task(task_number)
            .and_then(|t| t.take_manager_handle());
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        if let Some(t) = self.task(task_number) {
            t.mark_joined();
        }
    }

    /// The death-recording protocol a manager runs once its child has been
    /// waited. `readers` are this task's two output-reader
    /// handles, joined here (step b) so no further output races the
    /// completion.
    pub async fn record_death(
        &self,
        task_number: usize,
        record: CompletionRecord,
        readers: (JoinHandle<()>, JoinHandle<()>),
    ) {
        // (a) bump pending_deaths; the manager that takes it 0 -> 1 claims
        // command_status for the duration of this announcement, possibly
        // outliving this function call on another manager's behalf.
        let became_one = {
            let mut pending = self.task_status.lock().unwrap();
            *pending += 1;
            *pending == 1
        };
        if became_one {
            let guard = self.command_status.clone().lock_owned().await;
            *self.command_status_holder.lock().unwrap() = Some(guard);
        }

        // (b) no further output can race this completion once both
        // readers have returned.
        let _ = readers.0.await;
        let _ = readers.1.await;

        // (c) announce now, or defer to the next flush.
        if self.in_flight() {
            self.queue.push(record);
        } else {
            let mut print_guard = self.print.lock().await;
            if let Some(prev) = print_guard.trailing.take() {
                drop(print_guard);
                self.join_task_manager(prev).await;
                print_guard = self.print.lock().await;
            }
            print_guard.trailing = Some(task_number);
            println!("{}", record.render());
            let _ = std::io::stdout().flush();
            drop(print_guard);
        }

        // (d) whichever manager's decrement brings the counter to zero
        // releases command_status, even if a different manager acquired it.
        let mut pending = self.task_status.lock().unwrap();
        *pending -= 1;
        if *pending == 0 {
            let guard = self.command_status_holder.lock().unwrap().take();
            drop(guard);
        }
    }

    /// `quit`'s reap step: for every task not yet joined, escalate to
    /// SIGKILL if its manager hasn't finished (a finished manager has
    /// already waited, and thus reaped, its child), then join the handle
    /// and mark the slot joined.
    pub async fn join_all(&self) {
        for task in self.all_tasks() {
            if task.is_joined() {
                continue;
            }
            let pid = task.pid();
            if let Some(handle) = task.take_manager_handle() {
                if !handle.is_finished() && pid != 0 {
                    let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
                }
                let _ = handle.await;
            }
            task.mark_joined();
        }
    }
}
