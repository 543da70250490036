use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Barrier;

use crate::completion::{CompletionRecord, TaskOutcome};
use crate::reader::{run_absent_reader, run_reader};
use crate::supervisor::Supervisor;
use crate::task::{Stream, TaskSlot};

/// Spawn and supervise one task's child process.
///
/// Creates the child with its stdout/stderr piped (stdin is inherited,
/// unchanged from the parent — nothing redirects it), spawns the
/// two output readers, announces `Task <n> started: pid <pid>.`, then
/// rendezvous with the dispatcher and both readers on a 4-party barrier
/// before waiting for the child and running the death-recording protocol.
///
/// Runs as the task's manager; the caller stores the returned
/// `JoinHandle` on the task slot.
pub async fn run_manager(
    supervisor: Arc<Supervisor>,
    task: Arc<TaskSlot>,
    argv: Vec<String>,
    barrier: Arc<Barrier>,
) {
    let task_number = task.task_number;
    let max_line_len = supervisor.limits.max_line_len;

    let mut command = Command::new(&argv[0]);
    command
        .args(&argv[1..])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let spawned = command.spawn();

    let (pid, stdout_handle, stderr_handle, mut child) = match spawned {
        Ok(mut child) => {
            let pid = child.id().unwrap_or(0);
            let stdout = child.stdout.take().expect("piped stdout");
            let stderr = child.stderr.take().expect("piped stderr");

            let stdout_barrier = barrier.clone();
            let stdout_task = task.clone();
            let stdout_handle = tokio::spawn(async move {
                run_reader(
                    stdout_task,
                    Stream::Stdout,
                    stdout,
                    stdout_barrier,
                    max_line_len,
                )
                .await
            });

            let stderr_barrier = barrier.clone();
            let stderr_task = task.clone();
            let stderr_handle = tokio::spawn(async move {
                run_reader(
                    stderr_task,
                    Stream::Stderr,
                    stderr,
                    stderr_barrier,
                    max_line_len,
                )
                .await
            });

            (pid, stdout_handle, stderr_handle, Some(child))
        }
        Err(_) => {
            // Exec-setup failure: reported as a normal completion with exit
            // code 1, never fatal to the dispatcher. There are no real
            // pipes to read, so both reader slots just rendezvous and
            // return. There is also no real pid here — the process never
            // forked — so the "started" line below reports pid 0 on this
            // path, unlike a fork-then-exec model which always has a pid
            // by the time exec could fail.
            let stdout_handle = tokio::spawn(run_absent_reader(barrier.clone()));
            let stderr_handle = tokio::spawn(run_absent_reader(barrier.clone()));
            (0, stdout_handle, stderr_handle, None)
        }
    };

    task.set_pid(pid);
    supervisor
        .print_line(&format!("Task {task_number} started: pid {pid}."))
        .await;

    // Rendezvous: dispatcher + this manager + both output readers.
    barrier.wait().await;

    let outcome = match child.as_mut() {
        Some(child) => match child.wait().await {
            Ok(status) => TaskOutcome::from_exit_status(status),
            Err(_) => TaskOutcome::Exited(1),
        },
        None => TaskOutcome::Exited(1),
    };

    let record = CompletionRecord {
        task_number,
        pid,
        outcome,
    };

    supervisor
        .record_death(task_number, record, (stdout_handle, stderr_handle))
        .await;
}
