use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Barrier;

use crate::task::{Stream, TaskSlot};

/// Tail one of a task's output pipes, publishing the latest complete line
/// into the task's corresponding last-line buffer.
///
/// Reads until EOF. Every complete line — delimited by a newline, or by
/// EOF on a trailing fragment — overwrites the buffer under that stream's
/// lock. A line longer than `max_line_len` is a fatal error for the whole
/// process.
///
/// Performs one rendezvous on `barrier` before entering its read loop, so
/// the manager's "started" announcement is guaranteed to precede any
/// output this reader publishes.
pub async fn run_reader<R>(
    task: Arc<TaskSlot>,
    stream: Stream,
    pipe: R,
    barrier: Arc<Barrier>,
    max_line_len: usize,
) where
    R: AsyncRead + Unpin,
{
    barrier.wait().await;

    let mut lines = BufReader::new(pipe).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.chars().count() > max_line_len {
                    eprintln!(
                        "task-exec: fatal: output line for task {} exceeds {} characters",
                        task.task_number, max_line_len
                    );
                    std::process::exit(1);
                }
                task.write_last(stream, line);
            }
            Ok(None) => break, // EOF
            Err(e) => {
                eprintln!(
                    "task-exec: fatal: I/O error reading task {} output: {e}",
                    task.task_number
                );
                std::process::exit(1);
            }
        }
    }
}

/// Stand-in for a reader when no pipe exists to read from (the process
/// never successfully spawned). Still performs the barrier rendezvous so
/// the 4-party protocol completes uniformly.
pub async fn run_absent_reader(barrier: Arc<Barrier>) {
    barrier.wait().await;
}
