use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::dispatcher::Dispatcher;
use crate::error::FatalError;
use crate::supervisor::Supervisor;

/// Top-level REPL loop. Reads lines from stdin, enforcing the
/// maximum command-line length, and hands each to the dispatcher. A line
/// exceeding the limit is fatal; end-of-input is translated into a single
/// `quit` call.
pub async fn run(supervisor: Arc<Supervisor>) -> Result<(), FatalError> {
    let dispatcher = Dispatcher::new(supervisor.clone());
    let max_command_len = supervisor.limits.max_command_len;

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        match lines.next_line().await? {
            Some(line) => {
                if line.chars().count() > max_command_len {
                    return Err(FatalError::LineTooLong {
                        limit: max_command_len,
                    });
                }
                dispatcher.dispatch_line(Some(&line)).await;
            }
            None => {
                dispatcher.dispatch_line(None).await;
                break;
            }
        }
    }

    Ok(())
}
