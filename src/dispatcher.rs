use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::sync::Barrier;

use crate::manager::run_manager;
use crate::supervisor::Supervisor;
use crate::task::Stream;
use crate::tokenizer::tokenize;

/// Single-threaded command driver. One call per command
/// line, plus one final call with `None` standing in for end-of-input.
///
/// Every call runs the pre-amble (claim `command_status`, mark a command
/// in flight, reap any trailing manager), the command body, and the
/// post-amble (flush every completion buffered during the command) —
/// `quit` included, so a death recorded during its join window is still
/// announced before the process exits.
pub struct Dispatcher {
    supervisor: Arc<Supervisor>,
}

impl Dispatcher {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    pub async fn dispatch_line(&self, line: Option<&str>) {
        self.supervisor.begin_command().await;

        let tokens = match line {
            Some(l) => tokenize(l),
            None => vec!["quit".to_string()],
        };

        let verb = tokens[0].as_str();
        let is_quit = verb == "quit";

        match verb {
            "run" => self.run(tokens).await,
            "out" => self.read_stream(&tokens, Stream::Stdout),
            "err" => self.read_stream(&tokens, Stream::Stderr),
            "kill" => self.kill(&tokens),
            "sleep" => self.sleep(&tokens).await,
            "quit" => self.supervisor.join_all().await,
            _ => {} // unrecognized verb or blank line: EMPTY, do nothing
        }

        // Unconditional post-amble, `quit` included: a death recorded
        // during quit's join window still takes the in-flight branch in
        // `record_death` and lands in the queue, so it must be drained and
        // printed before the process exits.
        self.supervisor.flush().await;

        if is_quit {
            std::process::exit(0);
        }
    }

    async fn run(&self, tokens: Vec<String>) {
        let argv: Vec<String> = tokens[1..].to_vec();
        if argv.is_empty() {
            return;
        }

        let task = match self.supervisor.allocate_task() {
            Ok(task) => task,
            Err(e) => {
                eprintln!("task-exec: fatal: {e}");
                std::process::exit(1);
            }
        };

        let barrier = Arc::new(Barrier::new(4));
        let supervisor = self.supervisor.clone();
        let manager_task = task.clone();
        let manager_barrier = barrier.clone();
        let handle = tokio::spawn(async move {
            run_manager(supervisor, manager_task, argv, manager_barrier).await;
        });
        task.set_manager_handle(handle);

        // Rendezvous so the "started" line is guaranteed to precede our
        // return to the main loop.
        barrier.wait().await;
    }

    fn read_stream(&self, tokens: &[String], stream: Stream) {
        let Some(n) = parse_task_number(tokens) else {
            return;
        };
        let Some(task) = self.supervisor.task(n) else {
            return;
        };
        let last = task.read_last(stream);
        let label = match stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        };
        println!("Task {n} {label}: '{last}'.");
    }

    fn kill(&self, tokens: &[String]) {
        let Some(n) = parse_task_number(tokens) else {
            return;
        };
        let Some(task) = self.supervisor.task(n) else {
            return;
        };
        let pid = task.pid();
        if pid == 0 {
            return;
        }
        // Errors are ignored — the child may already have exited.
        let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGINT);
    }

    async fn sleep(&self, tokens: &[String]) {
        let Some(ms) = tokens.get(1).and_then(|s| s.parse::<u64>().ok()) else {
            return;
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn parse_task_number(tokens: &[String]) -> Option<usize> {
    tokens.get(1)?.parse::<usize>().ok()
}
