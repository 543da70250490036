use std::io::Write;
use std::process::{Command, Stdio};

fn task_exec_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_task-exec"));
    cmd.arg("--quiet")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn run_script(script: &str) -> (String, std::process::ExitStatus) {
    let mut child = task_exec_cmd().spawn().expect("spawn task-exec");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .expect("write script to stdin");
    let output = child
        .wait_with_output()
        .expect("wait for task-exec to finish");
    (String::from_utf8_lossy(&output.stdout).into_owned(), output.status)
}

#[test]
fn single_task_runs_and_reports_exit_status() {
    // No `sleep` before `quit`: the child may not be reaped until `quit`'s
    // own join window, so this exercises `quit`'s post-amble flush, not
    // just the quiescent-window announce path the other tests dodge into
    // via `sleep`.
    let (stdout, status) = run_script("run /bin/echo hi\nquit\n");
    assert!(status.success());
    let mut lines = stdout.lines();
    assert!(lines.next().unwrap().starts_with("Task 0 started: pid "));
    assert_eq!(lines.next().unwrap(), "Task 0 ended: status 0.");
}

#[test]
fn out_reports_last_stdout_line() {
    let (stdout, status) =
        run_script("run /bin/echo hi\nsleep 200\nout 0\nquit\n");
    assert!(status.success());
    assert!(stdout.contains("Task 0 started: pid "));
    assert!(stdout.contains("Task 0 ended: status 0."));
    assert!(stdout.contains("Task 0 stdout: 'hi'."));
}

#[test]
fn out_and_err_report_last_line_of_each_stream_independently() {
    let (stdout, status) = run_script(
        "run /bin/sh -c \"echo a; echo b 1>&2\"\nsleep 200\nout 0\nerr 0\nquit\n",
    );
    assert!(status.success());
    assert!(stdout.contains("Task 0 stdout: 'a'."));
    assert!(stdout.contains("Task 0 stderr: 'b'."));
}

#[test]
fn nonzero_exit_is_reported_verbatim() {
    let (stdout, status) = run_script("run /bin/false\nsleep 200\nquit\n");
    assert!(status.success());
    assert!(stdout.contains("Task 0 ended: status 1."));
}

#[test]
fn kill_signals_a_running_task() {
    let (stdout, status) = run_script("run /bin/sleep 10\nkill 0\nsleep 200\nquit\n");
    assert!(status.success());
    assert!(stdout.contains("Task 0 started: pid "));
    assert!(stdout.contains("Task 0 ended: signalled."));
}

#[test]
fn kill_then_immediate_quit_still_reports_completion() {
    // No `sleep` between `kill` and `quit`: the death is observed inside
    // `quit`'s own join window, which is the exact race the post-amble
    // flush after `join_all` has to cover.
    let (stdout, status) = run_script("run /bin/sleep 10\nkill 0\nquit\n");
    assert!(status.success());
    assert!(stdout.contains("Task 0 started: pid "));
    assert!(stdout.contains("Task 0 ended: signalled."));
}

#[test]
fn overlapping_tasks_each_get_dense_task_numbers() {
    let (stdout, status) =
        run_script("run /bin/echo a\nrun /bin/echo b\nsleep 300\nquit\n");
    assert!(status.success());
    assert!(stdout.contains("Task 0 started: pid "));
    assert!(stdout.contains("Task 1 started: pid "));
    assert!(stdout.contains("Task 0 ended:"));
    assert!(stdout.contains("Task 1 ended:"));
}

#[test]
fn unrecognized_verb_is_silently_ignored() {
    let (stdout, status) = run_script("frobnicate 1 2 3\nquit\n");
    assert!(status.success());
    assert_eq!(stdout, "");
}

#[test]
fn end_of_input_without_quit_still_reaps_and_exits_cleanly() {
    let mut child = task_exec_cmd().spawn().expect("spawn task-exec");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"run /bin/sleep 5\n")
        .expect("write script to stdin");
    // Dropping stdin here closes it, signalling end-of-input without an
    // explicit `quit` line.
    let output = child
        .wait_with_output()
        .expect("wait for task-exec to finish");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task 0 started: pid "));
}

#[test]
fn oversized_command_line_is_fatal() {
    let overlong = "a".repeat(2000);
    let mut child = task_exec_cmd().spawn().expect("spawn task-exec");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(format!("{overlong}\n").as_bytes())
        .expect("write oversized line to stdin");
    let output = child
        .wait_with_output()
        .expect("wait for task-exec to finish");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fatal"));
}

