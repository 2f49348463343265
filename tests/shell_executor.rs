// tests/shell_executor.rs

mod common;
use crate::common::init_tracing;

use std::time::{Duration, Instant};

use pgbackup::exec::{ExitState, RealShellExecutor, ShellCommand, ShellExecutor, run_command};

fn sh(script: &str) -> ShellCommand {
    ShellCommand::new("sh").arg("-c").arg(script)
}

#[tokio::test]
async fn stdout_and_stderr_are_merged_in_order() {
    init_tracing();
    let out = run_command(&sh("echo one; echo two 1>&2; echo three"), None).await;

    assert!(out.success());
    assert_eq!(out.text(), "one\ntwo\nthree\n");
}

#[tokio::test]
async fn failing_command_reports_exit_code_and_output() {
    init_tracing();
    let out = run_command(&sh("echo 'pg_dump: error: boom' 1>&2; exit 3"), None).await;

    assert!(!out.success());
    assert_eq!(out.status, ExitState::Exited(3));
    assert_eq!(out.text(), "pg_dump: error: boom\n");
}

#[tokio::test]
async fn locale_is_forced() {
    init_tracing();
    let out = run_command(&sh("printf '%s %s' \"$LC_ALL\" \"$LANG\""), None).await;

    assert_eq!(out.text(), "C en_US.UTF-8");
}

#[tokio::test]
async fn arguments_are_not_shell_interpreted() {
    init_tracing();
    let cmd = ShellCommand::new("printf")
        .arg("%s")
        .arg("db; rm -rf / $(whoami) \"quoted\"");
    let out = run_command(&cmd, None).await;

    assert_eq!(out.text(), "db; rm -rf / $(whoami) \"quoted\"");
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() {
    init_tracing();
    let out = run_command(&ShellCommand::new("/nonexistent/pg_dump"), None).await;

    assert_eq!(out.status, ExitState::SpawnFailed);
    assert!(out.text().contains("/nonexistent/pg_dump"));
}

#[tokio::test]
async fn slow_command_is_killed_on_timeout() {
    init_tracing();
    let shell = RealShellExecutor::new(Some(Duration::from_millis(200)));
    let started = Instant::now();

    let out = shell.execute(&sh("echo started; exec sleep 30")).await;

    assert_eq!(out.status, ExitState::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(out.text(), "started\n");
}

#[tokio::test]
async fn fast_command_is_unaffected_by_timeout() {
    init_tracing();
    let shell = RealShellExecutor::new(Some(Duration::from_secs(30)));

    let out = shell.execute(&sh("echo 16.2")).await;

    assert!(out.success());
    assert_eq!(out.text(), "16.2\n");
}

#[test]
fn display_quotes_what_needs_quoting() {
    let cmd = ShellCommand::new("pg_dump")
        .args(["-h", "db1", "-j", "5", "-Fd", "it's", "-f", "/backups/_tmp x"]);

    assert_eq!(
        cmd.to_string(),
        r"pg_dump -h db1 -j 5 -Fd 'it'\''s' -f '/backups/_tmp x'"
    );
}
