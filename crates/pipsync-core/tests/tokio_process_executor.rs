#![cfg(unix)]

use std::sync::Arc;

use pipsync_core::execution::{
    BlockingExecutor, CommandSpec, ProcessExitStatus, ProcessSpawnRequest, TokioProcessExecutor,
    spawn_validated,
};
use pipsync_core::models::{CoreErrorKind, InstallerAction};

#[tokio::test]
async fn spawns_echo_and_captures_stdout() {
    let executor = TokioProcessExecutor;
    let request = ProcessSpawnRequest::new(
        InstallerAction::ListInstalled,
        CommandSpec::new("/bin/echo").arg("hello"),
    );
    let handle = spawn_validated(&executor, request).expect("spawn should succeed");

    assert!(handle.pid().is_some());

    let output = handle.wait().await.expect("wait should succeed");
    assert_eq!(output.status, ProcessExitStatus::ExitCode(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn shell_commands_see_request_environment() {
    let executor = TokioProcessExecutor;
    let request = ProcessSpawnRequest::new(
        InstallerAction::ListInstalled,
        CommandSpec::shell("echo \"$PIP_FORMAT\"").env("PIP_FORMAT", "json"),
    );
    let output = spawn_validated(&executor, request)
        .expect("spawn should succeed")
        .wait()
        .await
        .expect("wait should succeed");

    assert!(output.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "json");
}

#[tokio::test]
async fn captures_nonzero_exit_code() {
    let executor = TokioProcessExecutor;
    let request = ProcessSpawnRequest::new(InstallerAction::Install, CommandSpec::shell("exit 1"));
    let output = spawn_validated(&executor, request)
        .expect("spawn should succeed")
        .wait()
        .await
        .expect("wait should succeed");

    assert_eq!(output.status, ProcessExitStatus::ExitCode(1));
}

#[test]
fn missing_program_is_a_process_failure() {
    let executor = BlockingExecutor::new(Arc::new(TokioProcessExecutor)).unwrap();
    let request = ProcessSpawnRequest::new(
        InstallerAction::ListInstalled,
        CommandSpec::new("/nonexistent/pipsync-python"),
    );

    let error = executor
        .run_and_collect_stdout(request)
        .expect_err("expected spawn failure");
    assert_eq!(error.kind, CoreErrorKind::ProcessFailure);
    assert_eq!(error.action, Some(InstallerAction::ListInstalled));
}

#[test]
fn blocking_executor_attaches_streams_on_failure() {
    let executor = BlockingExecutor::new(Arc::new(TokioProcessExecutor)).unwrap();
    let request = ProcessSpawnRequest::new(
        InstallerAction::Uninstall,
        CommandSpec::shell("echo partial; echo oops >&2; exit 3"),
    );

    let error = executor
        .run_and_collect_stdout(request)
        .expect_err("expected process failure");
    assert_eq!(error.kind, CoreErrorKind::ProcessFailure);
    let output = error.output.expect("captured output");
    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.stdout.trim(), "partial");
    assert_eq!(output.stderr.trim(), "oops");
}

#[test]
fn blocking_executor_returns_stdout() {
    let executor = BlockingExecutor::new(Arc::new(TokioProcessExecutor)).unwrap();
    let request = ProcessSpawnRequest::new(
        InstallerAction::ListInstalled,
        CommandSpec::new("/bin/sh").args(["-c", "printf '[]'"]),
    );

    assert_eq!(executor.run_and_collect_stdout(request).unwrap(), "[]");
}
