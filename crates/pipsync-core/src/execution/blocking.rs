use std::sync::Arc;

use crate::execution::{
    ExecutionResult, ProcessExecutor, ProcessExitStatus, ProcessOutput, ProcessSpawnRequest,
    spawn_validated,
};
use crate::models::{CapturedOutput, CoreError, CoreErrorKind};

/// Drives a [`ProcessExecutor`] to completion on a private current-thread
/// runtime, so callers see plain blocking calls.
pub struct BlockingExecutor {
    executor: Arc<dyn ProcessExecutor>,
    runtime: tokio::runtime::Runtime,
}

impl BlockingExecutor {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> ExecutionResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                CoreError::new(
                    CoreErrorKind::Internal,
                    format!("failed to build process runtime: {error}"),
                )
            })?;
        Ok(Self { executor, runtime })
    }

    pub fn run(&self, request: ProcessSpawnRequest) -> ExecutionResult<ProcessOutput> {
        tracing::debug!(
            action = request.action.as_str(),
            command = %request.command.display(),
            user = request.command.user.as_deref().unwrap_or("-"),
            "running installer command"
        );
        let executor = self.executor.as_ref();
        self.runtime.block_on(async move {
            let process = spawn_validated(executor, request)?;
            tracing::trace!(pid = ?process.pid(), "installer process spawned");
            process.wait().await
        })
    }

    /// Runs the request and returns stdout, failing on any non-zero exit
    /// with the captured streams attached.
    pub fn run_and_collect_stdout(&self, request: ProcessSpawnRequest) -> ExecutionResult<String> {
        let action = request.action;
        let display = request.command.display();
        let output = self.run(request)?;

        match output.status {
            ProcessExitStatus::ExitCode(0) => String::from_utf8(output.stdout).map_err(|error| {
                CoreError::parse_failure(format!("process stdout is not valid UTF-8: {error}"))
                    .with_action(action)
            }),
            ProcessExitStatus::ExitCode(code) => {
                let captured = capture(Some(code), &output);
                Err(CoreError::new(
                    CoreErrorKind::ProcessFailure,
                    format!(
                        "`{display}` exited with code {code}: {}",
                        captured.stderr.trim()
                    ),
                )
                .with_action(action)
                .with_output(captured))
            }
            ProcessExitStatus::Terminated => Err(CoreError::new(
                CoreErrorKind::ProcessFailure,
                format!("`{display}` was terminated by signal"),
            )
            .with_action(action)
            .with_output(capture(None, &output))),
        }
    }
}

fn capture(exit_code: Option<i32>, output: &ProcessOutput) -> CapturedOutput {
    CapturedOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
