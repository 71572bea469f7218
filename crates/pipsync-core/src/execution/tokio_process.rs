use crate::execution::{
    CommandLine, ExecutionResult, ProcessExecutor, ProcessExitStatus, ProcessOutput,
    ProcessSpawnRequest, ProcessWaitFuture, RunningProcess,
};
use crate::models::{CoreError, CoreErrorKind, InstallerAction};

const SHELL_PROGRAM: &str = "/bin/sh";

pub struct TokioProcessExecutor;

impl ProcessExecutor for TokioProcessExecutor {
    fn spawn(&self, request: ProcessSpawnRequest) -> ExecutionResult<Box<dyn RunningProcess>> {
        let mut cmd = match &request.command.line {
            CommandLine::Argv { program, args } => {
                let mut cmd = tokio::process::Command::new(program);
                cmd.args(args);
                cmd
            }
            CommandLine::Shell(line) => {
                let mut cmd = tokio::process::Command::new(SHELL_PROGRAM);
                cmd.arg("-c").arg(line);
                cmd
            }
        };

        for (key, value) in &request.command.env {
            cmd.env(key, value);
        }

        apply_identity(&mut cmd, &request)?;

        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|error| {
            process_failure(request.action, format!("failed to spawn process: {error}"))
        })?;

        Ok(Box::new(TokioRunningProcess {
            pid: child.id(),
            child,
            action: request.action,
        }))
    }
}

#[cfg(unix)]
fn apply_identity(
    cmd: &mut tokio::process::Command,
    request: &ProcessSpawnRequest,
) -> ExecutionResult<()> {
    let identity = crate::execution::identity::resolve(
        request.command.user.as_deref(),
        request.command.group.as_deref(),
    )
    .map_err(|error| error.with_action(request.action))?;

    let Some(identity) = identity else {
        return Ok(());
    };

    if let Some(uid) = identity.uid {
        cmd.uid(uid);
    }
    if let Some(gid) = identity.gid {
        cmd.gid(gid);
    }
    if let Some(home) = identity.home
        && !request.command.env.contains_key("HOME")
    {
        cmd.env("HOME", home);
    }

    Ok(())
}

#[cfg(not(unix))]
fn apply_identity(
    _cmd: &mut tokio::process::Command,
    request: &ProcessSpawnRequest,
) -> ExecutionResult<()> {
    if request.command.user.is_some() || request.command.group.is_some() {
        return Err(CoreError::invalid_input(
            "running the installer as another user or group requires a unix host",
        )
        .with_action(request.action));
    }
    Ok(())
}

struct TokioRunningProcess {
    child: tokio::process::Child,
    pid: Option<u32>,
    action: InstallerAction,
}

impl RunningProcess for TokioRunningProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn wait(self: Box<Self>) -> ProcessWaitFuture {
        let TokioRunningProcess { child, action, .. } = *self;

        Box::pin(async move {
            let output = child.wait_with_output().await.map_err(|error| {
                process_failure(action, format!("failed to wait for process: {error}"))
            })?;

            let status = match output.status.code() {
                Some(code) => ProcessExitStatus::ExitCode(code),
                None => ProcessExitStatus::Terminated,
            };

            Ok(ProcessOutput {
                status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }
}

fn process_failure(action: InstallerAction, message: String) -> CoreError {
    CoreError::new(CoreErrorKind::ProcessFailure, message).with_action(action)
}
