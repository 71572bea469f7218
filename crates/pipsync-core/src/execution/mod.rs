use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::models::{CoreError, InstallerAction};

pub mod blocking;
#[cfg(unix)]
pub(crate) mod identity;
pub mod shell;
pub mod tokio_process;

pub use blocking::BlockingExecutor;
pub use tokio_process::TokioProcessExecutor;

pub type ExecutionResult<T> = Result<T, CoreError>;

pub type ProcessWaitFuture = Pin<Box<dyn Future<Output = ExecutionResult<ProcessOutput>> + Send>>;

/// How a command reaches the operating system.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandLine {
    /// Spawned directly with discrete arguments.
    Argv { program: PathBuf, args: Vec<String> },
    /// A complete, already-quoted command handed to `/bin/sh -c`.
    Shell(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    pub line: CommandLine,
    pub env: BTreeMap<String, String>,
    pub user: Option<String>,
    pub group: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::from_line(CommandLine::Argv {
            program: program.into(),
            args: Vec::new(),
        })
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self::from_line(CommandLine::Shell(command.into()))
    }

    fn from_line(line: CommandLine) -> Self {
        Self {
            line,
            env: BTreeMap::new(),
            user: None,
            group: None,
        }
    }

    /// Appends an argument. Shell commands receive it quoted.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        match &mut self.line {
            CommandLine::Argv { args, .. } => args.push(arg),
            CommandLine::Shell(command) => {
                if !command.is_empty() {
                    command.push(' ');
                }
                command.push_str(&shell::quote(&arg));
            }
        }
        self
    }

    pub fn args(self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        args.into_iter().fold(self, |spec, arg| spec.arg(arg))
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn user(mut self, user: Option<&str>) -> Self {
        self.user = user.map(str::to_string);
        self
    }

    pub fn group(mut self, group: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self
    }

    pub fn is_shell(&self) -> bool {
        matches!(self.line, CommandLine::Shell(_))
    }

    /// Discrete arguments after the program, when not in shell mode.
    pub fn argv(&self) -> Option<&[String]> {
        match &self.line {
            CommandLine::Argv { args, .. } => Some(args),
            CommandLine::Shell(_) => None,
        }
    }

    /// Renders the command for logs and error messages.
    pub fn display(&self) -> String {
        match &self.line {
            CommandLine::Argv { program, args } => {
                let program = program.to_string_lossy();
                shell::join(std::iter::once(program.as_ref()).chain(args.iter().map(String::as_str)))
            }
            CommandLine::Shell(command) => command.clone(),
        }
    }

    pub fn validate(&self, action: InstallerAction) -> ExecutionResult<()> {
        match &self.line {
            CommandLine::Argv { program, args } => {
                if program.as_os_str().is_empty() {
                    return Err(invalid_input(action, "command program path must not be empty"));
                }
                if args.iter().any(|arg| arg.is_empty() || arg.contains('\0')) {
                    return Err(invalid_input(
                        action,
                        "command args must be non-empty and must not contain NUL bytes",
                    ));
                }
            }
            CommandLine::Shell(command) => {
                if command.trim().is_empty() || command.contains('\0') {
                    return Err(invalid_input(
                        action,
                        "shell command must be non-empty and must not contain NUL bytes",
                    ));
                }
            }
        }

        if self
            .env
            .iter()
            .any(|(key, value)| key.is_empty() || key.contains('\0') || value.contains('\0'))
        {
            return Err(invalid_input(
                action,
                "environment keys and values must be non-empty and must not contain NUL bytes",
            ));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessSpawnRequest {
    pub action: InstallerAction,
    pub command: CommandSpec,
}

impl ProcessSpawnRequest {
    pub fn new(action: InstallerAction, command: CommandSpec) -> Self {
        Self { action, command }
    }

    pub fn validate(&self) -> ExecutionResult<()> {
        self.command.validate(self.action)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessExitStatus {
    ExitCode(i32),
    Terminated,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessOutput {
    pub status: ProcessExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == ProcessExitStatus::ExitCode(0)
    }
}

pub trait RunningProcess: Send {
    fn pid(&self) -> Option<u32>;

    fn wait(self: Box<Self>) -> ProcessWaitFuture;
}

pub trait ProcessExecutor: Send + Sync {
    fn spawn(&self, request: ProcessSpawnRequest) -> ExecutionResult<Box<dyn RunningProcess>>;
}

pub fn spawn_validated(
    executor: &dyn ProcessExecutor,
    request: ProcessSpawnRequest,
) -> ExecutionResult<Box<dyn RunningProcess>> {
    request.validate()?;
    executor.spawn(request)
}

fn invalid_input(action: InstallerAction, message: &str) -> CoreError {
    CoreError::invalid_input(message).with_action(action)
}
