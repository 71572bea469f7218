use crate::models::InstallerAction;

pub type InstallerResult<T> = Result<T, CoreError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CoreErrorKind {
    InvalidInput,
    ParseFailure,
    ProcessFailure,
    Internal,
}

/// Streams captured from an installer invocation that did not succeed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapturedOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub action: Option<InstallerAction>,
    pub kind: CoreErrorKind,
    pub message: String,
    pub output: Option<CapturedOutput>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            action: None,
            kind,
            message: message.into(),
            output: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::InvalidInput, message)
    }

    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::ParseFailure, message)
    }

    pub fn with_action(mut self, action: InstallerAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_output(mut self, output: CapturedOutput) -> Self {
        self.output = Some(output);
        self
    }
}
