use nix::errno::Errno;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{command}: {message}")]
    Argument {
        command: String,
        message: &'static str,
    },
    #[error("{command}: {variable} not set")]
    Config {
        command: &'static str,
        variable: &'static str,
    },
    #[error("{context}: {}", .errno.desc())]
    Os { context: String, errno: Errno },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl ShellError {
    pub fn os(context: impl Into<String>, errno: Errno) -> Self {
        ShellError::Os {
            context: context.into(),
            errno,
        }
    }

    pub fn arguments(command: impl Into<String>, message: &'static str) -> Self {
        ShellError::Argument {
            command: command.into(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("pipeline starts with '|'")]
    LeadingPipe,
    #[error("pipeline ends with '|'")]
    TrailingPipe,
    #[error("consecutive '|' operators")]
    DoublePipe,
    #[error("empty command in pipeline stage {0}")]
    EmptyStage(usize),
    #[error("missing command")]
    EmptyCommand,
    #[error("too many pipeline stages (at most {max})")]
    TooManyStages { max: usize },
}

/// Exit status of a completed builtin, process or pipeline.
pub type ExecuteResult = Result<i32, ShellError>;
