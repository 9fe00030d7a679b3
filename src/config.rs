use std::path::PathBuf;

use clap::builder::TypedValueParser;
use clap::Parser;

pub const DEFAULT_MAX_TOKENS: usize = 32;
pub const DEFAULT_MAX_STAGES: usize = 5;

/// Signal disposition a freshly forked child applies before exec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSignals {
    /// Put SIGINT back to its default action, undoing the interpreter's ignore.
    RestoreDefault,
    /// Leave whatever the interpreter has installed.
    Inherit,
}

#[derive(Debug, Parser)]
#[command(name = "pipesh", version, about = "A small command interpreter with pipelines and redirection")]
pub struct Cli {
    /// Read commands from this file instead of standard input
    pub script: Option<PathBuf>,

    /// Maximum number of stages in one pipeline
    #[arg(long, env = "PIPESH_MAX_STAGES", default_value_t = DEFAULT_MAX_STAGES,
          value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub max_stages: usize,

    /// Maximum number of tokens read from one line
    #[arg(long, env = "PIPESH_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: usize,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub max_tokens: usize,
    pub max_stages: usize,
    pub interactive: bool,
    pub child_signals: ChildSignals,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_stages: DEFAULT_MAX_STAGES,
            interactive: false,
            child_signals: ChildSignals::RestoreDefault,
        }
    }
}

impl ShellConfig {
    pub fn from_cli(cli: &Cli, stdin_is_terminal: bool) -> Self {
        Self {
            max_tokens: cli.max_tokens,
            max_stages: cli.max_stages,
            interactive: cli.script.is_none() && stdin_is_terminal,
            ..Self::default()
        }
    }
}
