use std::io;

use nix::unistd::Pid;

use crate::ast::{CommandShape, PreparedStage, Stage};
use crate::builtins::{self, BuiltinOutcome};
use crate::channel::Channels;
use crate::config::ShellConfig;
use crate::parser::{classify, parse_stages};
use crate::process::{self, Launch};
use crate::processor::expand_status;
use crate::types::{ExecuteResult, ShellError};

/// What the main loop should do after a line has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// An interpreter session: the configuration plus the status of the last
/// completed command, which `$?` expands to.
#[derive(Debug)]
pub struct Executor {
    config: ShellConfig,
    last_status: i32,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl Executor {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            last_status: 0,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    /// Expands `$?`, then classifies and runs the line.
    pub fn run_line(&mut self, mut tokens: Vec<String>) -> Flow {
        expand_status(&mut tokens, self.last_status);
        self.execute(&tokens)
    }

    /// Runs one tokenized command and records its exit status. Errors are
    /// reported on stderr here and become status 1.
    #[tracing::instrument(level = "debug", skip(self, tokens), fields(token_count = tokens.len()))]
    pub fn execute(&mut self, tokens: &[String]) -> Flow {
        let shape = classify(tokens);
        tracing::debug!(?shape, "dispatching command");

        let result = match shape {
            CommandShape::Empty => return Flow::Continue,
            CommandShape::Builtin => {
                let outcome =
                    builtins::execute_builtin(&tokens[0], &tokens[1..], &mut io::stdout().lock());
                match outcome {
                    Ok(BuiltinOutcome::Exit(code)) => return Flow::Exit(code),
                    Ok(BuiltinOutcome::Status(status)) => Ok(status),
                    Err(err) => Err(err),
                }
            }
            CommandShape::Simple | CommandShape::Redirected => self.run_single(tokens),
            CommandShape::Pipeline => self.run_pipeline(tokens),
        };

        self.last_status = result.unwrap_or_else(|err| {
            eprintln!("{err}");
            1
        });
        tracing::debug!(status = self.last_status, "command finished");
        Flow::Continue
    }

    fn run_single(&self, tokens: &[String]) -> ExecuteResult {
        let mut stages = parse_stages(tokens, 1)?;
        let stage = stages.remove(0).prepare()?;

        let pid = process::spawn(&Launch {
            stage: &stage,
            stdin: None,
            stdout: None,
            inherited: &[],
            signals: self.config.child_signals,
        })?;
        process::reap(pid)
    }

    fn run_pipeline(&self, tokens: &[String]) -> ExecuteResult {
        let stages = parse_stages(tokens, self.config.max_stages)?;
        let prepared = stages
            .iter()
            .map(Stage::prepare)
            .collect::<Result<Vec<_>, _>>()?;
        self.run_stages(&prepared, process::spawn)
    }

    /// Wires `prepared` together with channels and starts every stage through
    /// `spawn`. If a spawn fails, the stages already started are still reaped
    /// before the error is returned.
    fn run_stages(
        &self,
        prepared: &[PreparedStage],
        mut spawn: impl FnMut(&Launch<'_>) -> Result<Pid, ShellError>,
    ) -> ExecuteResult {
        let last = prepared.len() - 1;

        let channels = Channels::open(last)?;
        let inherited = channels.raw_fds();

        let mut children = Vec::with_capacity(prepared.len());
        let mut spawn_error = None;
        for (i, stage) in prepared.iter().enumerate() {
            let launch = Launch {
                stage,
                stdin: (i > 0).then(|| channels.reader(i - 1)),
                stdout: (i < last).then(|| channels.writer(i)),
                inherited: &inherited,
                signals: self.config.child_signals,
            };
            match spawn(&launch) {
                Ok(pid) => children.push(pid),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        // The parent's ends must be closed before waiting, or no stage
        // reading from a channel would ever see end of input.
        drop(channels);

        let mut status = 1;
        for (i, pid) in children.into_iter().enumerate() {
            match process::reap(pid) {
                Ok(code) if i == last => status = code,
                Ok(_) => {}
                Err(err) => tracing::warn!(pid = pid.as_raw(), %err, "failed to reap pipeline stage"),
            }
        }

        match spawn_error {
            Some(err) => Err(err),
            None => Ok(status),
        }
    }
}
