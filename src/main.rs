//! pipesh entry point.
//!
//! Usage:
//!   pipesh               # interactive when stdin is a terminal, batch otherwise
//!   pipesh script.txt    # run every line of a file

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use nix::sys::signal::{signal, SigHandler, Signal};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod ast;
mod builtins;
mod channel;
mod completion;
mod config;
mod executor;
mod parser;
mod process;
mod processor;
mod tokenizer;
mod types;
mod utils;

#[cfg(test)]
mod tests;

use completion::Completer;
use config::{Cli, ShellConfig};
use executor::{Executor, Flow};
use tokenizer::tokenize;

const PROMPT: &str = "$ ";

fn main() {
    // Diagnostics go to stderr so they never mix with command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("pipesh: {e:#}");
            exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let config = ShellConfig::from_cli(cli, io::stdin().is_terminal());
    tracing::debug!(?config, "starting interpreter");
    let mut executor = Executor::new(config);

    if executor.config().interactive {
        // SAFETY: ignoring a signal installs no handler code.
        unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }
            .context("failed to ignore SIGINT")?;
        return run_interactive(&mut executor);
    }

    match &cli.script {
        Some(path) => {
            let file = File::open(path).with_context(|| path.display().to_string())?;
            run_batch(&mut executor, BufReader::new(file))
        }
        None => run_batch(&mut executor, io::stdin().lock()),
    }
}

fn run_interactive(executor: &mut Executor) -> Result<i32> {
    let mut rl: Editor<Completer, DefaultHistory> =
        Editor::new().context("failed to create line editor")?;
    rl.set_helper(Some(Completer::new()));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let tokens = tokenize(&line, executor.config().max_tokens);
                if let Flow::Exit(code) = executor.run_line(tokens) {
                    return Ok(code);
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                return Ok(0);
            }
            Err(e) => return Err(e).context("failed to read line"),
        }
    }
}

fn run_batch(executor: &mut Executor, mut input: impl BufRead) -> Result<i32> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            return Ok(0);
        }
        let tokens = tokenize(&line, executor.config().max_tokens);
        if let Flow::Exit(code) = executor.run_line(tokens) {
            return Ok(code);
        }
    }
}
