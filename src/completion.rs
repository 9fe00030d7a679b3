use std::fs;
use std::path::{Path, PathBuf};
use rustyline::{
    Helper,
    completion::Completer as RustylineCompleter,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    completion::Pair,
    Context,
    Result,
};
use crate::builtins::BUILTINS;
use crate::tokenizer::is_operator;
use crate::utils::executables_on_path;

/// Tab completion for the interactive prompt: command names for the first
/// word of every stage, file-system paths after that.
pub struct Completer {
    commands: Vec<String>,
}

impl Completer {
    pub fn new() -> Self {
        let paths = std::env::var("PATH").unwrap_or_default();
        Self::with_commands(executables_on_path(&paths))
    }

    fn with_commands(external: Vec<String>) -> Self {
        let mut commands: Vec<String> = BUILTINS.iter().map(|&cmd| cmd.to_string()).collect();
        commands.extend(external);
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    pub fn complete(&self, line: &str) -> Vec<String> {
        let (before, word) = line.split_at(word_start(line));
        match before.trim_end().chars().last() {
            None | Some('|') => self.complete_command(word),
            Some(_) => self.complete_argument(word),
        }
    }

    fn complete_command(&self, prefix: &str) -> Vec<String> {
        self.commands.iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn complete_argument(&self, prefix: &str) -> Vec<String> {
        let (dir, name_prefix, shown_dir) = match prefix.rfind('/') {
            Some(slash) => {
                let shown = &prefix[..=slash];
                (PathBuf::from(shown), &prefix[slash + 1..], shown)
            }
            None => (PathBuf::from("."), prefix, ""),
        };

        let mut completions = Vec::new();
        if let Ok(entries) = fs::read_dir(&dir) {
            for entry in entries.filter_map(|r| r.ok()) {
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                if !name.starts_with(name_prefix) {
                    continue;
                }
                let mut candidate = format!("{shown_dir}{name}");
                if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                    candidate.push('/');
                }
                completions.push(candidate);
            }
        }
        completions.sort();
        completions
    }
}

/// Byte offset where the word under the cursor begins: just past the last
/// blank or operator character.
fn word_start(line: &str) -> usize {
    line.char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || is_operator(c))
        .map_or(0, |(i, c)| i + c.len_utf8())
}

impl Helper for Completer {}

impl RustylineCompleter for Completer {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>)> {
        let start = word_start(&line[..pos]);

        let pairs = self.complete(&line[..pos])
            .into_iter()
            .map(|s| Pair {
                display: Path::new(&s)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| s.clone()),
                replacement: s,
            })
            .collect();

        Ok((start, pairs))
    }
}

impl Highlighter for Completer {}
impl Hinter for Completer {
    type Hint = String;
}
impl Validator for Completer {}
