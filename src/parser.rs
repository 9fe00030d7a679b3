use crate::ast::{CommandShape, Stage};
use crate::builtins;
use crate::types::SyntaxError;

pub const PIPE: &str = "|";
pub const REDIRECT_IN: &str = "<";
pub const REDIRECT_OUT: &str = ">";

pub fn classify(tokens: &[String]) -> CommandShape {
    let Some(first) = tokens.first() else {
        return CommandShape::Empty;
    };

    // Builtins are checked before any operator, so `cd | foo` is still a builtin.
    if builtins::is_builtin(first) {
        CommandShape::Builtin
    } else if tokens.iter().any(|t| t == PIPE) {
        CommandShape::Pipeline
    } else if tokens.iter().any(|t| t == REDIRECT_IN || t == REDIRECT_OUT) {
        CommandShape::Redirected
    } else {
        CommandShape::Simple
    }
}

fn validate_pipes(tokens: &[String]) -> Result<(), SyntaxError> {
    if tokens.first().is_some_and(|t| t == PIPE) {
        return Err(SyntaxError::LeadingPipe);
    }
    if tokens.last().is_some_and(|t| t == PIPE) {
        return Err(SyntaxError::TrailingPipe);
    }
    if tokens.windows(2).any(|w| w[0] == PIPE && w[1] == PIPE) {
        return Err(SyntaxError::DoublePipe);
    }
    Ok(())
}

/// Splits a token sequence into stages, pulling `<` / `>` and their file
/// names out of each stage's argument list.
///
/// A line without `|` yields exactly one stage, which is how single
/// redirected commands are parsed too.
pub fn parse_stages(tokens: &[String], max_stages: usize) -> Result<Vec<Stage>, SyntaxError> {
    validate_pipes(tokens)?;

    let mut stages = Vec::new();
    let mut current = Stage::default();
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        match token.as_str() {
            PIPE => stages.push(std::mem::take(&mut current)),
            REDIRECT_IN | REDIRECT_OUT => {
                // An operator without a usable file name is dropped.
                let Some(file) = iter.next_if(|next| *next != PIPE) else {
                    continue;
                };
                if token == REDIRECT_IN {
                    current.input = Some(file.clone());
                } else {
                    current.output = Some(file.clone());
                }
            }
            _ => current.args.push(token.clone()),
        }
    }
    stages.push(current);

    if let Some(index) = stages.iter().position(|s| s.args.is_empty()) {
        return Err(if stages.len() == 1 {
            SyntaxError::EmptyCommand
        } else {
            SyntaxError::EmptyStage(index + 1)
        });
    }
    if stages.len() > max_stages {
        return Err(SyntaxError::TooManyStages { max: max_stages });
    }

    Ok(stages)
}
