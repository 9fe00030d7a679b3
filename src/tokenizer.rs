use std::iter::Peekable;
use std::str::Chars;

type Input<'a> = Peekable<Chars<'a>>;

/// Characters that form a token on their own.
pub fn is_operator(c: char) -> bool {
    matches!(c, '|' | '<' | '>')
}

/// Splits a line into at most `max_tokens` word tokens. `|`, `<` and `>`
/// always stand alone; quotes group words and are removed.
pub fn tokenize(input: &str, max_tokens: usize) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while tokens.len() < max_tokens {
        skip_blanks(&mut chars);
        let Some(&c) = chars.peek() else {
            break;
        };
        if is_operator(c) {
            chars.next();
            tokens.push(c.to_string());
        } else {
            tokens.push(tokenize_word(&mut chars));
        }
    }
    tokens
}

fn skip_blanks(chars: &mut Input<'_>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn tokenize_word(chars: &mut Input<'_>) -> String {
    let mut word = String::new();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() || is_operator(c) => break,
            '\'' | '"' => tokenize_quoted(chars, &mut word),
            '\\' => {
                chars.next(); // consume backslash
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            _ => {
                word.push(c);
                chars.next();
            }
        }
    }
    word
}

/// Appends the contents of one quoted section to `word`. An unterminated
/// quote runs to the end of the line.
fn tokenize_quoted(chars: &mut Input<'_>, word: &mut String) {
    let Some(quote) = chars.next() else {
        return;
    };

    while let Some(c) = chars.next() {
        match c {
            c if c == quote => return,
            '\\' if quote == '"' && matches!(chars.peek(), Some('"' | '\\')) => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            _ => word.push(c),
        }
    }
}
