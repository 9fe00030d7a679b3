use std::env;
use std::io::Write;

use nix::unistd;

use crate::types::ShellError;

pub const BUILTINS: [&str; 3] = ["cd", "pwd", "exit"];

/// What the interpreter should do after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    Status(i32),
    Exit(i32),
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Runs a builtin in the interpreter's own process. `out` receives anything
/// the builtin prints on standard output.
pub fn execute_builtin(
    name: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<BuiltinOutcome, ShellError> {
    match name {
        "cd" => change_dir(args).map(|()| BuiltinOutcome::Status(0)),
        "pwd" => print_working_dir(args, out).map(|()| BuiltinOutcome::Status(0)),
        "exit" => match args {
            [] => Ok(BuiltinOutcome::Exit(0)),
            [code] => Ok(BuiltinOutcome::Exit(parse_exit_code(code))),
            _ => Err(ShellError::arguments("exit", "too many arguments")),
        },
        _ => Err(ShellError::arguments(name, "not a builtin")),
    }
}

fn change_dir(args: &[String]) -> Result<(), ShellError> {
    let target = match args {
        [] => env::var_os("HOME").ok_or(ShellError::Config {
            command: "cd",
            variable: "HOME",
        })?,
        [path] => path.into(),
        _ => return Err(ShellError::arguments("cd", "wrong number of arguments")),
    };
    unistd::chdir(target.as_os_str()).map_err(|e| ShellError::os("cd", e))
}

fn print_working_dir(args: &[String], out: &mut dyn Write) -> Result<(), ShellError> {
    if !args.is_empty() {
        return Err(ShellError::arguments("pwd", "too many arguments"));
    }
    let cwd = unistd::getcwd().map_err(|e| ShellError::os("pwd", e))?;
    writeln!(out, "{}", cwd.display())?;
    out.flush()?;
    Ok(())
}

/// Permissive decimal parse: optional leading whitespace and sign, then as
/// many digits as are present. Anything unparsable counts as 0.
pub fn parse_exit_code(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
