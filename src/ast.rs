use std::ffi::CString;
use std::ptr;

use libc::c_char;

use crate::types::ShellError;

/// What a tokenized line turns out to be once its operators are inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandShape {
    Empty,
    Builtin,
    Simple,
    Redirected,
    Pipeline,
}

/// One command of a pipeline together with its own file redirection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    pub args: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

impl Stage {
    /// Converts everything the child will need into C strings, so nothing
    /// has to be allocated after the fork.
    pub fn prepare(&self) -> Result<PreparedStage, ShellError> {
        let name = self.args.first().map(String::as_str).unwrap_or_default();
        let to_c = |s: &str| {
            CString::new(s).map_err(|_| ShellError::arguments(name, "argument contains a NUL byte"))
        };

        let argv: Vec<CString> = self
            .args
            .iter()
            .map(|a| to_c(a.as_str()))
            .collect::<Result<_, _>>()?;
        // The pointers target the CStrings' heap buffers, which stay put
        // when `argv` itself is moved into the struct below.
        let argv_ptrs = argv
            .iter()
            .map(|a| a.as_ptr())
            .chain([ptr::null()])
            .collect();

        Ok(PreparedStage {
            argv,
            argv_ptrs,
            input: self.input.as_deref().map(to_c).transpose()?,
            output: self.output.as_deref().map(to_c).transpose()?,
        })
    }
}

#[derive(Debug)]
pub struct PreparedStage {
    argv: Vec<CString>,
    /// NULL-terminated `argv` for `execvp`, pointing into `argv`.
    argv_ptrs: Vec<*const c_char>,
    pub input: Option<CString>,
    pub output: Option<CString>,
}

impl PreparedStage {
    pub fn argv(&self) -> &[CString] {
        &self.argv
    }

    pub fn argv_ptrs(&self) -> &[*const c_char] {
        &self.argv_ptrs
    }
}
