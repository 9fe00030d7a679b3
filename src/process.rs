//! Forking, child-side descriptor setup, exec and reaping.
//!
//! Everything that runs in the child between `fork` and `execvp` sticks to
//! async-signal-safe calls: no allocation, no locks, no logging. Messages
//! are written straight to fd 2 and the child leaves through `_exit`.

use std::ffi::CStr;
use std::os::fd::RawFd;

use libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, fork, ForkResult, Pid};

use crate::ast::PreparedStage;
use crate::config::ChildSignals;
use crate::types::ShellError;

/// Status a child exits with when `execvp` fails.
pub const EXEC_FAILURE: i32 = 128;
/// Status a child exits with when its redirection cannot be set up.
pub const REDIRECT_FAILURE: i32 = 1;

/// Everything one child needs, resolved before the fork.
#[derive(Debug)]
pub struct Launch<'a> {
    pub stage: &'a PreparedStage,
    /// Channel read end to place on stdin.
    pub stdin: Option<RawFd>,
    /// Channel write end to place on stdout.
    pub stdout: Option<RawFd>,
    /// Channel descriptors inherited from the parent, closed before exec.
    pub inherited: &'a [RawFd],
    pub signals: ChildSignals,
}

/// Forks a child that runs `launch`. Returns the child's pid in the parent.
pub fn spawn(launch: &Launch<'_>) -> Result<Pid, ShellError> {
    // SAFETY: the child only performs async-signal-safe operations before
    // it either replaces its image or calls `_exit`.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            tracing::debug!(pid = child.as_raw(), program = ?launch.stage.argv().first(), "spawned child");
            Ok(child)
        }
        Ok(ForkResult::Child) => run_child(launch),
        Err(errno) => Err(ShellError::os("fork", errno)),
    }
}

fn run_child(launch: &Launch<'_>) -> ! {
    // SAFETY: resetting to the default action installs no handler.
    unsafe {
        // The Rust runtime starts with SIGPIPE ignored; exec'd programs expect the default.
        let _ = signal(Signal::SIGPIPE, SigHandler::SigDfl);
        if launch.signals == ChildSignals::RestoreDefault {
            let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
        }
    }

    if let Some(fd) = launch.stdin {
        duplicate_or_exit(fd, STDIN_FILENO);
    }
    if let Some(fd) = launch.stdout {
        duplicate_or_exit(fd, STDOUT_FILENO);
    }

    // File redirection comes after the channel wiring and overrides it.
    if let Some(path) = &launch.stage.input {
        redirect_file(path, OFlag::O_RDONLY, STDIN_FILENO);
    }
    if let Some(path) = &launch.stage.output {
        redirect_file(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, STDOUT_FILENO);
    }

    // A reader only sees EOF once every copy of the write end is gone,
    // including the ones this child inherited.
    for &fd in launch.inherited {
        if fd > STDERR_FILENO {
            let _ = close(fd);
        }
    }

    // The pointer array was built before the fork; nothing here may allocate.
    let argv = launch.stage.argv_ptrs();
    let errno = match argv.first() {
        Some(program) if !program.is_null() => {
            // SAFETY: `argv` is NULL-terminated and every entry points into a
            // CString owned by `launch.stage`, which outlives this call.
            unsafe { libc::execvp(*program, argv.as_ptr()) };
            Errno::last()
        }
        _ => Errno::ENOENT,
    };
    report(launch.stage.argv().first().map_or(c"", |a| a.as_c_str()), errno);
    exit_child(EXEC_FAILURE)
}

fn exit_child(code: i32) -> ! {
    // SAFETY: `_exit` skips atexit handlers and stdio flushing, which must
    // not run in a forked child.
    unsafe { libc::_exit(code) }
}

fn redirect_file(path: &CStr, flags: OFlag, target: RawFd) {
    let mode = Mode::from_bits_truncate(0o666);
    match open(path, flags, mode) {
        Ok(fd) => {
            duplicate_or_exit(fd, target);
            let _ = close(fd);
        }
        Err(errno) => {
            report(path, errno);
            exit_child(REDIRECT_FAILURE)
        }
    }
}

fn duplicate_or_exit(fd: RawFd, target: RawFd) {
    if let Err(errno) = dup2(fd, target) {
        report(c"dup2", errno);
        exit_child(REDIRECT_FAILURE)
    }
}

/// Writes `subject: description` to fd 2 without allocating.
fn report(subject: &CStr, errno: Errno) {
    for part in [subject.to_bytes(), b": ", errno.desc().as_bytes(), b"\n"] {
        // SAFETY: `part` is a valid, initialized buffer of `part.len()` bytes.
        unsafe { libc::write(STDERR_FILENO, part.as_ptr().cast(), part.len()) };
    }
}

/// Blocks until `pid` has exited or was killed, skipping stop and continue
/// notifications. A signal death maps to `128 + signal number`.
pub fn reap(pid: Pid) -> Result<i32, ShellError> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => {
                tracing::debug!(pid = pid.as_raw(), code, "child exited");
                return Ok(code);
            }
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                tracing::debug!(pid = pid.as_raw(), signal = ?sig, "child killed by signal");
                return Ok(128 + sig as i32);
            }
            Ok(other) => tracing::trace!(?other, "ignoring wait notification"),
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(ShellError::os("waitpid", errno)),
        }
    }
}
