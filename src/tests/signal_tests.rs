use nix::sys::signal::{signal, SigHandler, Signal};

use super::*;

/// Ignores SIGINT in the test process the way the interactive loop does,
/// restoring the previous disposition on drop.
struct InterruptIgnored(SigHandler);

impl InterruptIgnored {
    fn install() -> Self {
        // SAFETY: ignoring a signal installs no handler code.
        let previous = unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }.unwrap();
        Self(previous)
    }
}

impl Drop for InterruptIgnored {
    fn drop(&mut self) {
        // SAFETY: puts back the disposition saved by `install`.
        let _ = unsafe { signal(Signal::SIGINT, self.0) };
    }
}

#[test]
fn test_children_restore_default_interrupt() {
    let _state = exclusive_state();
    let _ignored = InterruptIgnored::install();

    let mut executor = Executor::new(ShellConfig::default());
    assert_eq!(executor.config().child_signals, ChildSignals::RestoreDefault);
    run(&mut executor, "sh -c 'kill -INT $$'");
    assert_eq!(executor.last_status(), 128 + libc::SIGINT);

    run(&mut executor, "sh -c 'kill -INT $$' | cat");
    assert_eq!(executor.last_status(), 0);
    run(&mut executor, "cat /dev/null | sh -c 'kill -INT $$'");
    assert_eq!(executor.last_status(), 128 + libc::SIGINT);
}

#[test]
fn test_children_inherit_ignored_interrupt() {
    let _state = exclusive_state();
    let _ignored = InterruptIgnored::install();

    let mut executor = session();
    assert_eq!(executor.config().child_signals, ChildSignals::Inherit);
    run(&mut executor, "sh -c 'kill -INT $$'");
    assert_eq!(executor.last_status(), 0);
}
