use std::alloc::{GlobalAlloc, Layout, System};
use std::env;
use std::ffi::OsString;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{ChildSignals, ShellConfig};
use crate::executor::{Executor, Flow};
use crate::tokenizer::tokenize;

mod signal_tests;
mod tokenizer_tests;

/// Exit status of a forked child that touched the heap before exec.
pub(crate) const CHILD_ALLOCATED: i32 = 77;

static IN_FORKED_CHILD: AtomicBool = AtomicBool::new(false);

/// System allocator that kills any forked child of the test binary the
/// moment it allocates or frees before replacing its image.
struct ForkCheckedAllocator;

unsafe impl GlobalAlloc for ForkCheckedAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if IN_FORKED_CHILD.load(Ordering::Relaxed) {
            libc::_exit(CHILD_ALLOCATED);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if IN_FORKED_CHILD.load(Ordering::Relaxed) {
            libc::_exit(CHILD_ALLOCATED);
        }
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static ALLOCATOR: ForkCheckedAllocator = ForkCheckedAllocator;

unsafe extern "C" fn mark_forked_child() {
    IN_FORKED_CHILD.store(true, Ordering::Relaxed);
}

fn watch_child_allocations() {
    static ARMED: Once = Once::new();
    ARMED.call_once(|| {
        // SAFETY: the child handler only stores to an atomic.
        let rc = unsafe { libc::pthread_atfork(None, None, Some(mark_forked_child)) };
        assert_eq!(rc, 0, "pthread_atfork failed");
    });
}

/// Read by every test that forks; written by tests that change the working
/// directory, the environment or signal dispositions.
static PROCESS_STATE: RwLock<()> = RwLock::new(());

pub(crate) fn shared_state() -> RwLockReadGuard<'static, ()> {
    watch_child_allocations();
    PROCESS_STATE.read().unwrap_or_else(PoisonError::into_inner)
}

/// Sole access to process-wide state. The working directory and `HOME`
/// are put back on drop, whether or not the test passed.
pub(crate) struct ExclusiveState {
    cwd: PathBuf,
    home: Option<OsString>,
    _lock: RwLockWriteGuard<'static, ()>,
}

pub(crate) fn exclusive_state() -> ExclusiveState {
    watch_child_allocations();
    let lock = PROCESS_STATE.write().unwrap_or_else(PoisonError::into_inner);
    ExclusiveState {
        cwd: env::current_dir().unwrap(),
        home: env::var_os("HOME"),
        _lock: lock,
    }
}

impl Drop for ExclusiveState {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.cwd);
        match &self.home {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }
    }
}

/// An executor for tests that only need shared access.
pub(crate) struct TestShell {
    executor: Executor,
    _shared: RwLockReadGuard<'static, ()>,
}

impl Deref for TestShell {
    type Target = Executor;

    fn deref(&self) -> &Executor {
        &self.executor
    }
}

impl DerefMut for TestShell {
    fn deref_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }
}

fn executor() -> TestShell {
    TestShell {
        _shared: shared_state(),
        executor: session(),
    }
}

/// A bare executor, for tests already holding `exclusive_state`.
fn session() -> Executor {
    Executor::new(ShellConfig {
        child_signals: ChildSignals::Inherit,
        ..ShellConfig::default()
    })
}

fn run(executor: &mut Executor, line: &str) -> Flow {
    let tokens = tokenize(line, executor.config().max_tokens);
    executor.run_line(tokens)
}
