//! Process-wide panic reporting shared by every running [`Cli`](crate::Cli).
//!
//! The first live [`ListenerGuard`] installs a panic hook that logs through
//! `tracing` and then forwards to the previous hook. The last guard dropped
//! puts the previous hook back.

use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Mutex, MutexGuard};

type PanicHook = dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static;

struct Registry {
    count: usize,
    previous: Option<Arc<PanicHook>>,
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    count: 0,
    previous: None,
});

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Number of guards currently alive in this process.
pub fn active_listeners() -> usize {
    registry().count
}

/// Keeps the panic hook installed while alive.
///
/// When the last guard drops, the hook that was installed before the first
/// guard is put back. A hook set with [`std::panic::set_hook`] while guards
/// were alive is discarded at that point, so install custom hooks before
/// acquiring a guard or after the last one is gone.
#[derive(Debug)]
#[must_use = "the hook is removed again when the guard is dropped"]
pub struct ListenerGuard {
    _private: (),
}

impl ListenerGuard {
    pub fn acquire() -> Self {
        let mut reg = registry();
        reg.count += 1;
        if reg.previous.is_none() {
            let previous: Arc<PanicHook> = Arc::from(panic::take_hook());
            let forward = Arc::clone(&previous);
            panic::set_hook(Box::new(move |info| {
                tracing::error!("panic: {info}");
                (*forward)(info);
            }));
            reg.previous = Some(previous);
            tracing::trace!("panic hook installed");
        }
        Self { _private: () }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut reg = registry();
        reg.count = reg.count.saturating_sub(1);
        // set_hook panics on a panicking thread; leave ours until the next release.
        if reg.count > 0 || std::thread::panicking() {
            return;
        }
        if let Some(previous) = reg.previous.take() {
            panic::set_hook(Box::new(move |info| (*previous)(info)));
            tracing::trace!("panic hook restored");
        }
    }
}
