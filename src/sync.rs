//! Small synchronization helpers shared between animation tasks and the
//! threads that control them.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Cooperative cancellation flag shared between a controller and one task.
///
/// Tasks never get killed; they observe the token at their own pace, either
/// by polling [`CancelToken::is_cancelled`] between steps or by sleeping
/// through [`CancelToken::sleep`], which wakes early when the token fires.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Flag>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Fires the token and wakes every sleeper. Idempotent.
    pub fn cancel(&self) {
        self.inner.set();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_set()
    }

    /// Sleeps for `duration` unless the token fires first.
    ///
    /// Returns `true` if the full duration elapsed and `false` if the token
    /// was already fired or fired mid-sleep. Animation delays use the return
    /// value to bail out of their loops promptly.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> bool {
        !self.inner.wait_timeout(duration)
    }
}

/// One-shot completion latch. Set once, observed by any number of waiters.
#[derive(Clone, Default)]
pub(crate) struct Latch {
    inner: Arc<Flag>,
}

impl Latch {
    pub(crate) fn new() -> Latch {
        Latch::default()
    }

    pub(crate) fn set(&self) {
        self.inner.set();
    }

    /// Waits until the latch is set or `timeout` passes.
    /// Returns `true` if the latch was set in time.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        self.inner.wait_timeout(timeout)
    }
}

#[derive(Default)]
struct Flag {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl Flag {
    fn set(&self) {
        let mut set = self.state.lock().unwrap();
        *set = true;
        self.condvar.notify_all();
    }

    fn is_set(&self) -> bool {
        *self.state.lock().unwrap()
    }

    /// Returns `true` if the flag was set before `timeout` elapsed.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut set = self.state.lock().unwrap();
        // Condvar waits can wake spuriously, so loop against the deadline.
        while !*set {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .condvar
                .wait_timeout(set, deadline - now)
                .unwrap();
            set = guard;
        }
        true
    }
}
