//! Thread handle with cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use spindle_core::lifecycle::{self, ThreadEffect, ThreadOp};
pub use spindle_core::lifecycle::ThreadState;

use crate::error::Error;
use crate::registry;

/// Clonable cancellation token shared with the spawned function.
///
/// [`Thread::kill`] only requests cancellation; the spawned function
/// decides when to observe the request and return. A function that never
/// polls its token runs to completion as a detached thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// True once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Handle to one concurrently executing unit of work.
///
/// Spawning starts the function immediately. The handle must reach a
/// terminal state exactly once: either [`kill`](Thread::kill) (request
/// cancellation, release the handle) or [`join`](Thread::join) (wait for
/// the function to return). Dropping a still-running handle joins
/// implicitly, preferring deterministic cleanup over a detached runaway;
/// that drop may block indefinitely, so callers needing non-blocking
/// teardown must `kill` first.
#[derive(Debug)]
pub struct Thread {
    id: u64,
    state: ThreadState,
    cancel: CancelToken,
    handle: Option<JoinHandle<i32>>,
    status: Option<i32>,
}

impl Thread {
    /// Start `f` on a new OS thread immediately.
    ///
    /// The closure carries both the entry point and its data, and receives
    /// the thread's [`CancelToken`] to poll for cancellation requests. Its
    /// `i32` return value becomes the exit status reported by
    /// [`status`](Thread::status) after a join.
    pub fn spawn<F>(f: F) -> Result<Thread, Error>
    where
        F: FnOnce(CancelToken) -> i32 + Send + 'static,
    {
        Thread::spawn_inner(None, f)
    }

    /// Start `f` on a new OS thread with a caller-chosen name.
    pub fn spawn_named<F>(name: &str, f: F) -> Result<Thread, Error>
    where
        F: FnOnce(CancelToken) -> i32 + Send + 'static,
    {
        if name.is_empty() {
            return Err(Error::InvalidArgument("thread name must not be empty"));
        }
        Thread::spawn_inner(Some(name.to_owned()), f)
    }

    fn spawn_inner<F>(name: Option<String>, f: F) -> Result<Thread, Error>
    where
        F: FnOnce(CancelToken) -> i32 + Send + 'static,
    {
        let id = registry::next_thread_id();
        let cancel = CancelToken::default();
        let token = cancel.clone();
        let name = name.unwrap_or_else(|| format!("spindle-{id}"));

        // Registered before the spawn so the record exists as soon as the
        // handle does; the child removes it when the function returns.
        registry::register(id, &name);
        let spawned = thread::Builder::new().name(name).spawn(move || {
            registry::adopt_current(id);
            let _live = registry::LiveGuard::new(id);
            f(token)
        });

        match spawned {
            Ok(handle) => Ok(Thread {
                id,
                state: ThreadState::Running,
                cancel,
                handle: Some(handle),
                status: None,
            }),
            Err(err) => {
                registry::deregister(id);
                Err(Error::platform(
                    "spawn",
                    err.raw_os_error().unwrap_or(libc::EAGAIN),
                ))
            }
        }
    }

    /// Request cancellation and release the handle.
    ///
    /// Cancellation is cooperative: the token is flipped and the thread is
    /// detached, never forcibly terminated, so locks and other resources
    /// held by the thread are released when its function observes the
    /// request and returns. Last-resort teardown only. Idempotent: a no-op
    /// once the thread is killed or joined.
    pub fn kill(&mut self) {
        let transition = lifecycle::thread_transition(self.state, ThreadOp::Kill);
        if matches!(transition.effect, ThreadEffect::RequestCancel) {
            self.cancel.request();
            drop(self.handle.take());
        }
        self.state = transition.next;
    }

    /// Block until the thread's function returns.
    ///
    /// Stores the exit status on completion. Idempotent: joining an
    /// already joined or killed thread is a no-op returning `Ok`. A child
    /// that unwound instead of returning surfaces [`Error::Panicked`].
    pub fn join(&mut self) -> Result<(), Error> {
        let transition = lifecycle::thread_transition(self.state, ThreadOp::Join);
        self.state = transition.next;
        if matches!(transition.effect, ThreadEffect::AwaitExit) {
            return self.await_exit();
        }
        Ok(())
    }

    fn await_exit(&mut self) -> Result<(), Error> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(status) => {
                self.status = Some(status);
                Ok(())
            }
            Err(_) => Err(Error::Panicked),
        }
    }

    /// Registry id of this thread.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state of the handle.
    #[must_use]
    pub fn state(&self) -> ThreadState {
        self.state
    }

    /// Exit status of the thread's function, once joined.
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        self.status
    }

    /// Token shared with the spawned function.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        let transition = lifecycle::thread_transition(self.state, ThreadOp::Finalize);
        self.state = transition.next;
        if matches!(transition.effect, ThreadEffect::AwaitExit) {
            // Nowhere to report a child panic from drop; the status simply
            // stays unset.
            let _ = self.await_exit();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_runs_and_join_stores_status() {
        let mut t = Thread::spawn(|_token| 42).expect("spawn");
        t.join().expect("join");
        assert_eq!(t.status(), Some(42));
        assert_eq!(t.state(), ThreadState::Joined);
    }

    #[test]
    fn empty_name_is_rejected_before_spawning() {
        let err = Thread::spawn_named("", |_token| 0).unwrap_err();
        assert_eq!(err, Error::InvalidArgument("thread name must not be empty"));
    }

    #[test]
    fn panicked_child_surfaces_on_join() {
        let mut t = Thread::spawn(|_token| panic!("child failure")).expect("spawn");
        assert_eq!(t.join().unwrap_err(), Error::Panicked);
        assert_eq!(t.status(), None);
        assert_eq!(t.state(), ThreadState::Joined);
    }
}
