//! Binary mutex and its scoped lock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Error;
use crate::sys::RawMutex;

/// Binary mutual-exclusion primitive.
///
/// Owns one native mutex handle, created unlocked. Locking is mediated
/// exclusively through [`Mutex::lock`], which returns the scoped [`Lock`]
/// guard; there is no unscoped lock/unlock pair to mismatch. The native
/// handle is destroyed on drop, and because a live guard or a blocked
/// waiter borrows the mutex, dropping it while locked does not compile.
pub struct Mutex {
    raw: RawMutex,
    contended: AtomicU64,
}

impl Mutex {
    /// Create an unlocked mutex.
    pub fn new() -> Result<Mutex, Error> {
        let raw = RawMutex::new().map_err(|errno| Error::platform("pthread_mutex_init", errno))?;
        Ok(Mutex {
            raw,
            contended: AtomicU64::new(0),
        })
    }

    /// Acquire the mutex, blocking until it is free.
    ///
    /// The returned guard holds the mutex until dropped. There is no
    /// timeout and no try-lock variant: acquisition either succeeds or
    /// blocks. Which of several blocked callers acquires next is left to
    /// the scheduler.
    pub fn lock(&self) -> Result<Lock<'_>, Error> {
        match self.raw.try_lock() {
            Ok(()) => {}
            Err(libc::EBUSY) => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                self.raw
                    .lock()
                    .map_err(|errno| Error::platform("pthread_mutex_lock", errno))?;
            }
            Err(errno) => return Err(Error::platform("pthread_mutex_trylock", errno)),
        }
        Ok(Lock { mutex: self })
    }

    pub(crate) fn raw_ptr(&self) -> *mut libc::pthread_mutex_t {
        self.raw.as_ptr()
    }

    pub(crate) fn raw_unlock(&self) -> Result<(), i32> {
        self.raw.unlock()
    }

    /// Test hook: number of `lock` calls that found the mutex held.
    #[doc(hidden)]
    #[must_use]
    pub fn contended_acquires_for_tests(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }
}

/// Scoped lock on a [`Mutex`].
///
/// Holding a `Lock` is holding the mutex: the guard is created only by
/// [`Mutex::lock`] and releases on every exit path when dropped, so it
/// cannot be leaked without leaking its enclosing scope. Waiting on a
/// [`Condition`](crate::Condition) consumes the guard, which makes "the
/// lock is held" a compile-time precondition for waiting.
#[must_use = "dropping the guard immediately releases the mutex"]
pub struct Lock<'a> {
    mutex: &'a Mutex,
}

impl<'a> Lock<'a> {
    /// Reconstruct a guard for a mutex the calling thread already holds.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the native mutex (for example after a
    /// condition wait reacquired it). Constructing a guard otherwise leads
    /// to an unlock the caller does not own.
    pub(crate) unsafe fn from_held(mutex: &'a Mutex) -> Lock<'a> {
        Lock { mutex }
    }

    pub(crate) fn mutex(&self) -> &'a Mutex {
        self.mutex
    }
}

impl std::fmt::Debug for Lock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lock").finish_non_exhaustive()
    }
}

impl Drop for Lock<'_> {
    fn drop(&mut self) {
        let rc = self.mutex.raw_unlock();
        debug_assert!(rc.is_ok(), "pthread_mutex_unlock failed: {rc:?}");
        let _ = rc;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
