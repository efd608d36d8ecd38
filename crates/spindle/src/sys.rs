//! Raw POSIX threading handles.
//!
//! Owns the native `pthread_mutex_t` / `pthread_cond_t` storage and exposes
//! errno-returning operations on it. Handles are heap-pinned: POSIX does not
//! allow an initialized mutex or condition variable to change address while
//! in use, and the RAII layer above moves its wrappers freely between lock
//! sessions.
//!
//! Everything here returns raw errno values; mapping into the public error
//! type happens one layer up.

use std::cell::UnsafeCell;

use spindle_core::deadline::Timespec;

/// Errno-style result for raw platform calls.
pub(crate) type RawResult = Result<(), i32>;

#[inline]
fn last_errno() -> i32 {
    std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(libc::EINVAL)
}

// ---------------------------------------------------------------------------
// Mutex handle
// ---------------------------------------------------------------------------

/// Owned native mutex handle.
pub(crate) struct RawMutex {
    handle: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

// SAFETY: the native handle is heap-pinned and pthread mutexes are built for
// cross-thread lock/unlock; every access goes through pthread calls.
unsafe impl Send for RawMutex {}
// SAFETY: as above; `&RawMutex` only permits pthread calls on the handle.
unsafe impl Sync for RawMutex {}

impl RawMutex {
    /// Initialize an unlocked mutex with default (NORMAL) attributes.
    pub(crate) fn new() -> Result<RawMutex, i32> {
        let handle: Box<UnsafeCell<libc::pthread_mutex_t>> =
            Box::new(UnsafeCell::new(unsafe { std::mem::zeroed() }));
        // SAFETY: `handle` points to zeroed storage we own; null attributes
        // select the default mutex type.
        let rc = unsafe { libc::pthread_mutex_init(handle.get(), std::ptr::null()) };
        if rc != 0 {
            return Err(rc);
        }
        Ok(RawMutex { handle })
    }

    /// Pointer to the native handle, for condition variable waits.
    pub(crate) fn as_ptr(&self) -> *mut libc::pthread_mutex_t {
        self.handle.get()
    }

    /// Block until the mutex is acquired.
    pub(crate) fn lock(&self) -> RawResult {
        // SAFETY: the handle was initialized in `new` and lives until drop.
        let rc = unsafe { libc::pthread_mutex_lock(self.handle.get()) };
        if rc == 0 { Ok(()) } else { Err(rc) }
    }

    /// Acquire without blocking; `Err(EBUSY)` when already held.
    pub(crate) fn try_lock(&self) -> RawResult {
        // SAFETY: the handle was initialized in `new` and lives until drop.
        let rc = unsafe { libc::pthread_mutex_trylock(self.handle.get()) };
        if rc == 0 { Ok(()) } else { Err(rc) }
    }

    /// Release the mutex. The caller must hold it.
    pub(crate) fn unlock(&self) -> RawResult {
        // SAFETY: the handle was initialized in `new` and lives until drop.
        let rc = unsafe { libc::pthread_mutex_unlock(self.handle.get()) };
        if rc == 0 { Ok(()) } else { Err(rc) }
    }
}

impl Drop for RawMutex {
    fn drop(&mut self) {
        // The owning Mutex cannot be dropped while a guard or waiter borrows
        // it, so the handle is unlocked here; EBUSY would mean a bug above.
        // SAFETY: the handle was initialized in `new` and nothing else can
        // reference it once drop runs.
        let rc = unsafe { libc::pthread_mutex_destroy(self.handle.get()) };
        debug_assert_eq!(rc, 0, "pthread_mutex_destroy failed: errno {rc}");
    }
}

// ---------------------------------------------------------------------------
// Condition variable handle
// ---------------------------------------------------------------------------

/// Clock used for bounded waits. Wall-clock jumps must not stretch or
/// shorten a timeout, so Linux gets the monotonic clock; platforms without
/// `pthread_condattr_setclock` fall back to the default realtime clock.
#[cfg(target_os = "linux")]
const WAIT_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;
#[cfg(not(target_os = "linux"))]
const WAIT_CLOCK: libc::clockid_t = libc::CLOCK_REALTIME;

/// Owned native condition variable handle.
pub(crate) struct RawCond {
    handle: Box<UnsafeCell<libc::pthread_cond_t>>,
}

// SAFETY: the native handle is heap-pinned and pthread condition variables
// are built for cross-thread signal/wait; every access goes through pthread
// calls.
unsafe impl Send for RawCond {}
// SAFETY: as above.
unsafe impl Sync for RawCond {}

impl RawCond {
    /// Initialize a condition variable configured for [`WAIT_CLOCK`].
    pub(crate) fn new() -> Result<RawCond, i32> {
        let handle: Box<UnsafeCell<libc::pthread_cond_t>> =
            Box::new(UnsafeCell::new(unsafe { std::mem::zeroed() }));

        let mut attr: libc::pthread_condattr_t = unsafe { std::mem::zeroed() };
        // SAFETY: `attr` is zeroed storage we own.
        let rc = unsafe { libc::pthread_condattr_init(&mut attr) };
        if rc != 0 {
            return Err(rc);
        }

        #[cfg(target_os = "linux")]
        {
            // SAFETY: `attr` was initialized above.
            let rc = unsafe { libc::pthread_condattr_setclock(&mut attr, WAIT_CLOCK) };
            if rc != 0 {
                // SAFETY: `attr` was initialized above.
                let _ = unsafe { libc::pthread_condattr_destroy(&mut attr) };
                return Err(rc);
            }
        }

        // SAFETY: `handle` points to zeroed storage we own and `attr` is an
        // initialized attribute object.
        let rc = unsafe { libc::pthread_cond_init(handle.get(), &attr) };
        // SAFETY: `attr` was initialized above; destroying it does not
        // affect condition variables created from it.
        let _ = unsafe { libc::pthread_condattr_destroy(&mut attr) };
        if rc != 0 {
            return Err(rc);
        }
        Ok(RawCond { handle })
    }

    /// Current time on the wait clock.
    pub(crate) fn now(&self) -> Result<Timespec, i32> {
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: `ts` is valid caller-owned storage for the clock read.
        let rc = unsafe { libc::clock_gettime(WAIT_CLOCK, &mut ts) };
        if rc != 0 {
            return Err(last_errno());
        }
        Ok(Timespec {
            tv_sec: ts.tv_sec as i64,
            tv_nsec: ts.tv_nsec as i64,
        })
    }

    /// Release `mutex`, suspend until signaled, reacquire, return.
    ///
    /// The caller must hold `mutex`. On `Ok` the mutex is held again; on
    /// `Err` its state is not reliably known.
    pub(crate) fn wait(&self, mutex: *mut libc::pthread_mutex_t) -> RawResult {
        // SAFETY: both handles are initialized and the caller holds `mutex`.
        let rc = unsafe { libc::pthread_cond_wait(self.handle.get(), mutex) };
        if rc == 0 { Ok(()) } else { Err(rc) }
    }

    /// Bounded wait until `deadline` on the wait clock.
    ///
    /// `Ok(true)` means woken (including spuriously) with the mutex
    /// reacquired; `Ok(false)` means the deadline passed, also with the
    /// mutex reacquired. On `Err` the mutex state is not reliably known.
    pub(crate) fn wait_deadline(
        &self,
        mutex: *mut libc::pthread_mutex_t,
        deadline: Timespec,
    ) -> Result<bool, i32> {
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        ts.tv_sec = deadline.tv_sec as libc::time_t;
        ts.tv_nsec = deadline.tv_nsec as libc::c_long;
        // SAFETY: both handles are initialized, the caller holds `mutex`,
        // and `ts` is a valid absolute timespec on the wait clock.
        let rc = unsafe { libc::pthread_cond_timedwait(self.handle.get(), mutex, &ts) };
        match rc {
            0 => Ok(true),
            libc::ETIMEDOUT => Ok(false),
            _ => Err(rc),
        }
    }

    /// Wake one waiter, if any are waiting.
    pub(crate) fn signal(&self) -> RawResult {
        // SAFETY: the handle was initialized in `new` and lives until drop.
        let rc = unsafe { libc::pthread_cond_signal(self.handle.get()) };
        if rc == 0 { Ok(()) } else { Err(rc) }
    }

    /// Wake every waiter.
    pub(crate) fn broadcast(&self) -> RawResult {
        // SAFETY: the handle was initialized in `new` and lives until drop.
        let rc = unsafe { libc::pthread_cond_broadcast(self.handle.get()) };
        if rc == 0 { Ok(()) } else { Err(rc) }
    }
}

impl Drop for RawCond {
    fn drop(&mut self) {
        // Waiters borrow the owning Condition, so none can exist here.
        // SAFETY: the handle was initialized in `new` and nothing else can
        // reference it once drop runs.
        let rc = unsafe { libc::pthread_cond_destroy(self.handle.get()) };
        debug_assert_eq!(rc, 0, "pthread_cond_destroy failed: errno {rc}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
