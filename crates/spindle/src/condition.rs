//! Condition variable over a caller-held mutex.

use std::time::Duration;

use spindle_core::deadline;

use crate::error::Error;
use crate::mutex::Lock;
use crate::sys::RawCond;

/// Outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken before the deadline. Includes spurious wakeups: a wake carries
    /// no proof of the logical condition, so re-check it.
    Signaled,
    /// The deadline elapsed with no wake.
    TimedOut,
}

impl WaitOutcome {
    /// True when the deadline elapsed.
    #[must_use]
    pub const fn timed_out(self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }
}

/// Condition variable.
///
/// Lets a thread atomically release a held mutex and suspend until another
/// thread notifies, reacquiring the mutex before resuming. The wait
/// operations consume the [`Lock`] guard and hand it back, so calling them
/// without holding the lock does not compile.
///
/// All concurrent waiters on one `Condition` must use the same mutex; that
/// part of the POSIX contract remains the caller's responsibility.
pub struct Condition {
    raw: RawCond,
}

impl Condition {
    /// Create a condition variable.
    pub fn new() -> Result<Condition, Error> {
        let raw = RawCond::new().map_err(|errno| Error::platform("pthread_cond_init", errno))?;
        Ok(Condition { raw })
    }

    /// Atomically release the guarded mutex and suspend until notified.
    ///
    /// On `Ok` the calling thread holds the mutex again and gets the guard
    /// back. Wakeups can be spurious, so callers re-check their condition
    /// in a loop. On `Err` the guard is withheld and no unlock is
    /// attempted: the mutex state is not reliably known and the mutex must
    /// not be used again.
    pub fn wait<'m>(&self, lock: Lock<'m>) -> Result<Lock<'m>, Error> {
        let mutex = lock.mutex();
        // The platform wait releases and reacquires the mutex itself; the
        // guard's unlock must not also run.
        std::mem::forget(lock);
        match self.raw.wait(mutex.raw_ptr()) {
            // SAFETY: pthread_cond_wait reacquired the mutex before
            // returning success.
            Ok(()) => Ok(unsafe { Lock::from_held(mutex) }),
            Err(errno) => Err(Error::platform("pthread_cond_wait", errno)),
        }
    }

    /// Bounded [`wait`](Condition::wait): suspend for at most `timeout`.
    ///
    /// Returns the reacquired guard together with the tri-state outcome:
    /// `Signaled` (woken, possibly spuriously) or `TimedOut` (deadline
    /// elapsed). A timeout too large for the platform deadline is rejected
    /// as [`Error::InvalidArgument`] with the lock released normally. On a
    /// platform error the guard is withheld as in `wait`.
    pub fn wait_timeout<'m>(
        &self,
        lock: Lock<'m>,
        timeout: Duration,
    ) -> Result<(Lock<'m>, WaitOutcome), Error> {
        let mutex = lock.mutex();

        let now = match self.raw.now() {
            Ok(now) => now,
            Err(errno) => {
                // No wait happened; releasing normally keeps the mutex
                // usable.
                drop(lock);
                return Err(Error::platform("clock_gettime", errno));
            }
        };
        let Some(target) = deadline::deadline_after(now, timeout) else {
            drop(lock);
            return Err(Error::InvalidArgument(
                "timeout exceeds the representable deadline",
            ));
        };

        // As in `wait`: the platform owns release and reacquire from here.
        std::mem::forget(lock);
        match self.raw.wait_deadline(mutex.raw_ptr(), target) {
            // SAFETY: pthread_cond_timedwait reacquired the mutex before
            // returning success or ETIMEDOUT.
            Ok(true) => Ok((unsafe { Lock::from_held(mutex) }, WaitOutcome::Signaled)),
            // SAFETY: as above; timeout expiry also reacquires.
            Ok(false) => Ok((unsafe { Lock::from_held(mutex) }, WaitOutcome::TimedOut)),
            Err(errno) => Err(Error::platform("pthread_cond_timedwait", errno)),
        }
    }

    /// Wake one waiter, if any are waiting.
    ///
    /// A no-op when nobody waits; no signal is banked for a future waiter.
    /// Avoiding the resulting missed-wakeup hazard is the caller's job:
    /// guard the logical condition with the mutex and re-check it around
    /// the wait. Does not release any mutex.
    pub fn notify_one(&self) -> Result<(), Error> {
        self.raw
            .signal()
            .map_err(|errno| Error::platform("pthread_cond_signal", errno))
    }

    /// Wake every current waiter.
    ///
    /// Each woken thread re-contends for its mutex independently; the wake
    /// order is scheduler-determined. Safe no-op when nobody waits.
    pub fn notify_all(&self) -> Result<(), Error> {
        self.raw
            .broadcast()
            .map_err(|errno| Error::platform("pthread_cond_broadcast", errno))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutex::Mutex;

    #[test]
    fn notify_without_waiters_succeeds() {
        let cond = Condition::new().expect("create");
        cond.notify_one().expect("notify_one");
        cond.notify_all().expect("notify_all");
    }

    #[test]
    fn oversized_timeout_is_rejected_and_lock_released() {
        let mutex = Mutex::new().expect("mutex");
        let cond = Condition::new().expect("condition");

        let lock = mutex.lock().expect("lock");
        let err = cond.wait_timeout(lock, Duration::MAX).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("timeout exceeds the representable deadline")
        );
        // The rejection path released the lock normally.
        let _lock = mutex.lock().expect("relock after rejection");
    }
}
