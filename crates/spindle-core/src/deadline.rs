//! Deadline arithmetic for bounded waits.
//!
//! Pure helpers that turn a relative timeout into the absolute deadline the
//! platform's timed wait expects. The clock read itself happens in the
//! `spindle` crate; this module only does the checked math.

use std::time::Duration;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A timespec value (seconds + nanoseconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    /// Seconds.
    pub tv_sec: i64,
    /// Nanoseconds (0 to 999_999_999).
    pub tv_nsec: i64,
}

/// Absolute deadline `timeout` after `now`, or `None` if the result does not
/// fit in a timespec.
///
/// `now.tv_nsec` must be a normalized nanosecond count (below one second);
/// clock reads always satisfy this.
#[must_use]
pub fn deadline_after(now: Timespec, timeout: Duration) -> Option<Timespec> {
    let timeout_secs = i64::try_from(timeout.as_secs()).ok()?;
    let mut tv_sec = now.tv_sec.checked_add(timeout_secs)?;
    let mut tv_nsec = now.tv_nsec + i64::from(timeout.subsec_nanos());
    if tv_nsec >= NANOS_PER_SEC {
        tv_nsec -= NANOS_PER_SEC;
        tv_sec = tv_sec.checked_add(1)?;
    }
    Some(Timespec { tv_sec, tv_nsec })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
