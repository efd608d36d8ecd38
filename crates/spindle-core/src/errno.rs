//! Error number definitions.
//!
//! The subset of errno values the threading layer can observe from the
//! platform, plus a display-name mapping for error messages. Values match
//! Linux.

/// Operation not permitted (unlocking a mutex held by another thread).
pub const EPERM: i32 = 1;
/// No such process.
pub const ESRCH: i32 = 3;
/// Interrupted system call.
pub const EINTR: i32 = 4;
/// Resource temporarily unavailable (thread creation limits).
pub const EAGAIN: i32 = 11;
/// Out of memory.
pub const ENOMEM: i32 = 12;
/// Device or resource busy (destroying a locked mutex).
pub const EBUSY: i32 = 16;
/// Invalid argument.
pub const EINVAL: i32 = 22;
/// Resource deadlock would occur.
pub const EDEADLK: i32 = 35;
/// Connection timed out (bounded wait expiry).
pub const ETIMEDOUT: i32 = 110;

/// Symbolic name for a known errno value.
#[must_use]
pub fn name(errno: i32) -> &'static str {
    match errno {
        EPERM => "EPERM",
        ESRCH => "ESRCH",
        EINTR => "EINTR",
        EAGAIN => "EAGAIN",
        ENOMEM => "ENOMEM",
        EBUSY => "EBUSY",
        EINVAL => "EINVAL",
        EDEADLK => "EDEADLK",
        ETIMEDOUT => "ETIMEDOUT",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
