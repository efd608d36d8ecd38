//! Error taxonomy for the primitives layer.

use spindle_core::errno;
use thiserror::Error;

/// Errors surfaced by the threading primitives.
///
/// Every error is local to the call that produced it; none are fatal to the
/// process. The caller decides whether to retry, abort the operation, or
/// propagate further.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The call was rejected before reaching the platform.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An underlying platform primitive call failed.
    #[error("{op} failed: {} (errno {errno})", errno::name(*errno))]
    Platform {
        /// The platform call that failed.
        op: &'static str,
        /// Raw errno value reported by the platform.
        errno: i32,
    },

    /// The joined thread unwound instead of returning a status.
    #[error("thread exited by panic instead of returning a status")]
    Panicked,
}

impl Error {
    pub(crate) fn platform(op: &'static str, errno: i32) -> Error {
        Error::Platform { op, errno }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_displays_errno_name() {
        let err = Error::platform("pthread_cond_wait", libc::EINVAL);
        assert_eq!(
            err.to_string(),
            "pthread_cond_wait failed: EINVAL (errno 22)"
        );
    }

    #[test]
    fn invalid_argument_displays_reason() {
        let err = Error::InvalidArgument("thread name must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid argument: thread name must not be empty"
        );
    }
}
