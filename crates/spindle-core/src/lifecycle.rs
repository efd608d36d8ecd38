//! Thread lifecycle transition contract.
//!
//! A spawned thread handle moves through exactly one terminal transition:
//! Running becomes either Killed or Joined, and terminal states absorb every
//! further operation. The `spindle` crate routes `kill`, `join`, and the
//! implicit join in drop through [`thread_transition`], so the invariant is
//! decided in one place and testable without spawning anything.

/// Lifecycle of a spawned thread handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// The thread's function is (presumed) still executing.
    Running,
    /// Cancellation was requested and the handle released.
    Killed,
    /// The thread's function returned and was waited on.
    Joined,
}

impl ThreadState {
    /// True once the handle has seen its terminal transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, ThreadState::Running)
    }
}

/// Operations a handle can apply to its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOp {
    /// Request cancellation and release the handle.
    Kill,
    /// Wait for the function to return.
    Join,
    /// Handle is being dropped.
    Finalize,
}

/// Side effect the caller must perform to realize a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadEffect {
    /// Nothing to do; the operation is a no-op.
    None,
    /// Flip the cancellation token and detach the underlying handle.
    RequestCancel,
    /// Block on the underlying handle until the function returns.
    AwaitExit,
}

/// Deterministic outcome of applying an operation in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadTransition {
    /// State the handle moves to.
    pub next: ThreadState,
    /// What the caller must do to realize the transition.
    pub effect: ThreadEffect,
    /// Whether realizing the transition may block the calling thread.
    pub blocks: bool,
}

/// Transition contract for the thread lifecycle.
///
/// Kill never blocks (it only requests cancellation); Join and Finalize
/// block until the function returns. Any operation applied in a terminal
/// state is a non-blocking no-op that leaves the state unchanged.
#[must_use]
pub const fn thread_transition(state: ThreadState, op: ThreadOp) -> ThreadTransition {
    match state {
        ThreadState::Running => match op {
            ThreadOp::Kill => ThreadTransition {
                next: ThreadState::Killed,
                effect: ThreadEffect::RequestCancel,
                blocks: false,
            },
            ThreadOp::Join | ThreadOp::Finalize => ThreadTransition {
                next: ThreadState::Joined,
                effect: ThreadEffect::AwaitExit,
                blocks: true,
            },
        },
        ThreadState::Killed | ThreadState::Joined => ThreadTransition {
            next: state,
            effect: ThreadEffect::None,
            blocks: false,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
