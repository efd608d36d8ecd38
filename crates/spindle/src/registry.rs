//! Process-wide registry of live spindle threads.
//!
//! POSIX needs no explicit subsystem initialization, so the process-wide
//! threading state reduces to this table. It initializes lazily on first
//! use and tracks every live spindle-spawned thread by id. Teardown
//! contract: a clean shutdown joins all threads first, at which point
//! [`live_threads`] returns 0. Threads released by `kill` stay in the table
//! until their function observes the cancellation request and returns.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Record kept for each live spindle-spawned thread.
#[derive(Debug, Clone)]
pub struct ThreadRecord {
    /// Thread name as handed to the OS.
    pub name: String,
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SELF_ID: Cell<u64> = const { Cell::new(0) };
}

fn live_table() -> &'static Mutex<HashMap<u64, ThreadRecord>> {
    static TABLE: OnceLock<Mutex<HashMap<u64, ThreadRecord>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

pub(crate) fn next_thread_id() -> u64 {
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn register(id: u64, name: &str) {
    live_table().lock().insert(
        id,
        ThreadRecord {
            name: name.to_owned(),
        },
    );
}

pub(crate) fn deregister(id: u64) {
    live_table().lock().remove(&id);
}

/// Bind the calling thread to its registry id.
pub(crate) fn adopt_current(id: u64) {
    SELF_ID.with(|slot| slot.set(id));
}

/// Deregisters a thread when its function returns, panics included.
pub(crate) struct LiveGuard {
    id: u64,
}

impl LiveGuard {
    pub(crate) fn new(id: u64) -> LiveGuard {
        LiveGuard { id }
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        deregister(self.id);
    }
}

/// Number of spindle-spawned threads currently live.
#[must_use]
pub fn live_threads() -> usize {
    live_table().lock().len()
}

/// Record for a thread id, while that thread is still live.
#[must_use]
pub fn find(id: u64) -> Option<ThreadRecord> {
    live_table().lock().get(&id).cloned()
}

/// Id of the calling thread.
///
/// Threads not spawned through this crate (the main thread included) are
/// assigned a fresh id on first query.
#[must_use]
pub fn current_thread_id() -> u64 {
    SELF_ID.with(|slot| {
        let existing = slot.get();
        if existing != 0 {
            return existing;
        }
        let id = next_thread_id();
        slot.set(id);
        id
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = next_thread_id();
        let b = next_thread_id();
        assert!(b > a);
    }

    #[test]
    fn register_find_deregister_roundtrip() {
        let id = next_thread_id();
        register(id, "roundtrip");
        let record = find(id).expect("registered thread should be found");
        assert_eq!(record.name, "roundtrip");
        deregister(id);
        assert!(find(id).is_none());
    }

    #[test]
    fn current_thread_id_is_stable_within_a_thread() {
        let first = current_thread_id();
        let second = current_thread_id();
        assert_eq!(first, second);
    }
}
