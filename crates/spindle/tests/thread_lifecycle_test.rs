//! Thread lifecycle idempotence, cancellation, and registry accounting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use spindle::{Thread, ThreadState, registry};

fn wait_until(label: &str, predicate: impl Fn() -> bool) {
    let start = Instant::now();
    while !predicate() {
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "timeout waiting for {label}"
        );
        std::thread::yield_now();
    }
}

#[test]
fn join_twice_returns_after_one_completed_run() {
    let runs = Arc::new(AtomicU32::new(0));
    let runs_worker = Arc::clone(&runs);

    let mut t = Thread::spawn(move |_token| {
        runs_worker.fetch_add(1, Ordering::SeqCst);
        7
    })
    .expect("spawn");

    t.join().expect("first join");
    assert_eq!(t.status(), Some(7));
    assert_eq!(t.state(), ThreadState::Joined);

    t.join().expect("second join");
    assert_eq!(t.status(), Some(7));
    assert_eq!(runs.load(Ordering::SeqCst), 1, "function ran more than once");
}

#[test]
fn kill_twice_is_idempotent_and_join_after_kill_is_a_noop() {
    let mut t = Thread::spawn(move |token| {
        while !token.is_cancelled() {
            std::thread::yield_now();
        }
        0
    })
    .expect("spawn");

    t.kill();
    assert_eq!(t.state(), ThreadState::Killed);
    t.kill();
    assert_eq!(t.state(), ThreadState::Killed);

    t.join().expect("join after kill");
    assert_eq!(t.state(), ThreadState::Killed);
    assert_eq!(t.status(), None, "a killed handle reports no status");
}

#[test]
fn cancellation_is_observed_by_the_spawned_function() {
    let observed = Arc::new(AtomicBool::new(false));
    let observed_worker = Arc::clone(&observed);

    let mut t = Thread::spawn(move |token| {
        while !token.is_cancelled() {
            std::thread::yield_now();
        }
        observed_worker.store(true, Ordering::Release);
        0
    })
    .expect("spawn");

    let token = t.cancel_token();
    assert!(!token.is_cancelled());

    t.kill();
    assert!(token.is_cancelled(), "kill did not flip the shared token");
    wait_until("the worker to observe cancellation", || {
        observed.load(Ordering::Acquire)
    });
}

#[test]
fn drop_joins_a_running_thread() {
    let finished = Arc::new(AtomicBool::new(false));
    {
        let finished = Arc::clone(&finished);
        let _t = Thread::spawn(move |_token| {
            std::thread::sleep(Duration::from_millis(50));
            finished.store(true, Ordering::Release);
            0
        })
        .expect("spawn");
    }
    assert!(
        finished.load(Ordering::Acquire),
        "drop returned before the thread finished"
    );
}

#[test]
fn registry_tracks_a_thread_for_its_lifetime() {
    let release = Arc::new(AtomicBool::new(false));
    let release_worker = Arc::clone(&release);

    let mut t = Thread::spawn_named("tracked-worker", move |_token| {
        while !release_worker.load(Ordering::Acquire) {
            std::thread::yield_now();
        }
        0
    })
    .expect("spawn");

    let id = t.id();
    let record = registry::find(id).expect("running thread missing from registry");
    assert_eq!(record.name, "tracked-worker");

    release.store(true, Ordering::Release);
    t.join().expect("join");
    assert!(
        registry::find(id).is_none(),
        "joined thread still registered"
    );
}

#[test]
fn foreign_threads_get_distinct_ids_lazily() {
    let ours = registry::current_thread_id();
    assert_eq!(ours, registry::current_thread_id());

    let other = std::thread::spawn(registry::current_thread_id)
        .join()
        .expect("join");
    assert_ne!(ours, other, "two threads share a registry id");
}
