//! Primitive operation benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use spindle::{Condition, Mutex, Thread};

fn bench_lock_cycle(c: &mut Criterion) {
    let mutex = Mutex::new().expect("mutex");
    c.bench_function("uncontended_lock_unlock", |b| {
        b.iter(|| {
            let lock = mutex.lock().expect("lock");
            criterion::black_box(&lock);
        });
    });
}

fn bench_notify_without_waiters(c: &mut Criterion) {
    let cond = Condition::new().expect("condition");
    c.bench_function("notify_one_no_waiters", |b| {
        b.iter(|| cond.notify_one().expect("notify"));
    });
}

fn bench_spawn_join_cycle(c: &mut Criterion) {
    c.bench_function("spawn_join_cycle", |b| {
        b.iter(|| {
            let mut t = Thread::spawn(|_token| 0).expect("spawn");
            t.join().expect("join");
        });
    });
}

criterion_group!(
    benches,
    bench_lock_cycle,
    bench_notify_without_waiters,
    bench_spawn_join_cycle
);
criterion_main!(benches);
