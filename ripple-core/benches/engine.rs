use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ripple_core::graph::{flush_jobs, queue_effect};
use ripple_core::object::Obj;
use ripple_core::reactive::{computed, effect, EffectOptions, Reactive};
use ripple_core::value::Value;

fn counter(n: i64) -> Reactive {
    let obj = Obj::new();
    obj.set_raw("n", n);
    Reactive::new(obj)
}

fn benchmark_raw_reads(c: &mut Criterion) {
    let state = counter(42);
    c.bench_function("get_untracked", |b| {
        b.iter(|| black_box(state.get_untracked("n")))
    });
}

fn benchmark_tracked_reads(c: &mut Criterion) {
    let state = counter(42);
    let reader = state.clone();
    let tracked = effect(move || reader.get("n"), EffectOptions::new().lazy());
    c.bench_function("tracked_read", |b| b.iter(|| black_box(tracked.run())));
}

fn benchmark_direct_writes(c: &mut Criterion) {
    let state = counter(0);
    let reader = state.clone();
    let _subscriber = effect(move || reader.get("n"), EffectOptions::default());
    let mut i = 0i64;
    c.bench_function("set_direct", |b| {
        b.iter(|| {
            i += 1;
            state.set("n", i);
        })
    });
}

fn benchmark_queued_writes(c: &mut Criterion) {
    let state = counter(0);
    let reader = state.clone();
    let _subscriber = effect(
        move || reader.get("n"),
        EffectOptions::new().scheduler(queue_effect),
    );
    let mut i = 0i64;
    c.bench_function("set_queued_flush 100", |b| {
        b.iter(|| {
            for _ in 0..100 {
                i += 1;
                state.set("n", i);
            }
            flush_jobs();
        })
    });
}

fn benchmark_computed_cache_hits(c: &mut Criterion) {
    let state = counter(21);
    let reader = state.clone();
    let doubled = computed(move || Value::Int(reader.get("n").as_int().unwrap_or(0) * 2));
    doubled.value();
    c.bench_function("computed_cache_hit", |b| {
        b.iter(|| black_box(doubled.value()))
    });
}

criterion_group!(
    benches,
    benchmark_raw_reads,
    benchmark_tracked_reads,
    benchmark_direct_writes,
    benchmark_queued_writes,
    benchmark_computed_cache_hits
);
criterion_main!(benches);
