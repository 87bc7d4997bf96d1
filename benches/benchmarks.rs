use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use partyline::{Bus, Message, Store, Watched};
use serde_json::json;

fn bus_subscribe_benchmark(c: &mut Criterion) {
    let bus: Bus<Message> = Bus::new();

    c.bench_function("bus_subscribe", |b| {
        b.iter(|| {
            // the guard unsubscribes on drop, so this measures a full
            // register/deregister cycle
            let sub = bus.on("topic", |_| {});
            black_box(sub)
        });
    });
}

fn bus_emit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus_emit");

    for subscriber_count in [1, 10, 100].iter() {
        let bus: Bus<Message> = Bus::new();
        let subs: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                bus.on("boom", |msg| {
                    black_box(msg.body().len());
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                b.iter(|| {
                    bus.emit("boom", Message::new());
                });
            },
        );
        drop(subs);
    }
    group.finish();
}

fn store_read_benchmark(c: &mut Criterion) {
    let bus = Bus::new();
    let store = Store::builder("bench")
        .field("name", "static")
        .computed("derived", |_| json!("computed"))
        .build(&bus)
        .unwrap();

    // materialize the lazy field so both reads hit the cache path
    let _ = store.get("derived");

    c.bench_function("store_read_static", |b| {
        b.iter(|| {
            black_box(store.get("name"));
        });
    });

    c.bench_function("store_read_lazy_cached", |b| {
        b.iter(|| {
            black_box(store.get("derived"));
        });
    });

    store.destroy();
}

fn store_set_state_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let _guard = rt.enter();

    let bus = Bus::new();
    let store = Store::builder("bench")
        .field("count", 0)
        .build(&bus)
        .unwrap();

    c.bench_function("store_set_state", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set("count", black_box(i));
            i += 1;
        });
    });

    store.destroy();
}

fn watched_update_benchmark(c: &mut Criterion) {
    #[derive(Clone)]
    struct State {
        value: usize,
    }

    let mut group = c.benchmark_group("watched_update");

    for subscriber_count in [1, 10, 100].iter() {
        let state = Watched::new(State { value: 0 });

        let subs: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                state.subscribe(|s: &State| {
                    black_box(s.value);
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    state.update(|s| s.value = black_box(i));
                    i += 1;
                });
            },
        );
        drop(subs);
    }
    group.finish();
}

criterion_group!(
    benches,
    bus_subscribe_benchmark,
    bus_emit_benchmark,
    store_read_benchmark,
    store_set_state_benchmark,
    watched_update_benchmark,
);
criterion_main!(benches);
