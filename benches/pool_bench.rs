use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_utils::sync::WaitGroup;
use workpool::{ShutdownMode, WorkerPool};

const TASKS: usize = 1000;

fn spawn_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    for threads in [1, 4, num_cpus::get()] {
        group.bench_with_input(
            BenchmarkId::new("workpool", threads),
            &threads,
            |b, &threads| {
                let pool = WorkerPool::new(threads).unwrap();
                b.iter(|| {
                    let wg = WaitGroup::new();
                    for i in 0..TASKS {
                        let wg = wg.clone();
                        pool.execute(move || {
                            std::hint::black_box(i * i);
                            drop(wg);
                        })
                        .unwrap();
                    }
                    wg.wait();
                });
                pool.shutdown(ShutdownMode::Graceful);
            },
        );

        group.bench_with_input(BenchmarkId::new("rayon", threads), &threads, |b, &threads| {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap();
            b.iter(|| {
                let wg = WaitGroup::new();
                for i in 0..TASKS {
                    let wg = wg.clone();
                    pool.spawn(move || {
                        std::hint::black_box(i * i);
                        drop(wg);
                    });
                }
                wg.wait();
            });
        });
    }

    group.finish();
}

fn submit_join_bench(c: &mut Criterion) {
    let pool = WorkerPool::new(num_cpus::get()).unwrap();
    c.bench_function("submit_join", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..TASKS)
                .map(|i| pool.submit(move || i + 1).unwrap())
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });
}

criterion_group!(benches, spawn_bench, submit_join_bench);
criterion_main!(benches);
