//! Dispatch-overhead benchmark: per-item cost of the batched gemm path
//! (validation, extraction, stream rotation) on the stub backend.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blasq::{batch, Device, Layout, Op, Queue};

fn batched_gemm_dispatch(c: &mut Criterion) {
    let mut queue = Queue::new(Device::new(0)).expect("queue");
    let mut group = c.benchmark_group("batched_gemm_dispatch");

    for &batch_size in &[10usize, 100, 1000] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                let mut info = vec![0i64; batch_size];
                b.iter(|| {
                    batch::gemm(
                        Layout::ColMajor,
                        &[Op::NoTrans],
                        &[Op::NoTrans],
                        &[64],
                        &[64],
                        &[64],
                        &[1.0f32],
                        &[0],
                        &[64],
                        &[0],
                        &[64],
                        &[0.0f32],
                        &[0],
                        &[64],
                        batch_size,
                        &mut info,
                        &mut queue,
                    )
                    .expect("dispatch");
                    #[cfg(all(feature = "stub", not(feature = "cuda")))]
                    queue.clear_recorded_ops();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, batched_gemm_dispatch);
criterion_main!(benches);
