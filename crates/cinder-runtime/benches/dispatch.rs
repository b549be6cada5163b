//! Dispatch-path benchmarks on the CPU reference device

use cinder_runtime::{
    select_device, AccessMode, Buffer, DeviceTypeFilter, ExecutionContext, Pipeline, Program,
    WorkSize,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const SOURCE: &str = r#"
__kernel void vector_add(__global const int* a,
                         __global const int* b,
                         __global int* c)
{
    int i = get_global_id(0);
    c[i] = a[i] + b[i];
}
"#;

fn bench_vector_add(c: &mut Criterion) {
    let device = select_device(DeviceTypeFilter::Any).unwrap();
    let ctx = ExecutionContext::new(&device).unwrap();
    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();

    for n in [1024usize, 65_536] {
        let host: Vec<i32> = (0..n as i32).collect();
        let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &host).unwrap();
        let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &host).unwrap();
        let out = Buffer::<i32>::zeroed(&ctx, n, AccessMode::WriteOnly).unwrap();

        c.bench_function(&format!("vector_add_{n}"), |bencher| {
            bencher.iter(|| {
                let mut pipeline = Pipeline::new(&ctx);
                let event = pipeline
                    .launch(
                        &ctx,
                        &kernel,
                        WorkSize::d1(n),
                        None,
                        &[a.arg(), b.arg(), out.arg()],
                    )
                    .unwrap();
                pipeline.drain(&ctx).unwrap();
                black_box(event);
            });
        });
    }
}

fn bench_buffer_transfer(c: &mut Criterion) {
    let device = select_device(DeviceTypeFilter::Any).unwrap();
    let ctx = ExecutionContext::new(&device).unwrap();
    let n = 262_144usize;
    let host = vec![1.0f32; n];
    let buf = Buffer::<f32>::zeroed(&ctx, n, AccessMode::ReadWrite).unwrap();

    c.bench_function("upload_1mib", |bencher| {
        bencher.iter(|| buf.write(black_box(&host)).unwrap());
    });

    let mut out = vec![0.0f32; n];
    c.bench_function("readback_1mib", |bencher| {
        bencher.iter(|| buf.read_back(black_box(&mut out)).unwrap());
    });
}

criterion_group!(benches, bench_vector_add, bench_buffer_transfer);
criterion_main!(benches);
