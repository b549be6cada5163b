//! End-to-end pipeline tests against the CPU reference device

use cinder_runtime::{
    select_device, select_from, AccessMode, Buffer, DeviceTypeFilter, Error, ExecutionContext,
    KernelArg, Pipeline, Profiler, Program, RunState, StageLabel, WorkSize,
};

const SOURCE: &str = r#"
__kernel void vector_add(__global const int* a,
                         __global const int* b,
                         __global int* c)
{
    int i = get_global_id(0);
    c[i] = a[i] + b[i];
}

__kernel void MatMul(__global const float* weights,
                     __global const float* input,
                     __global float* output,
                     const int rows,
                     const int cols,
                     const int batch)
{
    int row = get_global_id(0);
    if (row < rows) {
        for (int b = 0; b < batch; ++b) {
            float acc = 0.0f;
            for (int k = 0; k < cols; ++k) {
                acc += weights[row * cols + k] * input[k * batch + b];
            }
            output[row * batch + b] = acc;
        }
    }
}

__kernel void Add(__global const float* bias,
                  __global const float* input,
                  __global float* output)
{
    int i = get_global_id(0);
    output[i] = bias[i] + input[i];
}

__kernel void ReLU(__global const float* input,
                   __global float* output)
{
    int i = get_global_id(0);
    output[i] = max(input[i], 0.0f);
}
"#;

fn ctx() -> ExecutionContext {
    let device = select_device(DeviceTypeFilter::Any).unwrap();
    ExecutionContext::new(&device).unwrap()
}

fn run_vector_add(n: usize) -> Vec<i32> {
    let ctx = ctx();
    let host_a: Vec<i32> = (0..n as i32).collect();
    let host_b: Vec<i32> = (0..n as i32).map(|i| n as i32 - i).collect();
    let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &host_a).unwrap();
    let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &host_b).unwrap();
    let c = Buffer::<i32>::zeroed(&ctx, n, AccessMode::WriteOnly).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    pipeline
        .launch(
            &ctx,
            &kernel,
            WorkSize::d1(n),
            None,
            &[a.arg(), b.arg(), c.arg()],
        )
        .unwrap();
    pipeline.drain(&ctx).unwrap();
    c.to_vec().unwrap()
}

#[test]
fn vector_add_1024_yields_all_n() {
    let result = run_vector_add(1024);
    assert_eq!(result.len(), 1024);
    assert!(result.iter().all(|&v| v == 1024));
}

#[test]
fn vector_add_is_deterministic() {
    assert_eq!(run_vector_add(257), run_vector_add(257));
}

#[test]
fn no_device_means_no_work() {
    let err = select_from(&[], DeviceTypeFilter::Any).unwrap_err();
    assert!(matches!(err, Error::NoDeviceFound { .. }));
}

#[test]
fn chained_launches_see_prior_writes() {
    // MatMul into scratch, bias Add in place, ReLU in place, all before drain
    let ctx = ctx();
    let weights = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[2.0f32, -3.0]).unwrap();
    let input = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1.0f32]).unwrap();
    let bias = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[0.5f32, 0.5]).unwrap();
    let scratch = Buffer::<f32>::zeroed(&ctx, 2, AccessMode::ReadWrite).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let matmul = program.entry_point("MatMul").unwrap();
    let add = program.entry_point("Add").unwrap();
    let relu = program.entry_point("ReLU").unwrap();

    let mut pipeline = Pipeline::new(&ctx);
    pipeline
        .launch(
            &ctx,
            &matmul,
            WorkSize::d2(2, 1),
            None,
            &[
                weights.arg(),
                input.arg(),
                scratch.arg(),
                KernelArg::I32(2),
                KernelArg::I32(1),
                KernelArg::I32(1),
            ],
        )
        .unwrap();
    pipeline
        .launch(
            &ctx,
            &add,
            WorkSize::d1(2),
            None,
            &[bias.arg(), scratch.arg(), scratch.arg()],
        )
        .unwrap();
    pipeline
        .launch(
            &ctx,
            &relu,
            WorkSize::d1(2),
            None,
            &[scratch.arg(), scratch.arg()],
        )
        .unwrap();
    pipeline.drain(&ctx).unwrap();

    // 2*1+0.5 = 2.5; -3*1+0.5 = -2.5 clamped to 0
    assert_eq!(scratch.to_vec().unwrap(), vec![2.5, 0.0]);
    assert_eq!(pipeline.state(), RunState::Completed);
}

#[test]
fn event_timestamps_gate_on_drain() {
    let ctx = ctx();
    let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32, 2]).unwrap();
    let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[3i32, 4]).unwrap();
    let c = Buffer::<i32>::zeroed(&ctx, 2, AccessMode::WriteOnly).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    let event = pipeline
        .launch(
            &ctx,
            &kernel,
            WorkSize::d1(2),
            None,
            &[a.arg(), b.arg(), c.arg()],
        )
        .unwrap();

    assert!(matches!(event.timestamps(&ctx), Err(Error::EventNotReady)));

    pipeline.drain(&ctx).unwrap();
    let (start, end) = event.timestamps(&ctx).unwrap();
    assert!(end >= start);
}

#[test]
fn profiler_aggregates_real_events_exactly() {
    let ctx = ctx();
    let x = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[0.25f32; 16]).unwrap();
    let scratch = Buffer::<f32>::zeroed(&ctx, 16, AccessMode::ReadWrite).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let relu = program.entry_point("ReLU").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    let mut events = Vec::new();
    for layer in 1..=3u32 {
        let src = if layer == 1 { x.arg() } else { scratch.arg() };
        let event = pipeline
            .launch(&ctx, &relu, WorkSize::d1(16), None, &[src, scratch.arg()])
            .unwrap();
        events.push((StageLabel::new(layer, "ReLU"), event));
    }
    pipeline.drain(&ctx).unwrap();

    let mut profiler = Profiler::for_context(&ctx);
    for (label, event) in &events {
        profiler.record(&ctx, label.clone(), event).unwrap();
    }
    let report = profiler.aggregate();

    assert_eq!(report.per_stage.len(), 3);
    assert_eq!(report.per_layer.len(), 3);
    let layer_sum: u64 = report.per_layer.iter().map(|l| l.ticks).sum();
    assert_eq!(layer_sum, report.total_ticks);
    for layer in &report.per_layer {
        let stage_sum: u64 = report
            .per_stage
            .iter()
            .filter(|s| s.label.layer == layer.layer)
            .map(|s| s.ticks)
            .sum();
        assert_eq!(stage_sum, layer.ticks);
    }
}

#[test]
fn read_only_buffer_rejected_as_output() {
    let ctx = ctx();
    let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32; 4]).unwrap();
    let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32; 4]).unwrap();
    let c = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[0i32; 4]).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    let err = pipeline
        .launch(
            &ctx,
            &kernel,
            WorkSize::d1(4),
            None,
            &[a.arg(), b.arg(), c.arg()],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DispatchFailure(_)));
    assert_eq!(pipeline.state(), RunState::Failed);

    // a failed run is terminal
    assert!(pipeline.drain(&ctx).is_err());
}

#[test]
fn write_only_buffer_rejected_as_input() {
    let ctx = ctx();
    let a = Buffer::<i32>::zeroed(&ctx, 4, AccessMode::WriteOnly).unwrap();
    let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32; 4]).unwrap();
    let c = Buffer::<i32>::zeroed(&ctx, 4, AccessMode::WriteOnly).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    let err = pipeline
        .launch(
            &ctx,
            &kernel,
            WorkSize::d1(4),
            None,
            &[a.arg(), b.arg(), c.arg()],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DispatchFailure(_)));
}

#[test]
fn wrong_argument_count_is_a_dispatch_failure() {
    let ctx = ctx();
    let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32; 4]).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    let err = pipeline
        .launch(&ctx, &kernel, WorkSize::d1(4), None, &[a.arg()])
        .unwrap_err();
    assert!(matches!(err, Error::DispatchFailure(_)));
}

#[test]
fn oversize_allocation_fails_cleanly() {
    let ctx = ctx();
    let too_big = ctx.memory_capacity() / 4 + 1;
    let err = Buffer::<f32>::zeroed(&ctx, too_big, AccessMode::ReadWrite).unwrap_err();
    assert!(matches!(err, Error::AllocationFailure(_)));
}

#[test]
fn unknown_entry_point_is_reported_by_name() {
    let ctx = ctx();
    let program = Program::compile(&ctx, SOURCE).unwrap();
    let err = program.entry_point("Sigmoid").unwrap_err();
    assert!(matches!(err, Error::EntryPointNotFound(name) if name == "Sigmoid"));
}

#[test]
fn build_failure_carries_the_diagnostic() {
    let ctx = ctx();
    let err = Program::compile(&ctx, "#error no such target\n").unwrap_err();
    match err {
        Error::BuildFailure { diagnostic } => assert!(diagnostic.contains("no such target")),
        other => panic!("expected BuildFailure, got {other:?}"),
    }
}

#[test]
fn completed_pipeline_refuses_further_launches() {
    let ctx = ctx();
    let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32; 2]).unwrap();
    let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32; 2]).unwrap();
    let c = Buffer::<i32>::zeroed(&ctx, 2, AccessMode::WriteOnly).unwrap();

    let program = Program::compile(&ctx, SOURCE).unwrap();
    let kernel = program.entry_point("vector_add").unwrap();
    let mut pipeline = Pipeline::new(&ctx);
    pipeline
        .launch(
            &ctx,
            &kernel,
            WorkSize::d1(2),
            None,
            &[a.arg(), b.arg(), c.arg()],
        )
        .unwrap();
    pipeline.drain(&ctx).unwrap();

    let err = pipeline
        .launch(
            &ctx,
            &kernel,
            WorkSize::d1(2),
            None,
            &[a.arg(), b.arg(), c.arg()],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DispatchFailure(_)));
}
