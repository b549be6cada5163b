//! Element-wise vector addition demo
//!
//! Fills `a[i] = i` and `b[i] = n - i`, so every output element must equal
//! `n`. Any disagreement is counted rather than panicking, and the caller
//! decides how loudly to fail.

use cinder_runtime::{
    AccessMode, Buffer, ExecutionContext, Pipeline, ProfileReport, Profiler, Program, Result,
    RunState, StageLabel, WorkSize,
};

/// Outcome of one vector-add run
pub struct VecAddRun {
    pub n: usize,
    pub expected: i32,
    pub mismatches: usize,
    pub report: ProfileReport,
}

/// Run the demo over `n` elements
pub fn run(ctx: &ExecutionContext, source: &str, n: usize) -> Result<VecAddRun> {
    let mut pipeline = Pipeline::new(ctx);

    let host_a: Vec<i32> = (0..n as i32).collect();
    let host_b: Vec<i32> = (0..n as i32).map(|i| n as i32 - i).collect();
    let a = Buffer::from_slice(ctx, AccessMode::ReadOnly, &host_a)?;
    let b = Buffer::from_slice(ctx, AccessMode::ReadOnly, &host_b)?;
    let c = Buffer::<i32>::zeroed(ctx, n, AccessMode::WriteOnly)?;
    pipeline.advance(RunState::BuffersAllocated)?;

    let program = Program::compile(ctx, source)?;
    let kernel = program.entry_point("vector_add")?;
    pipeline.advance(RunState::ProgramBuilt)?;

    let event = pipeline.launch(
        ctx,
        &kernel,
        WorkSize::d1(n),
        None,
        &[a.arg(), b.arg(), c.arg()],
    )?;
    pipeline.drain(ctx)?;

    let mut profiler = Profiler::for_context(ctx);
    profiler.record(ctx, StageLabel::new(1, "vector_add"), &event)?;

    let result = c.to_vec()?;
    let expected = n as i32;
    let mismatches = result.iter().filter(|&&v| v != expected).count();

    Ok(VecAddRun {
        n,
        expected,
        mismatches,
        report: profiler.aggregate(),
    })
}
