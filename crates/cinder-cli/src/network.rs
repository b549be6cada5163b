//! Fixed 3-layer feed-forward network dispatched through the pipeline
//!
//! Topology is 1 -> 16 -> 16 -> 1. Each layer runs MatMul then a bias Add;
//! hidden layers append ReLU, the output layer does not. All intermediate
//! results flow through one read-write scratch buffer, relying on the
//! pipeline's submission-order retirement; only the final Add writes the
//! dedicated output buffer.

use crate::weights;
use cinder_runtime::{
    AccessMode, Buffer, ExecutionContext, LaunchEvent, Pipeline, ProfileReport, Profiler,
    Program, Result, RunState, StageLabel, WorkSize,
};

/// Width of the hidden layers
pub const HIDDEN: usize = 16;

/// Default network input
pub const DEFAULT_INPUT: f32 = std::f32::consts::FRAC_PI_4;

struct LayerSpec {
    weights: &'static [f32],
    bias: &'static [f32],
    rows: usize,
    cols: usize,
    relu: bool,
}

static LAYERS: [LayerSpec; 3] = [
    LayerSpec {
        weights: &weights::LAYER1_WEIGHTS,
        bias: &weights::LAYER1_BIAS,
        rows: HIDDEN,
        cols: 1,
        relu: true,
    },
    LayerSpec {
        weights: &weights::LAYER2_WEIGHTS,
        bias: &weights::LAYER2_BIAS,
        rows: HIDDEN,
        cols: HIDDEN,
        relu: true,
    },
    LayerSpec {
        weights: &weights::LAYER3_WEIGHTS,
        bias: &weights::LAYER3_BIAS,
        rows: 1,
        cols: HIDDEN,
        relu: false,
    },
];

/// Outcome of one forward pass
pub struct ForwardRun {
    pub output: f32,
    pub report: ProfileReport,
}

/// Run the network on the device for a single scalar input
pub fn forward(ctx: &ExecutionContext, source: &str, input: f32) -> Result<ForwardRun> {
    let batch = 1usize;
    let mut pipeline = Pipeline::new(ctx);

    let input_buf = Buffer::from_slice(ctx, AccessMode::ReadOnly, &[input])?;
    let scratch = Buffer::<f32>::zeroed(ctx, HIDDEN, AccessMode::ReadWrite)?;
    let output_buf = Buffer::<f32>::zeroed(ctx, 1, AccessMode::ReadWrite)?;
    let mut params = Vec::with_capacity(LAYERS.len());
    for layer in &LAYERS {
        let w = Buffer::from_slice(ctx, AccessMode::ReadOnly, layer.weights)?;
        let b = Buffer::from_slice(ctx, AccessMode::ReadOnly, layer.bias)?;
        params.push((w, b));
    }
    pipeline.advance(RunState::BuffersAllocated)?;

    let program = Program::compile(ctx, source)?;
    let matmul = program.entry_point("MatMul")?;
    let add = program.entry_point("Add")?;
    let relu = program.entry_point("ReLU")?;
    pipeline.advance(RunState::ProgramBuilt)?;

    let mut events: Vec<(StageLabel, LaunchEvent)> = Vec::new();
    for (i, layer) in LAYERS.iter().enumerate() {
        let layer_no = (i + 1) as u32;
        let last = i + 1 == LAYERS.len();
        let (w, b) = &params[i];
        let x: &Buffer<f32> = if i == 0 { &input_buf } else { &scratch };

        // the output layer's single row fans in over all 16 columns
        let matmul_global = if last {
            WorkSize::d2(layer.rows, layer.cols)
        } else {
            WorkSize::d2(layer.rows, batch)
        };
        let event = pipeline.launch(
            ctx,
            &matmul,
            matmul_global,
            None,
            &[
                w.arg(),
                x.arg(),
                scratch.arg(),
                cinder_runtime::KernelArg::I32(layer.rows as i32),
                cinder_runtime::KernelArg::I32(layer.cols as i32),
                cinder_runtime::KernelArg::I32(batch as i32),
            ],
        )?;
        events.push((StageLabel::new(layer_no, "MatMul"), event));

        let sum_dst: &Buffer<f32> = if last { &output_buf } else { &scratch };
        let event = pipeline.launch(
            ctx,
            &add,
            WorkSize::d1(layer.rows),
            None,
            &[b.arg(), scratch.arg(), sum_dst.arg()],
        )?;
        events.push((StageLabel::new(layer_no, "Add"), event));

        if layer.relu {
            let event = pipeline.launch(
                ctx,
                &relu,
                WorkSize::d1(layer.rows),
                None,
                &[scratch.arg(), scratch.arg()],
            )?;
            events.push((StageLabel::new(layer_no, "ReLU"), event));
        }
    }
    pipeline.drain(ctx)?;

    let mut profiler = Profiler::for_context(ctx);
    for (label, event) in &events {
        profiler.record(ctx, label.clone(), event)?;
    }

    let mut out = [0.0f32; 1];
    output_buf.read_back(&mut out)?;
    Ok(ForwardRun {
        output: out[0],
        report: profiler.aggregate(),
    })
}

/// Host reference for the same topology and parameters
pub fn host_forward(input: f32) -> f32 {
    let mut hidden = [0.0f32; HIDDEN];
    for r in 0..HIDDEN {
        let pre = weights::LAYER1_WEIGHTS[r] * input + weights::LAYER1_BIAS[r];
        hidden[r] = pre.max(0.0);
    }

    let mut hidden2 = [0.0f32; HIDDEN];
    for r in 0..HIDDEN {
        let mut acc = 0.0f32;
        for k in 0..HIDDEN {
            acc += weights::LAYER2_WEIGHTS[r * HIDDEN + k] * hidden[k];
        }
        hidden2[r] = (acc + weights::LAYER2_BIAS[r]).max(0.0);
    }

    let mut acc = 0.0f32;
    for k in 0..HIDDEN {
        acc += weights::LAYER3_WEIGHTS[k] * hidden2[k];
    }
    acc + weights::LAYER3_BIAS[0]
}
