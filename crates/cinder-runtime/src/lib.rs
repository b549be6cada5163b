//! Kernel-dispatch offload runtime
//!
//! `cinder-runtime` selects a compute device, manages typed device buffers,
//! builds kernel programs from source text, dispatches kernels through an
//! in-order pipeline, and reports per-launch timings from profiled events.
//!
//! # Flow
//!
//! ```text
//! select_device ─▶ ExecutionContext ─▶ Buffer uploads
//!                                   ─▶ Program::compile ─▶ entry_point
//!                                   ─▶ Pipeline::launch*  (ordered)
//!                                   ─▶ Pipeline::drain
//!                                   ─▶ read_back + Profiler::aggregate
//! ```
//!
//! # Example
//!
//! ```rust
//! use cinder_runtime::{
//!     select_device, AccessMode, Buffer, DeviceTypeFilter, ExecutionContext, Pipeline,
//!     Program, WorkSize,
//! };
//!
//! # fn main() -> cinder_runtime::Result<()> {
//! let device = select_device(DeviceTypeFilter::Any)?;
//! let ctx = ExecutionContext::new(&device)?;
//!
//! let a = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[1i32, 2, 3, 4])?;
//! let b = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &[4i32, 3, 2, 1])?;
//! let c = Buffer::<i32>::zeroed(&ctx, 4, AccessMode::WriteOnly)?;
//!
//! let source = "__kernel void vector_add(__global const int* a, \
//!                __global const int* b, __global int* c) \
//!                { int i = get_global_id(0); c[i] = a[i] + b[i]; }";
//! let program = Program::compile(&ctx, source)?;
//! let kernel = program.entry_point("vector_add")?;
//!
//! let mut pipeline = Pipeline::new(&ctx);
//! let event = pipeline.launch(&ctx, &kernel, WorkSize::d1(4), None,
//!     &[a.arg(), b.arg(), c.arg()])?;
//! pipeline.drain(&ctx)?;
//!
//! assert_eq!(c.to_vec()?, vec![5; 4]);
//! assert!(event.duration_ticks(&ctx).is_ok());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod buffer;
pub mod context;
pub mod device;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod profiler;
pub mod program;

pub use backend::{
    Backend, BufferHandle, CpuBackend, ElemType, EventHandle, KernelArg, KernelHandle, ParamDir,
    ParamKind, ParamSpec, ProgramHandle, SharedBackend, WorkSize,
};
pub use buffer::{AccessMode, Buffer, KernelElem};
pub use context::ExecutionContext;
pub use device::{
    enumerate_platforms, select_device, select_from, Device, DeviceInfo, DeviceType,
    DeviceTypeFilter, PlatformInfo,
};
pub use error::{Error, Result};
pub use event::LaunchEvent;
pub use pipeline::{Pipeline, RunState};
pub use profiler::{
    LayerTiming, ProfileReport, Profiler, StageLabel, StageTiming, NANOS_PER_MILLISECOND,
};
pub use program::{load_source, Kernel, Program};
