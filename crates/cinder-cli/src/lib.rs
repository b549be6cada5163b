//! Demos for the cinder offload runtime
//!
//! Two workloads exercise the whole runtime surface: an element-wise
//! vector addition and a fixed 3-layer feed-forward network dispatched as a
//! chain of MatMul/Add/ReLU kernels. Both verify device results against a
//! host computation and report profiled timings.

pub mod network;
pub mod report;
pub mod vecadd;
pub mod weights;
