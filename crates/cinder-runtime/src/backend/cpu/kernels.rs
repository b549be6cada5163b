//! Native implementations of the kernel entry points
//!
//! Each entry point the device can build is backed by a host function that
//! consumes a `LaunchIo` of resolved arguments. Input views are snapshots
//! taken before any output is written back, so a launch that binds the same
//! buffer as both input and output behaves like an in-order device queue.

use crate::backend::{ElemType, ParamDir, ParamKind, ParamSpec, WorkSize};
use crate::error::{Error, Result};

/// An argument resolved against device memory for the duration of a launch
#[derive(Debug)]
pub(crate) enum Resolved {
    Buf {
        bytes: Vec<u8>,
        elem: ElemType,
        dir: ParamDir,
        dirty: bool,
    },
    Scalar(i32),
}

/// Resolved argument set handed to a native kernel
#[derive(Debug)]
pub(crate) struct LaunchIo {
    pub(crate) args: Vec<Resolved>,
}

impl LaunchIo {
    fn buf(&self, idx: usize, elem: ElemType) -> Result<&[u8]> {
        match self.args.get(idx) {
            Some(Resolved::Buf {
                bytes,
                elem: have,
                ..
            }) if *have == elem => Ok(bytes),
            _ => Err(Error::dispatch(format!(
                "argument {idx} is not a {elem} buffer"
            ))),
        }
    }

    pub(crate) fn i32_slice(&self, idx: usize) -> Result<Vec<i32>> {
        Ok(bytemuck::pod_collect_to_vec(self.buf(idx, ElemType::I32)?))
    }

    pub(crate) fn f32_slice(&self, idx: usize) -> Result<Vec<f32>> {
        Ok(bytemuck::pod_collect_to_vec(self.buf(idx, ElemType::F32)?))
    }

    pub(crate) fn scalar_i32(&self, idx: usize) -> Result<i32> {
        match self.args.get(idx) {
            Some(Resolved::Scalar(v)) => Ok(*v),
            _ => Err(Error::dispatch(format!("argument {idx} is not an i32 scalar"))),
        }
    }

    fn store(&mut self, idx: usize, elem: ElemType, data: &[u8]) -> Result<()> {
        match self.args.get_mut(idx) {
            Some(Resolved::Buf {
                bytes,
                elem: have,
                dir: ParamDir::Out,
                dirty,
            }) if *have == elem => {
                if bytes.len() != data.len() {
                    return Err(Error::dispatch(format!(
                        "argument {idx}: store of {} bytes into {}-byte buffer",
                        data.len(),
                        bytes.len()
                    )));
                }
                bytes.copy_from_slice(data);
                *dirty = true;
                Ok(())
            }
            _ => Err(Error::dispatch(format!(
                "argument {idx} is not a writable {elem} buffer"
            ))),
        }
    }

    pub(crate) fn store_i32(&mut self, idx: usize, data: &[i32]) -> Result<()> {
        self.store(idx, ElemType::I32, bytemuck::cast_slice(data))
    }

    pub(crate) fn store_f32(&mut self, idx: usize, data: &[f32]) -> Result<()> {
        self.store(idx, ElemType::F32, bytemuck::cast_slice(data))
    }
}

/// A launchable entry point implemented on the host
pub(crate) struct NativeKernel {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
    pub run: fn(WorkSize, &mut LaunchIo) -> Result<()>,
}

const fn global(name: &'static str, elem: ElemType, dir: ParamDir) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Global { elem, dir },
    }
}

const fn scalar(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::ScalarI32,
    }
}

static NATIVE_KERNELS: &[NativeKernel] = &[
    NativeKernel {
        name: "vector_add",
        params: &[
            global("a", ElemType::I32, ParamDir::In),
            global("b", ElemType::I32, ParamDir::In),
            global("c", ElemType::I32, ParamDir::Out),
        ],
        run: run_vector_add,
    },
    NativeKernel {
        name: "MatMul",
        params: &[
            global("weights", ElemType::F32, ParamDir::In),
            global("input", ElemType::F32, ParamDir::In),
            global("output", ElemType::F32, ParamDir::Out),
            scalar("rows"),
            scalar("cols"),
            scalar("batch"),
        ],
        run: run_matmul,
    },
    NativeKernel {
        name: "Add",
        params: &[
            global("bias", ElemType::F32, ParamDir::In),
            global("input", ElemType::F32, ParamDir::In),
            global("output", ElemType::F32, ParamDir::Out),
        ],
        run: run_add,
    },
    NativeKernel {
        name: "ReLU",
        params: &[
            global("input", ElemType::F32, ParamDir::In),
            global("output", ElemType::F32, ParamDir::Out),
        ],
        run: run_relu,
    },
];

/// Find the native implementation for an entry point name
pub(crate) fn lookup(name: &str) -> Option<&'static NativeKernel> {
    NATIVE_KERNELS.iter().find(|k| k.name == name)
}

fn check_extent(label: &str, needed: usize, len: usize) -> Result<()> {
    if len < needed {
        return Err(Error::dispatch(format!(
            "{label}: extent requires {needed} elements, buffer holds {len}"
        )));
    }
    Ok(())
}

/// `c[i] = a[i] + b[i]` for `i` in the first global dimension
fn run_vector_add(global: WorkSize, io: &mut LaunchIo) -> Result<()> {
    let n = global.x;
    let a = io.i32_slice(0)?;
    let b = io.i32_slice(1)?;
    let mut c = io.i32_slice(2)?;
    check_extent("vector_add: a", n, a.len())?;
    check_extent("vector_add: b", n, b.len())?;
    check_extent("vector_add: c", n, c.len())?;
    for i in 0..n {
        c[i] = a[i] + b[i];
    }
    io.store_i32(2, &c)
}

/// `output[r*batch + b] = sum_k weights[r*cols + k] * input[k*batch + b]`
///
/// One output row per work item in the first global dimension, guarded by
/// `row < rows`. Extents must cover every row or part of the output would
/// never be written.
fn run_matmul(global: WorkSize, io: &mut LaunchIo) -> Result<()> {
    let rows = io.scalar_i32(3)?;
    let cols = io.scalar_i32(4)?;
    let batch = io.scalar_i32(5)?;
    if rows <= 0 || cols <= 0 || batch <= 0 {
        return Err(Error::dispatch(format!(
            "MatMul: non-positive shape rows={rows} cols={cols} batch={batch}"
        )));
    }
    let (rows, cols, batch) = (rows as usize, cols as usize, batch as usize);

    let weights = io.f32_slice(0)?;
    let input = io.f32_slice(1)?;
    let mut output = io.f32_slice(2)?;
    check_extent("MatMul: weights", rows * cols, weights.len())?;
    check_extent("MatMul: input", cols * batch, input.len())?;
    check_extent("MatMul: output", rows * batch, output.len())?;
    if global.x < rows {
        return Err(Error::dispatch(format!(
            "MatMul: global extent {} does not cover {rows} output rows",
            global.x
        )));
    }

    for row in 0..rows {
        for b in 0..batch {
            let mut acc = 0.0f32;
            for k in 0..cols {
                acc += weights[row * cols + k] * input[k * batch + b];
            }
            output[row * batch + b] = acc;
        }
    }
    io.store_f32(2, &output)
}

/// `output[i] = bias[i] + input[i]` over the first global dimension
fn run_add(global: WorkSize, io: &mut LaunchIo) -> Result<()> {
    let n = global.x;
    let bias = io.f32_slice(0)?;
    let input = io.f32_slice(1)?;
    let mut output = io.f32_slice(2)?;
    check_extent("Add: bias", n, bias.len())?;
    check_extent("Add: input", n, input.len())?;
    check_extent("Add: output", n, output.len())?;
    for i in 0..n {
        output[i] = bias[i] + input[i];
    }
    io.store_f32(2, &output)
}

/// `output[i] = max(input[i], 0)` over the first global dimension
fn run_relu(global: WorkSize, io: &mut LaunchIo) -> Result<()> {
    let n = global.x;
    let input = io.f32_slice(0)?;
    let mut output = io.f32_slice(1)?;
    check_extent("ReLU: input", n, input.len())?;
    check_extent("ReLU: output", n, output.len())?;
    for i in 0..n {
        output[i] = input[i].max(0.0);
    }
    io.store_f32(1, &output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_buf(data: &[f32], dir: ParamDir) -> Resolved {
        Resolved::Buf {
            bytes: bytemuck::cast_slice(data).to_vec(),
            elem: ElemType::F32,
            dir,
            dirty: false,
        }
    }

    fn out_f32(io: &LaunchIo, idx: usize) -> Vec<f32> {
        match &io.args[idx] {
            Resolved::Buf { bytes, .. } => bytemuck::pod_collect_to_vec(bytes),
            _ => panic!("not a buffer"),
        }
    }

    #[test]
    fn test_vector_add_native() {
        let a: Vec<i32> = (0..8).collect();
        let b: Vec<i32> = (0..8).rev().collect();
        let mut io = LaunchIo {
            args: vec![
                Resolved::Buf {
                    bytes: bytemuck::cast_slice(&a).to_vec(),
                    elem: ElemType::I32,
                    dir: ParamDir::In,
                    dirty: false,
                },
                Resolved::Buf {
                    bytes: bytemuck::cast_slice(&b).to_vec(),
                    elem: ElemType::I32,
                    dir: ParamDir::In,
                    dirty: false,
                },
                Resolved::Buf {
                    bytes: vec![0u8; 32],
                    elem: ElemType::I32,
                    dir: ParamDir::Out,
                    dirty: false,
                },
            ],
        };
        run_vector_add(WorkSize::d1(8), &mut io).unwrap();
        let c: Vec<i32> = match &io.args[2] {
            Resolved::Buf { bytes, .. } => bytemuck::pod_collect_to_vec(bytes),
            _ => unreachable!(),
        };
        assert!(c.iter().all(|&v| v == 7));
    }

    #[test]
    fn test_matmul_small() {
        // 2x3 weights times 3x1 input
        let w = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = [1.0f32, 0.5, 2.0];
        let mut io = LaunchIo {
            args: vec![
                f32_buf(&w, ParamDir::In),
                f32_buf(&x, ParamDir::In),
                f32_buf(&[0.0; 2], ParamDir::Out),
                Resolved::Scalar(2),
                Resolved::Scalar(3),
                Resolved::Scalar(1),
            ],
        };
        run_matmul(WorkSize::d2(2, 1), &mut io).unwrap();
        let y = out_f32(&io, 2);
        assert_eq!(y, vec![8.0, 18.5]);
    }

    #[test]
    fn test_matmul_extent_must_cover_rows() {
        let mut io = LaunchIo {
            args: vec![
                f32_buf(&[1.0; 4], ParamDir::In),
                f32_buf(&[1.0; 2], ParamDir::In),
                f32_buf(&[0.0; 2], ParamDir::Out),
                Resolved::Scalar(2),
                Resolved::Scalar(2),
                Resolved::Scalar(1),
            ],
        };
        let err = run_matmul(WorkSize::d1(1), &mut io).unwrap_err();
        assert!(matches!(err, Error::DispatchFailure(_)));
    }

    #[test]
    fn test_add_aliased_input_output() {
        let v = [1.0f32, -2.0, 3.0, -4.0];
        let mut io = LaunchIo {
            args: vec![
                f32_buf(&[10.0, 10.0, 10.0, 10.0], ParamDir::In),
                f32_buf(&v, ParamDir::In),
                f32_buf(&v, ParamDir::Out),
            ],
        };
        run_add(WorkSize::d1(4), &mut io).unwrap();
        assert_eq!(out_f32(&io, 2), vec![11.0, 8.0, 13.0, 6.0]);
    }

    #[test]
    fn test_relu_clamps_negatives() {
        let v = [0.5f32, -0.25, 0.0, -7.0];
        let mut io = LaunchIo {
            args: vec![f32_buf(&v, ParamDir::In), f32_buf(&v, ParamDir::Out)],
        };
        run_relu(WorkSize::d1(4), &mut io).unwrap();
        assert_eq!(out_f32(&io, 1), vec![0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_store_rejects_read_only_parameter() {
        let mut io = LaunchIo {
            args: vec![f32_buf(&[1.0], ParamDir::In)],
        };
        assert!(io.store_f32(0, &[2.0]).is_err());
    }

    #[test]
    fn test_lookup_knows_every_entry() {
        for name in ["vector_add", "MatMul", "Add", "ReLU"] {
            assert!(lookup(name).is_some(), "missing native kernel {name}");
        }
        assert!(lookup("Conv2D").is_none());
    }
}
