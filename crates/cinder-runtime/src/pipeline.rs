//! Ordered dispatch pipeline
//!
//! Launches submitted through a pipeline retire in submission order, so a
//! chain of kernels communicating through shared scratch buffers is
//! well-defined without host-side synchronisation between launches. The
//! pipeline also tracks the lifecycle of a run as a monotone state machine;
//! `Completed` and `Failed` are terminal.

use crate::backend::{KernelArg, ParamDir, ParamKind, WorkSize};
use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use crate::event::LaunchEvent;
use crate::program::Kernel;
use std::fmt;

/// Lifecycle of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    DeviceReady,
    BuffersAllocated,
    ProgramBuilt,
    Executing { launched: usize },
    Completed,
    Failed,
}

impl RunState {
    const fn rank(&self) -> u8 {
        match self {
            RunState::Idle => 0,
            RunState::DeviceReady => 1,
            RunState::BuffersAllocated => 2,
            RunState::ProgramBuilt => 3,
            RunState::Executing { .. } => 4,
            RunState::Completed => 5,
            RunState::Failed => 6,
        }
    }

    /// Whether no further transitions are allowed
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }

    /// Advance to `next`, rejecting regressions and exits from terminal states
    ///
    /// Setup phases may be skipped (a run may go straight from `DeviceReady`
    /// to `Executing`), but the order never reverses. `Executing` may repeat
    /// as launches accumulate. Any non-terminal state may fail.
    pub fn advance(self, next: RunState) -> Result<RunState> {
        if self.is_terminal() {
            return Err(Error::dispatch(format!(
                "pipeline run already {self}, cannot move to {next}"
            )));
        }
        let repeat_executing = matches!(
            (self, next),
            (RunState::Executing { .. }, RunState::Executing { .. })
        );
        if repeat_executing || next.rank() > self.rank() {
            Ok(next)
        } else {
            Err(Error::dispatch(format!(
                "invalid pipeline state transition: {self} -> {next}"
            )))
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::DeviceReady => write!(f, "device-ready"),
            RunState::BuffersAllocated => write!(f, "buffers-allocated"),
            RunState::ProgramBuilt => write!(f, "program-built"),
            RunState::Executing { launched } => write!(f, "executing({launched})"),
            RunState::Completed => write!(f, "completed"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// In-order dispatch queue over one context
pub struct Pipeline {
    state: RunState,
}

impl Pipeline {
    /// Create a pipeline over a live context
    pub fn new(ctx: &ExecutionContext) -> Self {
        tracing::debug!(device = %ctx.device(), "pipeline created");
        Self {
            state: RunState::DeviceReady,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Record a lifecycle phase boundary
    pub fn advance(&mut self, next: RunState) -> Result<()> {
        self.state = self.state.advance(next)?;
        Ok(())
    }

    /// Submit a launch of `kernel` over `global` work items
    ///
    /// Arguments are validated positionally against the entry signature
    /// before anything reaches the device. The returned event's timestamps
    /// become readable after `drain`.
    #[tracing::instrument(skip(self, ctx, kernel, args), fields(kernel = kernel.name(), %global))]
    pub fn launch(
        &mut self,
        ctx: &ExecutionContext,
        kernel: &Kernel,
        global: WorkSize,
        local: Option<WorkSize>,
        args: &[KernelArg],
    ) -> Result<LaunchEvent> {
        self.state.advance(RunState::Executing { launched: 0 })?;
        let launched = match self.state {
            RunState::Executing { launched } => launched + 1,
            _ => 1,
        };

        if let Err(err) = validate_args(kernel, args) {
            self.state = RunState::Failed;
            return Err(err);
        }
        let handle = match ctx
            .backend()
            .write()
            .enqueue_kernel(kernel.handle(), global, local, args)
        {
            Ok(handle) => handle,
            Err(err) => {
                self.state = RunState::Failed;
                return Err(err);
            }
        };
        self.state = RunState::Executing { launched };
        Ok(LaunchEvent::new(handle))
    }

    /// Block until every submitted launch retires
    ///
    /// Seals all event timestamps and moves the run to `Completed`.
    pub fn drain(&mut self, ctx: &ExecutionContext) -> Result<()> {
        self.state.advance(RunState::Completed)?;
        if let Err(err) = ctx.backend().write().finish() {
            self.state = RunState::Failed;
            return Err(err);
        }
        self.state = RunState::Completed;
        Ok(())
    }
}

fn validate_args(kernel: &Kernel, args: &[KernelArg]) -> Result<()> {
    let params = kernel.params();
    if params.len() != args.len() {
        return Err(Error::dispatch(format!(
            "entry `{}` expects {} arguments, got {}",
            kernel.name(),
            params.len(),
            args.len()
        )));
    }
    for (idx, (spec, arg)) in params.iter().zip(args).enumerate() {
        match (spec.kind, arg) {
            (ParamKind::Global { elem, dir }, KernelArg::Buffer { access, elem: have, .. }) => {
                if elem != *have {
                    return Err(Error::dispatch(format!(
                        "argument {idx} (`{}`): expected {elem} buffer, got {have}",
                        spec.name
                    )));
                }
                if dir == ParamDir::Out && !access.allows_kernel_write() {
                    return Err(Error::dispatch(format!(
                        "argument {idx} (`{}`): {access} buffer bound to an output parameter",
                        spec.name
                    )));
                }
                if dir == ParamDir::In && !access.allows_kernel_read() {
                    return Err(Error::dispatch(format!(
                        "argument {idx} (`{}`): {access} buffer bound to an input parameter",
                        spec.name
                    )));
                }
            }
            (ParamKind::ScalarI32, KernelArg::I32(_)) => {}
            _ => {
                return Err(Error::dispatch(format!(
                    "argument {idx} (`{}`): kind does not match the entry signature",
                    spec.name
                )));
            }
        }
    }
    Ok(())
}
