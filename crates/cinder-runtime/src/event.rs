//! Profiling events recorded at kernel launch
//!
//! An event exists from the moment a launch is submitted, but its
//! timestamps are sealed only when the pipeline drains. Reading them
//! earlier is `EventNotReady`, not a stale value.

use crate::backend::EventHandle;
use crate::context::ExecutionContext;
use crate::error::Result;

/// Event tied to one submitted launch
#[derive(Debug, Clone, Copy)]
pub struct LaunchEvent {
    handle: EventHandle,
}

impl LaunchEvent {
    pub(crate) fn new(handle: EventHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> EventHandle {
        self.handle
    }

    /// Start and end of the launch in device ticks
    ///
    /// Available only after the queue drains; `end >= start` always holds.
    pub fn timestamps(&self, ctx: &ExecutionContext) -> Result<(u64, u64)> {
        ctx.backend().read().event_timestamps(self.handle)
    }

    /// Duration of the launch in device ticks
    pub fn duration_ticks(&self, ctx: &ExecutionContext) -> Result<u64> {
        let (start, end) = self.timestamps(ctx)?;
        Ok(end - start)
    }
}
