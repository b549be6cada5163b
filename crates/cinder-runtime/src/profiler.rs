//! Event-timestamp profiling
//!
//! The profiler collects (stage label, start, end) triples from retired
//! launch events and aggregates them in device ticks. Tick arithmetic is
//! exact, so per-stage durations sum to their layer total and layer totals
//! sum to the grand total with no rounding drift. Conversion to wall-clock
//! units happens once, at the edge of the report.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::event::LaunchEvent;
use std::fmt;

/// Nanoseconds per millisecond, used to convert tick durations for display
pub const NANOS_PER_MILLISECOND: u64 = 1_000_000;

/// Identifies one profiled stage within a layered run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageLabel {
    pub layer: u32,
    pub stage: String,
}

impl StageLabel {
    pub fn new(layer: u32, stage: impl Into<String>) -> Self {
        Self {
            layer,
            stage: stage.into(),
        }
    }
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer {} {}", self.layer, self.stage)
    }
}

#[derive(Debug, Clone)]
struct Sample {
    label: StageLabel,
    start_ticks: u64,
    end_ticks: u64,
}

/// Duration of one recorded stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub label: StageLabel,
    pub ticks: u64,
}

/// Summed duration of all stages sharing a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerTiming {
    pub layer: u32,
    pub ticks: u64,
}

/// Collects launch events and aggregates their timings
pub struct Profiler {
    nanos_per_tick: u64,
    samples: Vec<Sample>,
}

impl Profiler {
    /// Profiler using the context's device tick resolution
    pub fn for_context(ctx: &ExecutionContext) -> Self {
        Self::new(ctx.nanos_per_tick())
    }

    pub fn new(nanos_per_tick: u64) -> Self {
        Self {
            nanos_per_tick,
            samples: Vec::new(),
        }
    }

    /// Record one retired launch under `label`
    ///
    /// Fails with `EventNotReady` if the queue has not drained yet; nothing
    /// is stored in that case.
    pub fn record(
        &mut self,
        ctx: &ExecutionContext,
        label: StageLabel,
        event: &LaunchEvent,
    ) -> Result<()> {
        let (start_ticks, end_ticks) = event.timestamps(ctx)?;
        self.samples.push(Sample {
            label,
            start_ticks,
            end_ticks,
        });
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Aggregate recorded samples into per-stage, per-layer, and total ticks
    ///
    /// Pure over the recorded samples; stages and layers keep first-seen
    /// order.
    pub fn aggregate(&self) -> ProfileReport {
        let mut per_stage = Vec::with_capacity(self.samples.len());
        let mut per_layer: Vec<LayerTiming> = Vec::new();
        let mut total_ticks = 0u64;

        for sample in &self.samples {
            let ticks = sample.end_ticks - sample.start_ticks;
            per_stage.push(StageTiming {
                label: sample.label.clone(),
                ticks,
            });
            match per_layer.iter_mut().find(|l| l.layer == sample.label.layer) {
                Some(layer) => layer.ticks += ticks,
                None => per_layer.push(LayerTiming {
                    layer: sample.label.layer,
                    ticks,
                }),
            }
            total_ticks += ticks;
        }

        ProfileReport {
            nanos_per_tick: self.nanos_per_tick,
            per_stage,
            per_layer,
            total_ticks,
        }
    }
}

/// Aggregated timing report in device ticks
#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub nanos_per_tick: u64,
    pub per_stage: Vec<StageTiming>,
    pub per_layer: Vec<LayerTiming>,
    pub total_ticks: u64,
}

impl ProfileReport {
    /// Convert a tick duration to milliseconds
    pub fn millis(&self, ticks: u64) -> f64 {
        (ticks * self.nanos_per_tick) as f64 / NANOS_PER_MILLISECOND as f64
    }

    pub fn total_millis(&self) -> f64 {
        self.millis(self.total_ticks)
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_millis() / 1_000.0
    }
}
