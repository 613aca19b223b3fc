//! # Completion
//!
//! Everything that happens once the last queued block has been written:
//! refreshing every touched chunk and, for debug runs, reporting how much load
//! the batch added to each tick.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;

use super::queue::WorkQueue;
use crate::core::StResource;
use crate::engine_state::voxels::world::BlockWorld;

/// Opening line of the debug report.
pub const REPORT_BANNER: &str = " --------- MASS BLOCK UPDATE ---------";
/// Closing line of the debug report.
pub const REPORT_FOOTER: &str = " -------------------------------------";

/// Per-tick timings collected by a debug run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleStats {
    load_times: Vec<Duration>,
    ticks: u64,
}

impl CycleStats {
    /// Empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the time one tick spent writing blocks.
    pub fn record(&mut self, elapsed: Duration) {
        self.load_times.push(elapsed);
        self.ticks += 1;
    }

    /// Number of ticks recorded so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Average tick cost in milliseconds, or `None` before the first tick.
    pub fn mean_millis(&self) -> Option<f64> {
        if self.load_times.is_empty() {
            return None;
        }
        let total_nanos: u128 = self.load_times.iter().map(Duration::as_nanos).sum();
        Some(total_nanos as f64 / self.load_times.len() as f64 / 1_000_000.0)
    }
}

/// The instrumentation record of a debug run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DebugSummary {
    /// Average time per tick spent writing blocks, in milliseconds.
    pub mean_cycle_cost_ms: f64,
    /// Number of ticks the batch ran for.
    pub total_cycles: u64,
}

impl DebugSummary {
    /// Builds the summary, or `None` if no tick was recorded.
    pub fn from_stats(stats: &CycleStats) -> Option<Self> {
        stats.mean_millis().map(|mean| DebugSummary {
            mean_cycle_cost_ms: mean,
            total_cycles: stats.ticks(),
        })
    }

    /// Writes the human readable report block.
    pub fn write_report(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", REPORT_BANNER)?;
        writeln!(out, " Added load per tick: {:?} ms", self.mean_cycle_cost_ms)?;
        writeln!(out, " Total ticks run: {}", self.total_cycles)?;
        writeln!(out, "{}", REPORT_FOOTER)
    }
}

/// Outcome of a finished batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateSummary {
    /// Blocks written successfully.
    pub applied: u64,
    /// Blocks skipped because the world rejected them.
    pub failed: u64,
    /// Chunks refreshed after the last write.
    pub chunks_refreshed: usize,
    /// Tick timings, present for debug runs.
    pub debug: Option<DebugSummary>,
}

/// Finalizes a batch once its queue is empty.
pub struct CompletionHandler<W: BlockWorld> {
    world: StResource<W>,
}

impl<W: BlockWorld> CompletionHandler<W> {
    /// Creates a handler that refreshes chunks of `world`.
    pub fn new(world: StResource<W>) -> Self {
        CompletionHandler { world }
    }

    /// Refreshes every queued chunk once and, for debug runs, prints the report.
    ///
    /// # Arguments
    /// * `queue` - The drained queue; only its chunk set is read
    /// * `applied` - Number of blocks written
    /// * `failed` - Number of blocks skipped
    /// * `stats` - Tick timings, `Some` for debug runs
    pub fn finish(
        &self,
        queue: &WorkQueue,
        applied: u64,
        failed: u64,
        stats: Option<&CycleStats>,
    ) -> UpdateSummary {
        let mut world = self.world.get_mut();
        for chunk in queue.chunks() {
            world.refresh_chunk(*chunk);
        }
        drop(world);

        let debug = stats.and_then(|stats| {
            let summary = DebugSummary::from_stats(stats);
            if summary.is_none() {
                log::warn!("Debug run finished without recording a tick");
            }
            summary
        });

        if let Some(debug) = &debug {
            if let Err(err) = debug.write_report(&mut io::stdout().lock()) {
                log::warn!("Could not print block update report: {}", err);
            }
            match serde_json::to_string(debug) {
                Ok(record) => log::debug!("Block update stats: {}", record),
                Err(err) => log::warn!("Could not encode block update stats: {}", err),
            }
        }

        UpdateSummary {
            applied,
            failed,
            chunks_refreshed: queue.chunk_count(),
            debug,
        }
    }
}
