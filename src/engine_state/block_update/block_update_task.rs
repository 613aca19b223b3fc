//! # Block Update Task
//!
//! The tick task that drains a batch. Each tick it:
//! 1. takes up to `rate_limit` positions from the front of the queue
//! 2. writes the batch material at each of them, in order
//! 3. records how long that took, for debug runs
//! 4. finalizes the batch and finishes if the queue is now empty
//!
//! A write the world rejects is logged and skipped; the rest of the batch
//! still drains. Blocks enqueued between two ticks are picked up by the next
//! tick at the same rate.

use web_time::Instant;

use super::applier::MutationApplier;
use super::completion::{CompletionHandler, CycleStats, UpdateSummary};
use super::queue::WorkQueue;
use crate::core::StResource;
use crate::engine_state::task_management::task::{TaskStatus, TickTask};
use crate::engine_state::voxels::world::BlockWorld;

/// Rate limited drain of one batch.
pub struct BlockUpdateTask<W: BlockWorld> {
    queue: StResource<WorkQueue>,
    applier: MutationApplier<W>,
    completion: CompletionHandler<W>,
    summary: StResource<Option<UpdateSummary>>,
    rate_limit: usize,
    /// `Some` for debug runs.
    stats: Option<CycleStats>,
    applied: u64,
    failed: u64,
}

impl<W: BlockWorld> BlockUpdateTask<W> {
    /// Creates the drain task.
    ///
    /// # Arguments
    /// * `queue` - The batch queue, shared with the producer
    /// * `applier` - Writes single blocks
    /// * `completion` - Runs once the queue is empty
    /// * `summary` - Receives the outcome when the batch completes
    /// * `rate_limit` - Maximum blocks written per tick, at least one
    /// * `debug` - Whether to time each tick
    pub fn new(
        queue: StResource<WorkQueue>,
        applier: MutationApplier<W>,
        completion: CompletionHandler<W>,
        summary: StResource<Option<UpdateSummary>>,
        rate_limit: usize,
        debug: bool,
    ) -> Self {
        debug_assert!(rate_limit > 0);
        BlockUpdateTask {
            queue,
            applier,
            completion,
            summary,
            rate_limit,
            stats: debug.then(CycleStats::new),
            applied: 0,
            failed: 0,
        }
    }

    fn update_blocks(&mut self) {
        let positions = self.queue.get_mut().drain_up_to(self.rate_limit);

        for position in positions {
            match self.applier.apply(position) {
                Ok(()) => self.applied += 1,
                Err(err) => {
                    self.failed += 1;
                    log::warn!(
                        "Skipping {} block at ({}, {}, {}): {}",
                        self.applier.material(),
                        position.x,
                        position.y,
                        position.z,
                        err
                    );
                }
            }
        }
    }
}

impl<W: BlockWorld> TickTask for BlockUpdateTask<W> {
    fn name(&self) -> &str {
        "mass block update"
    }

    fn run_tick(&mut self) -> TaskStatus {
        let start = self.stats.is_some().then(Instant::now);

        self.update_blocks();

        if let (Some(stats), Some(start)) = (self.stats.as_mut(), start) {
            stats.record(start.elapsed());
        }

        let queue = self.queue.get();
        if !queue.is_empty() {
            log::trace!("{} blocks left in mass block update", queue.len());
            return TaskStatus::Continue;
        }

        let summary = self
            .completion
            .finish(&queue, self.applied, self.failed, self.stats.as_ref());
        drop(queue);

        log::info!(
            "Mass block update finished: {} blocks written, {} skipped, {} chunks refreshed",
            summary.applied,
            summary.failed,
            summary.chunks_refreshed
        );
        *self.summary.get_mut() = Some(summary);

        TaskStatus::Finished
    }

    fn on_cancel(&mut self) {
        let queue = self.queue.get();
        log::warn!(
            "Mass block update cancelled with {} blocks pending; {} chunks were not refreshed",
            queue.len(),
            queue.chunk_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::ChunkPos;
    use crate::test_utils::RecordingWorld;

    struct Fixture {
        world: StResource<RecordingWorld>,
        queue: StResource<WorkQueue>,
        summary: StResource<Option<UpdateSummary>>,
    }

    impl Fixture {
        fn new(blocks: i32) -> Self {
            let queue = StResource::new(WorkQueue::new());
            for x in 0..blocks {
                queue.get_mut().enqueue(Point3::new(x, 64, 0));
            }
            queue.get_mut().enqueue_chunk(ChunkPos::new(0, 0));
            Fixture {
                world: StResource::new(RecordingWorld::new(64)),
                queue,
                summary: StResource::new(None),
            }
        }

        fn task(&self, rate_limit: usize, debug: bool) -> BlockUpdateTask<RecordingWorld> {
            BlockUpdateTask::new(
                self.queue.clone(),
                MutationApplier::new(self.world.clone(), BlockType::STONE),
                CompletionHandler::new(self.world.clone()),
                self.summary.clone(),
                rate_limit,
                debug,
            )
        }
    }

    fn ticks_to_finish(task: &mut BlockUpdateTask<RecordingWorld>) -> u64 {
        let mut ticks = 1;
        while task.run_tick() == TaskStatus::Continue {
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn tick_count_is_ceiling_of_blocks_over_rate() {
        for (blocks, rate) in [(10, 3), (9, 3), (1, 1), (7, 100), (100, 1)] {
            let fixture = Fixture::new(blocks);
            let mut task = fixture.task(rate, false);
            let expected = (blocks as u64).div_ceil(rate as u64);
            assert_eq!(ticks_to_finish(&mut task), expected, "{} blocks at {}", blocks, rate);
        }
    }

    #[test]
    fn every_block_written_once_in_order() {
        let fixture = Fixture::new(25);
        let mut task = fixture.task(4, false);
        ticks_to_finish(&mut task);

        let xs: Vec<i32> = fixture.world.get().writes.iter().map(|(p, _)| p.x).collect();
        assert_eq!(xs, (0..25).collect::<Vec<_>>());
        assert!(fixture
            .world
            .get()
            .writes
            .iter()
            .all(|(_, block_type)| *block_type == BlockType::STONE));
    }

    #[test]
    fn rate_limit_bounds_each_tick() {
        let fixture = Fixture::new(10);
        let mut task = fixture.task(4, false);

        assert_eq!(task.run_tick(), TaskStatus::Continue);
        assert_eq!(fixture.world.get().writes.len(), 4);
        assert_eq!(task.run_tick(), TaskStatus::Continue);
        assert_eq!(fixture.world.get().writes.len(), 8);
        assert!(fixture.world.get().refreshes.is_empty());
        assert_eq!(task.run_tick(), TaskStatus::Finished);
        assert_eq!(fixture.world.get().writes.len(), 10);
    }

    #[test]
    fn completion_runs_once_after_last_write() {
        let fixture = Fixture::new(5);
        let mut task = fixture.task(2, false);

        task.run_tick();
        task.run_tick();
        assert!(fixture.summary.get().is_none());
        assert!(fixture.world.get().refreshes.is_empty());

        assert_eq!(task.run_tick(), TaskStatus::Finished);
        assert_eq!(fixture.world.get().refreshes, vec![ChunkPos::new(0, 0)]);
        let summary = fixture.summary.get().clone().unwrap();
        assert_eq!(summary.applied, 5);
        assert_eq!(summary.chunks_refreshed, 1);
        assert_eq!(summary.debug, None);
    }

    #[test]
    fn empty_batch_completes_on_first_tick() {
        let fixture = Fixture::new(0);
        let mut task = fixture.task(10, true);

        assert_eq!(task.run_tick(), TaskStatus::Finished);
        assert_eq!(fixture.world.get().refreshes, vec![ChunkPos::new(0, 0)]);
        let summary = fixture.summary.get().clone().unwrap();
        assert_eq!(summary.debug.map(|debug| debug.total_cycles), Some(1));
    }

    #[test]
    fn failed_writes_are_skipped() {
        let fixture = Fixture::new(6);
        fixture.world.get_mut().reject(Point3::new(2, 64, 0));
        fixture.world.get_mut().reject(Point3::new(5, 64, 0));
        let mut task = fixture.task(4, false);
        ticks_to_finish(&mut task);

        let summary = fixture.summary.get().clone().unwrap();
        assert_eq!(summary.applied, 4);
        assert_eq!(summary.failed, 2);
        let xs: Vec<i32> = fixture.world.get().writes.iter().map(|(p, _)| p.x).collect();
        assert_eq!(xs, vec![0, 1, 3, 4]);
    }

    #[test]
    fn blocks_enqueued_between_ticks_are_drained() {
        let fixture = Fixture::new(3);
        let mut task = fixture.task(2, false);

        assert_eq!(task.run_tick(), TaskStatus::Continue);
        fixture.queue.get_mut().enqueue(Point3::new(50, 64, 0));
        fixture.queue.get_mut().enqueue_chunk(ChunkPos::new(3, 0));

        assert_eq!(task.run_tick(), TaskStatus::Finished);
        assert_eq!(fixture.world.get().writes.len(), 4);
        assert_eq!(fixture.summary.get().as_ref().map(|s| s.chunks_refreshed), Some(2));
    }

    #[test]
    fn debug_run_counts_every_tick() {
        let fixture = Fixture::new(9);
        let mut task = fixture.task(2, true);
        let ticks = ticks_to_finish(&mut task);

        let summary = fixture.summary.get().clone().unwrap();
        let debug = summary.debug.unwrap();
        assert_eq!(debug.total_cycles, ticks);
        assert_eq!(debug.total_cycles, 5);
        assert!(debug.mean_cycle_cost_ms >= 0.0);
    }
}
