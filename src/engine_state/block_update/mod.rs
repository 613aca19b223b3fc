//! # Mass Block Update
//!
//! Writes large numbers of blocks without stalling the tick loop.
//!
//! A batch collects block positions and the chunks they touch, then hands them
//! to a `BlockUpdateTask` that writes at most `rate_limit` blocks per tick. When
//! the queue runs dry the task refreshes every collected chunk exactly once and
//! removes itself from the scheduler.
//!
//! ## Components
//! - `WorkQueue`: FIFO positions plus the chunk set
//! - `BlockUpdateTask`: the per-tick drain
//! - `MutationApplier`: writes one block into the world
//! - `CompletionHandler`: chunk refresh and the debug report
//! - `border`: square and circular border producers
//!
//! ## Example Usage
//! ```rust
//! use mass_block_update::core::StResource;
//! use mass_block_update::engine_state::block_update::{BasicMassBlockUpdate, MassBlockUpdate};
//! use mass_block_update::engine_state::task_management::TickScheduler;
//! use mass_block_update::engine_state::voxels::block::block_type::BlockType;
//! use mass_block_update::engine_state::voxels::world::{TerrainGenerator, World};
//!
//! let world = StResource::new(World::new(&TerrainGenerator::Flat { height: 64 }));
//! world.get_mut().load_area(0, 0, 1);
//!
//! let mut update = BasicMassBlockUpdate::new(BlockType::GLASS, world.clone(), 100).unwrap();
//! for x in 0..250 {
//!     update.add_block_and_chunk(x % 16, 64, x / 16).unwrap();
//! }
//!
//! let mut scheduler = TickScheduler::new();
//! let handle = update.run(&mut scheduler).unwrap();
//! assert_eq!(scheduler.run_until_idle(100), 3);
//! assert_eq!(handle.summary().unwrap().applied, 250);
//! ```

pub mod applier;
pub mod block_update_task;
pub mod border;
pub mod completion;
pub mod queue;

use std::fmt;

use applier::MutationApplier;
use block_update_task::BlockUpdateTask;
use completion::{CompletionHandler, UpdateSummary};
use queue::WorkQueue;

use crate::core::StResource;
use crate::engine_state::task_management::task::{TaskHandle, TaskState};
use crate::engine_state::task_management::TickScheduler;
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{ChunkPos, WORLD_HEIGHT};
use crate::engine_state::voxels::world::BlockWorld;
use crate::error::{BatchError, EnqueueError};

use cgmath::Point3;

/// The interface every mass block update offers.
///
/// Blocks and chunks are collected with the `add_*` methods, then `run` or
/// `run_debug` registers the drain with a tick scheduler.
pub trait MassBlockUpdate {
    /// Queues a block and the chunk that holds it.
    fn add_block_and_chunk(&mut self, x: i32, y: i32, z: i32) -> Result<(), EnqueueError>;

    /// Queues a block without queueing its chunk for refresh.
    fn add_block(&mut self, x: i32, y: i32, z: i32) -> Result<(), EnqueueError>;

    /// Queues the block containing the point `(x, y, z)`.
    ///
    /// Each coordinate is floored, so `-0.5` lands in cell `-1` and `2.7` in cell `2`.
    fn add_block_f64(&mut self, x: f64, y: f64, z: f64) -> Result<(), EnqueueError>;

    /// Queues a chunk for refresh once the batch is done.
    fn add_chunk(&mut self, chunk: ChunkPos);

    /// Starts draining the batch.
    fn run(&mut self, scheduler: &mut TickScheduler) -> Result<UpdateHandle, BatchError>;

    /// Starts draining the batch and prints per-tick load statistics when done.
    fn run_debug(&mut self, scheduler: &mut TickScheduler) -> Result<UpdateHandle, BatchError>;
}

/// Converts a fractional coordinate to the block coordinate of the cell containing it.
pub fn block_coordinate(axis: char, value: f64) -> Result<i32, EnqueueError> {
    if !value.is_finite() {
        return Err(EnqueueError::NonFinite { axis, value });
    }
    let floored = value.floor();
    if floored < i32::MIN as f64 || floored > i32::MAX as f64 {
        return Err(EnqueueError::OutOfRange { axis, value });
    }
    Ok(floored as i32)
}

/// Handle on a running batch.
#[derive(Clone)]
pub struct UpdateHandle {
    task: TaskHandle,
    summary: StResource<Option<UpdateSummary>>,
}

impl UpdateHandle {
    /// Lifecycle state of the drain task.
    pub fn state(&self) -> TaskState {
        self.task.state()
    }

    /// Stops the batch before its next tick.
    ///
    /// Blocks written so far stay written, but no chunk is refreshed.
    pub fn cancel(&self) -> bool {
        self.task.cancel()
    }

    /// The outcome, available once the batch completed.
    pub fn summary(&self) -> Option<UpdateSummary> {
        self.summary.get().clone()
    }
}

impl fmt::Debug for UpdateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateHandle")
            .field("task", &self.task)
            .field("summary", &*self.summary.get())
            .finish()
    }
}

/// The standard mass block update: one material, one world, one rate limit.
pub struct BasicMassBlockUpdate<W: BlockWorld> {
    queue: StResource<WorkQueue>,
    world: StResource<W>,
    material: BlockType,
    rate_limit: usize,
    started: bool,
}

impl<W: BlockWorld + 'static> BasicMassBlockUpdate<W> {
    /// Creates an empty batch.
    ///
    /// # Arguments
    /// * `material` - The block written at every queued position
    /// * `world` - The world to write into
    /// * `rate_limit` - Maximum blocks written per tick
    ///
    /// # Errors
    /// `BatchError::ZeroRateLimit` if `rate_limit` is zero.
    pub fn new(material: BlockType, world: StResource<W>, rate_limit: usize) -> Result<Self, BatchError> {
        if rate_limit == 0 {
            return Err(BatchError::ZeroRateLimit);
        }
        Ok(BasicMassBlockUpdate {
            queue: StResource::new(WorkQueue::new()),
            world,
            material,
            rate_limit,
            started: false,
        })
    }

    /// The block written at every queued position.
    pub fn material(&self) -> BlockType {
        self.material
    }

    /// Maximum blocks written per tick.
    pub fn rate_limit(&self) -> usize {
        self.rate_limit
    }

    /// The world this batch writes into.
    pub fn world(&self) -> &StResource<W> {
        &self.world
    }

    /// Blocks waiting to be written.
    pub fn queued_blocks(&self) -> usize {
        self.queue.get().len()
    }

    /// Chunks waiting to be refreshed.
    pub fn queued_chunks(&self) -> usize {
        self.queue.get().chunk_count()
    }

    fn check_height(y: i32) -> Result<(), EnqueueError> {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return Err(EnqueueError::OutsideWorld {
                y,
                height: WORLD_HEIGHT,
            });
        }
        Ok(())
    }

    fn start(&mut self, scheduler: &mut TickScheduler, debug: bool) -> Result<UpdateHandle, BatchError> {
        if self.started {
            return Err(BatchError::AlreadyStarted);
        }
        self.started = true;

        log::info!(
            "Starting mass block update of {} {} blocks in {} chunks at {} blocks per tick{}",
            self.queued_blocks(),
            self.material,
            self.queued_chunks(),
            self.rate_limit,
            if debug { " (debug)" } else { "" }
        );

        let summary = StResource::new(None);
        let task = BlockUpdateTask::new(
            self.queue.clone(),
            MutationApplier::new(self.world.clone(), self.material),
            CompletionHandler::new(self.world.clone()),
            summary.clone(),
            self.rate_limit,
            debug,
        );

        Ok(UpdateHandle {
            task: scheduler.schedule(Box::new(task)),
            summary,
        })
    }
}

impl<W: BlockWorld + 'static> MassBlockUpdate for BasicMassBlockUpdate<W> {
    fn add_block_and_chunk(&mut self, x: i32, y: i32, z: i32) -> Result<(), EnqueueError> {
        Self::check_height(y)?;
        let chunk = self.world.get().chunk_containing(x, y, z);
        self.add_chunk(chunk);
        self.add_block(x, y, z)
    }

    fn add_block(&mut self, x: i32, y: i32, z: i32) -> Result<(), EnqueueError> {
        Self::check_height(y)?;
        self.queue.get_mut().enqueue(Point3::new(x, y, z));
        Ok(())
    }

    fn add_block_f64(&mut self, x: f64, y: f64, z: f64) -> Result<(), EnqueueError> {
        let x = block_coordinate('x', x)?;
        let y = block_coordinate('y', y)?;
        let z = block_coordinate('z', z)?;
        self.add_block(x, y, z)
    }

    fn add_chunk(&mut self, chunk: ChunkPos) {
        self.queue.get_mut().enqueue_chunk(chunk);
    }

    fn run(&mut self, scheduler: &mut TickScheduler) -> Result<UpdateHandle, BatchError> {
        self.start(scheduler, false)
    }

    fn run_debug(&mut self, scheduler: &mut TickScheduler) -> Result<UpdateHandle, BatchError> {
        self.start(scheduler, true)
    }
}
