//! # Engine State Module
//!
//! The server side state a mass block update runs against.
//!
//! ## Key Components
//!
//! * `ServerState` - Owns the world and the tick scheduler
//! * `block_update` - Rate limited batch writes and the border producers
//! * `task_management` - The tick loop and the tasks it drives
//! * `voxels` - Blocks, chunks and the world they live in
//!
//! ## Architecture
//!
//! The world sits behind a `StResource` so that every batch, its drain task and
//! the host can all hold a handle to it. Everything runs on the thread that
//! drives the scheduler.

use std::time::Duration;

use block_update::border::{BorderBlockUpdate, ColumnShape};
use block_update::{BasicMassBlockUpdate, MassBlockUpdate, UpdateHandle};
use task_management::TickScheduler;
use voxels::block::block_type::BlockType;
use voxels::world::{TerrainGenerator, World};

use crate::core::StResource;
use crate::error::AppError;

pub mod block_update;
pub mod task_management;
pub mod voxels;

/// Border placement request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BorderRequest {
    /// Column the border is centered on.
    pub center_x: i32,
    /// See `center_x`.
    pub center_z: i32,
    /// Distance from the center to the outline.
    pub radius: i32,
    /// Blocks stacked on the terrain per column.
    pub height: i32,
}

/// The world plus the scheduler that ticks it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use mass_block_update::engine_state::{BorderRequest, ServerState};
/// use mass_block_update::engine_state::block_update::border::BorderShape;
/// use mass_block_update::engine_state::voxels::block::block_type::BlockType;
/// use mass_block_update::engine_state::voxels::world::TerrainGenerator;
///
/// let mut server = ServerState::new(&TerrainGenerator::Flat { height: 40 });
/// server.load_area(0, 0, 1);
///
/// let request = BorderRequest { center_x: 0, center_z: 0, radius: 3, height: 2 };
/// let handle = server
///     .start_border(&BorderShape::Square, request, BlockType::GLASS, 10, false)
///     .unwrap();
///
/// server.run(Duration::ZERO, Some(100));
/// assert_eq!(handle.summary().unwrap().applied, 24 * 2);
/// ```
pub struct ServerState {
    /// The voxel world, shared with running batches.
    pub world: StResource<World>,
    scheduler: TickScheduler,
}

impl ServerState {
    /// Creates a server with an empty world using the given terrain generator.
    pub fn new(generator: &TerrainGenerator) -> Self {
        ServerState {
            world: StResource::new(World::new(generator)),
            scheduler: TickScheduler::new(),
        }
    }

    /// Loads chunks around a block column.
    pub fn load_area(&mut self, block_x: i32, block_z: i32, radius_chunks: i32) {
        self.world.get_mut().load_area(block_x, block_z, radius_chunks);
    }

    /// A new empty batch writing `material` into this server's world.
    pub fn new_update(
        &self,
        material: BlockType,
        rate_limit: usize,
    ) -> Result<BasicMassBlockUpdate<World>, AppError> {
        Ok(BasicMassBlockUpdate::new(material, self.world.clone(), rate_limit)?)
    }

    /// Queues a border and registers it with the scheduler.
    ///
    /// # Returns
    ///
    /// The handle of the running batch.
    pub fn start_border(
        &mut self,
        shape: &dyn ColumnShape,
        request: BorderRequest,
        material: BlockType,
        rate_limit: usize,
        debug: bool,
    ) -> Result<UpdateHandle, AppError> {
        let mut border = BorderBlockUpdate::new(self.new_update(material, rate_limit)?);
        border.create_border(
            shape,
            request.center_x,
            request.center_z,
            request.radius,
            request.height,
        )?;

        let handle = if debug {
            border.run_debug(&mut self.scheduler)?
        } else {
            border.run(&mut self.scheduler)?
        };
        Ok(handle)
    }

    /// Registers any batch with the scheduler.
    pub fn start(&mut self, update: &mut dyn MassBlockUpdate, debug: bool) -> Result<UpdateHandle, AppError> {
        let handle = if debug {
            update.run_debug(&mut self.scheduler)?
        } else {
            update.run(&mut self.scheduler)?
        };
        Ok(handle)
    }

    /// Ticks until every batch is done.
    ///
    /// # Arguments
    ///
    /// * `period` - Length of one tick
    /// * `max_ticks` - Stop after this many ticks even if work remains
    ///
    /// # Returns
    ///
    /// The number of ticks run.
    pub fn run(&mut self, period: Duration, max_ticks: Option<u64>) -> u64 {
        self.scheduler.run_at_fixed_rate(period, max_ticks)
    }

    /// Advances the scheduler by one tick.
    pub fn tick(&mut self) {
        self.scheduler.tick();
    }

    /// The tick scheduler, for inspecting registered work.
    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::block_update::border::BorderShape;
    use crate::engine_state::task_management::task::TaskState;
    use crate::engine_state::voxels::world::{BlockPos, BlockWorld};
    use crate::error::BatchError;

    fn request(radius: i32, height: i32) -> BorderRequest {
        BorderRequest {
            center_x: 8,
            center_z: 8,
            radius,
            height,
        }
    }

    #[test]
    fn border_lands_on_flat_terrain() {
        let mut server = ServerState::new(&TerrainGenerator::Flat { height: 50 });
        server.load_area(8, 8, 1);

        let handle = server
            .start_border(&BorderShape::Square, request(4, 3), BlockType::STONE, 7, false)
            .unwrap();
        let ticks = server.run(Duration::ZERO, Some(1000));

        assert_eq!(ticks, (32u64 * 3).div_ceil(7));
        assert_eq!(handle.state(), TaskState::Completed);
        let world = server.world.get();
        assert_eq!(world.get_block_at(BlockPos::new(12, 50, 8)), BlockType::STONE);
        assert_eq!(world.get_block_at(BlockPos::new(12, 52, 8)), BlockType::STONE);
        assert_eq!(world.get_block_at(BlockPos::new(12, 53, 8)), BlockType::AIR);
        assert_eq!(world.get_block_at(BlockPos::new(8, 50, 8)), BlockType::AIR);
        assert_eq!(world.highest_block_y_at(4, 4), 53);
        assert!(world.dirty_chunks().is_empty());
    }

    #[test]
    fn rejects_zero_rate_limit() {
        let mut server = ServerState::new(&TerrainGenerator::Empty);
        let result = server.start_border(&BorderShape::Circle, request(2, 1), BlockType::STONE, 0, false);
        assert!(matches!(result, Err(AppError::Batch(BatchError::ZeroRateLimit))));
        assert!(server.scheduler().is_idle());
    }

    #[test]
    fn cancelled_border_stops_writing() {
        let mut server = ServerState::new(&TerrainGenerator::Flat { height: 10 });
        server.load_area(8, 8, 1);
        let handle = server
            .start_border(&BorderShape::Square, request(4, 4), BlockType::GLASS, 10, false)
            .unwrap();

        server.tick();
        assert!(handle.cancel());
        server.tick();

        assert_eq!(handle.state(), TaskState::Cancelled);
        assert!(handle.summary().is_none());
        assert!(server.scheduler().is_idle());
        assert!(!server.world.get().dirty_chunks().is_empty());
    }
}
