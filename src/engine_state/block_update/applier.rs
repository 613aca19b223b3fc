//! # Mutation Applier
//!
//! The single-block write step of a drain.

use crate::core::StResource;
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::world::{BlockPos, BlockWorld};
use crate::error::MutationError;

/// Writes the batch material into the world, one position at a time.
///
/// The material and world are fixed when the batch starts draining.
pub struct MutationApplier<W: BlockWorld> {
    world: StResource<W>,
    material: BlockType,
}

impl<W: BlockWorld> MutationApplier<W> {
    /// Creates an applier writing `material` into `world`.
    pub fn new(world: StResource<W>, material: BlockType) -> Self {
        MutationApplier { world, material }
    }

    /// Sets the block at `position` to the batch material.
    pub fn apply(&self, position: BlockPos) -> Result<(), MutationError> {
        self.world.get_mut().set_block(position, self.material)
    }

    /// The material every write uses.
    pub fn material(&self) -> BlockType {
        self.material
    }
}
