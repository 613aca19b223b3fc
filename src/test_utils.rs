//! Shared helpers for unit tests.

use std::collections::{HashMap, HashSet};

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::ChunkPos;
use crate::engine_state::voxels::world::{BlockPos, BlockWorld};
use crate::error::MutationError;

/// A world that records every call instead of storing blocks.
///
/// Terrain is flat at `default_height` unless overridden per column, and
/// writes to positions passed to `reject` fail.
pub struct RecordingWorld {
    pub default_height: i32,
    pub heights: HashMap<(i32, i32), i32>,
    pub writes: Vec<(BlockPos, BlockType)>,
    pub refreshes: Vec<ChunkPos>,
    rejected: HashSet<BlockPos>,
}

impl RecordingWorld {
    pub fn new(default_height: i32) -> Self {
        RecordingWorld {
            default_height,
            heights: HashMap::new(),
            writes: Vec::new(),
            refreshes: Vec::new(),
            rejected: HashSet::new(),
        }
    }

    pub fn set_height(&mut self, x: i32, z: i32, height: i32) {
        self.heights.insert((x, z), height);
    }

    pub fn reject(&mut self, position: BlockPos) {
        self.rejected.insert(position);
    }
}

impl BlockWorld for RecordingWorld {
    fn highest_block_y_at(&self, x: i32, z: i32) -> i32 {
        self.heights.get(&(x, z)).copied().unwrap_or(self.default_height)
    }

    fn refresh_chunk(&mut self, chunk: ChunkPos) {
        self.refreshes.push(chunk);
    }

    fn set_block(&mut self, position: BlockPos, block_type: BlockType) -> Result<(), MutationError> {
        if self.rejected.contains(&position) {
            return Err(MutationError::UnsupportedMaterial(block_type.to_string()));
        }
        self.writes.push((position, block_type));
        Ok(())
    }
}
