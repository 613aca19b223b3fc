//! # Chunk Creation Module
//!
//! A builder that fills a chunk one terrain column at a time while keeping the
//! block storage and the solidity bit vector in step.

use bitvec::prelude::BitVec;

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::{Chunk, ChunkPos, CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_VOLUME, WORLD_HEIGHT};

/// Thickness of the dirt layer under the grass surface.
const DIRT_DEPTH: i32 = 3;

/// Builds a `Chunk` from terrain columns.
///
/// The builder starts with an all-air chunk. Every pushed column is layered
/// bottom to top as bedrock, stone, dirt and a grass surface.
pub struct ChunkBuilder {
    position: ChunkPos,
    solid_array: BitVec,
    blocks: Vec<BlockTypeSize>,
}

impl ChunkBuilder {
    /// Creates a builder for the chunk at `position`.
    pub fn new(position: ChunkPos) -> Self {
        let mut solid_array = BitVec::with_capacity(CHUNK_VOLUME);
        solid_array.resize(CHUNK_VOLUME, false);
        ChunkBuilder {
            position,
            solid_array,
            blocks: vec![BlockType::AIR as BlockTypeSize; CHUNK_VOLUME],
        }
    }

    /// Fills the column at local `(lx, lz)` so that `surface` is its first empty cell.
    ///
    /// `surface` is clamped to the world height; a surface of zero leaves the
    /// column empty.
    pub fn push_column(&mut self, lx: usize, lz: usize, surface: i32) {
        let surface = surface.clamp(0, WORLD_HEIGHT);
        for y in 0..surface {
            let block_type = if y == 0 {
                BlockType::BEDROCK
            } else if y == surface - 1 {
                BlockType::GRASS
            } else if y >= surface - 1 - DIRT_DEPTH {
                BlockType::DIRT
            } else {
                BlockType::STONE
            };
            let index = lx + CHUNK_DIMENSION as usize * lz + CHUNK_PLANE_SIZE * y as usize;
            self.blocks[index] = block_type as BlockTypeSize;
            self.solid_array.set(index, true);
        }
    }

    /// Finalizes the chunk.
    pub fn return_chunk(self) -> Chunk {
        Chunk::from_parts(self.position, self.solid_array, self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_layers() {
        let mut builder = ChunkBuilder::new(ChunkPos::new(0, 0));
        builder.push_column(0, 0, 10);
        let chunk = builder.return_chunk();

        assert_eq!(chunk.get_block_at(0, 0, 0), BlockType::BEDROCK);
        assert_eq!(chunk.get_block_at(0, 5, 0), BlockType::STONE);
        assert_eq!(chunk.get_block_at(0, 6, 0), BlockType::DIRT);
        assert_eq!(chunk.get_block_at(0, 8, 0), BlockType::DIRT);
        assert_eq!(chunk.get_block_at(0, 9, 0), BlockType::GRASS);
        assert_eq!(chunk.get_block_at(0, 10, 0), BlockType::AIR);
        assert_eq!(chunk.highest_solid_y(1, 0), None);
    }

    #[test]
    fn surface_is_clamped_to_world_height() {
        let mut builder = ChunkBuilder::new(ChunkPos::new(0, 0));
        builder.push_column(2, 2, 1000);
        let chunk = builder.return_chunk();
        assert_eq!(chunk.highest_solid_y(2, 2), Some(WORLD_HEIGHT - 1));
    }
}
