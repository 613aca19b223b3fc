//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x256x16 column of blocks that is
//! the unit of loading, mutation and client refresh in the world.
//!
//! ## Storage
//!
//! Each chunk keeps two parallel views of its blocks:
//! - `blocks`: one `BlockTypeSize` per cell, indexed `x + 16 * z + 256 * y`
//! - `solid_array`: a bit vector with one bit per cell, set for every non-air block
//!
//! The bit vector answers the common "is this solid" and "where is the surface"
//! questions without decoding block types.
//!
//! ## Refresh Tracking
//!
//! Every block change bumps the chunk revision. `refresh()` records the revision
//! that observers have been told about, so `is_dirty()` reports chunks whose
//! changes have not been pushed out yet.

use bitvec::prelude::BitVec;

use super::block::block_type::BlockType;
use super::block::BlockTypeSize;

pub(crate) mod chunk_creation;

pub use chunk_creation::ChunkBuilder;

/// The width and depth of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// log2 of `CHUNK_DIMENSION`; block to chunk coordinates is an arithmetic shift.
pub const CHUNK_SHIFT: i32 = 4;
/// The build limit. Valid block heights are `0..WORLD_HEIGHT`.
pub const WORLD_HEIGHT: i32 = 256;
/// The number of cells in one horizontal layer of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
/// The total number of cells in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * WORLD_HEIGHT as usize;

/// Position of a chunk column in chunk coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    /// Chunk x, equal to `block_x >> 4`.
    pub x: i32,
    /// Chunk z, equal to `block_z >> 4`.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk position from chunk coordinates.
    pub fn new(x: i32, z: i32) -> Self {
        ChunkPos { x, z }
    }

    /// Returns the chunk holding the block column at `(block_x, block_z)`.
    ///
    /// Uses an arithmetic shift so negative coordinates round toward negative
    /// infinity: block -1 lives in chunk -1, not chunk 0.
    pub fn containing(block_x: i32, block_z: i32) -> Self {
        ChunkPos {
            x: block_x >> CHUNK_SHIFT,
            z: block_z >> CHUNK_SHIFT,
        }
    }

    /// Block x of the chunk's western edge.
    pub fn min_block_x(&self) -> i32 {
        self.x << CHUNK_SHIFT
    }

    /// Block z of the chunk's northern edge.
    pub fn min_block_z(&self) -> i32 {
        self.z << CHUNK_SHIFT
    }
}

/// Converts a world block coordinate into the local offset inside its chunk.
pub fn local_coordinate(block: i32) -> usize {
    (block & (CHUNK_DIMENSION - 1)) as usize
}

/// A 16x256x16 column of voxel blocks.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub position: ChunkPos,

    /// One bit per cell, set where the block is not air.
    solid_array: BitVec,

    /// The material of every cell.
    blocks: Vec<BlockTypeSize>,

    /// Incremented on every block change.
    revision: u64,

    /// The revision observers were last refreshed with.
    refreshed_revision: u64,

    /// How many times `refresh()` has been called.
    refresh_count: u64,
}

impl Chunk {
    /// Creates a new chunk filled with air.
    pub fn empty(position: ChunkPos) -> Self {
        ChunkBuilder::new(position).return_chunk()
    }

    /// Creates a chunk whose terrain surface is `surface` everywhere.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `surface` - The first empty height above the ground
    pub fn flat(position: ChunkPos, surface: i32) -> Self {
        let mut builder = ChunkBuilder::new(position);
        for lz in 0..CHUNK_DIMENSION as usize {
            for lx in 0..CHUNK_DIMENSION as usize {
                builder.push_column(lx, lz, surface);
            }
        }
        builder.return_chunk()
    }

    pub(crate) fn from_parts(position: ChunkPos, solid_array: BitVec, blocks: Vec<BlockTypeSize>) -> Self {
        Chunk {
            position,
            solid_array,
            blocks,
            revision: 0,
            refreshed_revision: 0,
            refresh_count: 0,
        }
    }

    fn index(lx: usize, y: usize, lz: usize) -> usize {
        debug_assert!(lx < CHUNK_DIMENSION as usize && lz < CHUNK_DIMENSION as usize);
        debug_assert!(y < WORLD_HEIGHT as usize);
        lx + CHUNK_DIMENSION as usize * lz + CHUNK_PLANE_SIZE * y
    }

    /// Returns the material at the given chunk-local coordinates.
    pub fn get_block_at(&self, lx: usize, y: usize, lz: usize) -> BlockType {
        BlockType::get_block_type_from_int(self.blocks[Self::index(lx, y, lz)])
    }

    /// Checks if the block at the given chunk-local coordinates is solid.
    pub fn is_block_solid(&self, lx: usize, y: usize, lz: usize) -> bool {
        self.solid_array[Self::index(lx, y, lz)]
    }

    /// Writes `block_type` at the given chunk-local coordinates.
    ///
    /// Writing the material a cell already holds leaves the chunk untouched,
    /// so repeating a write is harmless.
    ///
    /// # Returns
    /// `true` if the cell changed.
    pub fn set_block_at(&mut self, lx: usize, y: usize, lz: usize, block_type: BlockType) -> bool {
        let index = Self::index(lx, y, lz);
        let value = block_type as BlockTypeSize;
        if self.blocks[index] == value {
            return false;
        }
        self.blocks[index] = value;
        self.solid_array.set(index, block_type.is_solid());
        self.revision += 1;
        true
    }

    /// Height of the topmost solid block in a column, or `None` if the column is all air.
    pub fn highest_solid_y(&self, lx: usize, lz: usize) -> Option<i32> {
        (0..WORLD_HEIGHT as usize)
            .rev()
            .find(|&y| self.is_block_solid(lx, y, lz))
            .map(|y| y as i32)
    }

    /// Number of solid blocks in the chunk.
    pub fn solid_count(&self) -> usize {
        self.solid_array.count_ones()
    }

    /// Marks the current contents as seen by observers.
    pub fn refresh(&mut self) {
        self.refreshed_revision = self.revision;
        self.refresh_count += 1;
    }

    /// Whether the chunk changed since the last refresh.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.refreshed_revision
    }

    /// How many times the chunk has been refreshed.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// The number of block changes applied to this chunk.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
