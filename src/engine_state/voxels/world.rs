//! # World Module
//!
//! This module provides the `World` struct, which manages the loaded chunks of the
//! voxel world, and the `BlockWorld` trait, which is the only view of a world
//! the block update machinery relies on.
//!
//! ## Architecture
//!
//! The world uses sparse storage: only chunks that were explicitly loaded are kept
//! in memory. Terrain heights of columns in unloaded chunks are still answered
//! from the terrain generator so producers can plan work before loading.
//!
//! ## Chunk Generation
//!
//! Several terrain generation strategies are supported:
//! - Perlin noise height map for natural-looking terrain
//! - Flat terrain at a fixed height
//! - Empty chunks (all blocks air)

use std::collections::HashMap;

use cgmath::Point3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::block::block_type::BlockType;
use super::chunk::{local_coordinate, Chunk, ChunkBuilder, ChunkPos, CHUNK_DIMENSION, WORLD_HEIGHT};
use crate::error::MutationError;

/// A block position in world coordinates.
pub type BlockPos = Point3<i32>;

/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// The capabilities a world must offer to have blocks written into it in bulk.
///
/// Lookups are used by producers while filling a batch; `set_block` and
/// `refresh_chunk` are used while the batch drains.
pub trait BlockWorld {
    /// Y of the first empty cell above the terrain at column `(x, z)`.
    ///
    /// Pillars built on the terrain start at this height.
    fn highest_block_y_at(&self, x: i32, z: i32) -> i32;

    /// The chunk holding the block at `(x, y, z)`.
    fn chunk_containing(&self, x: i32, _y: i32, z: i32) -> ChunkPos {
        ChunkPos::containing(x, z)
    }

    /// Tells observers that `chunk` changed.
    fn refresh_chunk(&mut self, chunk: ChunkPos);

    /// Writes `block_type` at `position`.
    ///
    /// Writing the same block twice must leave the world as a single write would.
    fn set_block(&mut self, position: BlockPos, block_type: BlockType) -> Result<(), MutationError>;
}

/// The method used to generate new chunks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum TerrainGenerator {
    /// Every block is air.
    Empty,
    /// The surface sits at `height` everywhere.
    Flat {
        /// First empty cell above the ground.
        height: i32,
    },
    /// Rolling hills from 2D Perlin noise.
    Perlin {
        /// Noise seed. A random seed is chosen when missing.
        #[serde(default)]
        seed: Option<u32>,
        /// Average surface height.
        base_height: i32,
        /// Maximum deviation from `base_height`.
        amplitude: i32,
    },
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        TerrainGenerator::Perlin {
            seed: None,
            base_height: 64,
            amplitude: 12,
        }
    }
}

/// Terrain generator with its noise source prepared.
enum Generator {
    Empty,
    Flat(i32),
    Perlin {
        perlin: Perlin,
        base_height: i32,
        amplitude: i32,
    },
}

impl Generator {
    fn new(method: &TerrainGenerator) -> Self {
        match method {
            TerrainGenerator::Empty => Generator::Empty,
            TerrainGenerator::Flat { height } => Generator::Flat(*height),
            TerrainGenerator::Perlin {
                seed,
                base_height,
                amplitude,
            } => {
                let seed = seed.unwrap_or_else(|| fastrand::u32(..));
                log::debug!("Perlin terrain seed: {}", seed);
                Generator::Perlin {
                    perlin: Perlin::new(seed),
                    base_height: *base_height,
                    amplitude: *amplitude,
                }
            }
        }
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        let height = match self {
            Generator::Empty => 0,
            Generator::Flat(height) => *height,
            Generator::Perlin {
                perlin,
                base_height,
                amplitude,
            } => {
                let sample = perlin.get([x as f64 * PERLIN_SCALE_FACTOR, z as f64 * PERLIN_SCALE_FACTOR]);
                base_height + (sample * *amplitude as f64).round() as i32
            }
        };
        height.clamp(0, WORLD_HEIGHT)
    }
}

/// Represents a voxel world composed of chunk columns.
///
/// # Examples
///
/// ```
/// use mass_block_update::engine_state::voxels::chunk::ChunkPos;
/// use mass_block_update::engine_state::voxels::world::{TerrainGenerator, World};
///
/// let mut world = World::new(&TerrainGenerator::Flat { height: 60 });
/// world.add_chunk_at(ChunkPos::new(0, 0));
/// assert!(world.get_chunk_at(ChunkPos::new(0, 0)).is_some());
/// ```
pub struct World {
    /// Loaded chunks by chunk position.
    pub chunks: HashMap<ChunkPos, Chunk>,
    generator: Generator,
}

impl World {
    /// Creates a new world with no chunks loaded.
    pub fn new(method: &TerrainGenerator) -> Self {
        World {
            chunks: HashMap::new(),
            generator: Generator::new(method),
        }
    }

    /// Generates and stores the chunk at `position` if it is not loaded yet.
    pub fn add_chunk_at(&mut self, position: ChunkPos) {
        if self.chunks.contains_key(&position) {
            return;
        }

        let chunk = match self.generator {
            Generator::Empty => Chunk::empty(position),
            _ => {
                let mut builder = ChunkBuilder::new(position);
                for lz in 0..CHUNK_DIMENSION {
                    for lx in 0..CHUNK_DIMENSION {
                        let surface = self.generator.surface_height(
                            position.min_block_x() + lx,
                            position.min_block_z() + lz,
                        );
                        builder.push_column(lx as usize, lz as usize, surface);
                    }
                }
                builder.return_chunk()
            }
        };

        self.chunks.insert(position, chunk);
    }

    /// Loads every chunk within `radius` chunks of the chunk holding `(block_x, block_z)`.
    pub fn load_area(&mut self, block_x: i32, block_z: i32, radius: i32) {
        let center = ChunkPos::containing(block_x, block_z);
        for x in center.x - radius..=center.x + radius {
            for z in center.z - radius..=center.z + radius {
                self.add_chunk_at(ChunkPos::new(x, z));
            }
        }
        log::info!(
            "Loaded {} chunks around ({}, {})",
            self.chunks.len(),
            block_x,
            block_z
        );
    }

    /// Returns the chunk at `pos` if it is loaded.
    pub fn get_chunk_at(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Returns the material at `position`; unloaded and out-of-world cells read as air.
    pub fn get_block_at(&self, position: BlockPos) -> BlockType {
        if !(0..WORLD_HEIGHT).contains(&position.y) {
            return BlockType::AIR;
        }
        match self.get_chunk_at(ChunkPos::containing(position.x, position.z)) {
            Some(chunk) => chunk.get_block_at(
                local_coordinate(position.x),
                position.y as usize,
                local_coordinate(position.z),
            ),
            None => BlockType::AIR,
        }
    }

    /// Chunks with changes that have not been refreshed.
    pub fn dirty_chunks(&self) -> Vec<ChunkPos> {
        let mut dirty: Vec<ChunkPos> = self
            .chunks
            .values()
            .filter(|chunk| chunk.is_dirty())
            .map(|chunk| chunk.position)
            .collect();
        dirty.sort();
        dirty
    }
}

impl BlockWorld for World {
    fn highest_block_y_at(&self, x: i32, z: i32) -> i32 {
        match self.get_chunk_at(ChunkPos::containing(x, z)) {
            Some(chunk) => chunk
                .highest_solid_y(local_coordinate(x), local_coordinate(z))
                .map_or(0, |y| y + 1),
            None => self.generator.surface_height(x, z),
        }
    }

    fn refresh_chunk(&mut self, chunk: ChunkPos) {
        match self.chunks.get_mut(&chunk) {
            Some(loaded) => loaded.refresh(),
            None => log::debug!("Skipping refresh of unloaded chunk ({}, {})", chunk.x, chunk.z),
        }
    }

    fn set_block(&mut self, position: BlockPos, block_type: BlockType) -> Result<(), MutationError> {
        if !(0..WORLD_HEIGHT).contains(&position.y) {
            return Err(MutationError::OutsideWorld(position.y));
        }
        let chunk_pos = ChunkPos::containing(position.x, position.z);
        let chunk = self
            .chunks
            .get_mut(&chunk_pos)
            .ok_or(MutationError::ChunkNotLoaded(chunk_pos))?;
        chunk.set_block_at(
            local_coordinate(position.x),
            position.y as usize,
            local_coordinate(position.z),
            block_type,
        );
        Ok(())
    }
}
