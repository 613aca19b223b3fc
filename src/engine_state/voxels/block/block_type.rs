//! # Block Type Module
//!
//! This module defines the materials a block can hold and how they are named in
//! configuration files.

use std::fmt;

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all materials a block in the world can be made of.
///
/// The discriminant is the compact value stored in chunk memory. The
/// `FromPrimitive` derive converts it back when reading chunk data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Writing air removes a block.
    AIR,

    /// Plain stone, the default border material.
    STONE,

    /// Dirt found just below the surface.
    DIRT,

    /// The surface block of generated terrain.
    GRASS,

    /// The indestructible floor of the world.
    BEDROCK,

    /// A transparent block, useful for see-through borders.
    GLASS,

    /// Wooden planks.
    WOOD,
}

/// Lookup table from configuration names to materials.
static BLOCK_TYPE_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::AIR,
    "stone" => BlockType::STONE,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "bedrock" => BlockType::BEDROCK,
    "glass" => BlockType::GLASS,
    "wood" => BlockType::WOOD,
};

impl BlockType {
    /// Converts a stored `BlockTypeSize` back into a `BlockType`.
    ///
    /// Unknown values read as `AIR`; chunk storage only ever holds values
    /// written through `BlockType` so this does not happen in practice.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Resolves a case-insensitive material name such as `"stone"`.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_NAMES
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// The lowercase name used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            BlockType::AIR => "air",
            BlockType::STONE => "stone",
            BlockType::DIRT => "dirt",
            BlockType::GRASS => "grass",
            BlockType::BEDROCK => "bedrock",
            BlockType::GLASS => "glass",
            BlockType::WOOD => "wood",
        }
    }

    /// Whether the block occupies its cell. Only air is not solid.
    pub fn is_solid(&self) -> bool {
        *self != BlockType::AIR
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
