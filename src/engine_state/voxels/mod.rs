//! # Voxel World
//!
//! The in-memory world that block updates are written into.
//!
//! * **Block**: block materials and their compact storage type
//! * **Chunk**: 16x256x16 columns of blocks, the unit of loading and refresh
//! * **World**: the sparse collection of loaded chunks and the `BlockWorld`
//!   trait the block update machinery writes through
//!
//! ## Data Flow
//!
//! 1. Producers ask the world for terrain heights and owning chunks
//! 2. The drain task writes blocks through `BlockWorld::set_block`
//! 3. Once a batch is done every touched chunk is refreshed

pub mod block;
pub mod chunk;
pub mod world;
