//! # Block Module
//!
//! Block materials and their compact in-memory representation.

pub mod block_type;

/// The underlying integer type used to represent block types in chunk memory.
pub type BlockTypeSize = u8;
