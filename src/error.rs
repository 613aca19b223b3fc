//! # Error Types
//!
//! Every fallible operation in the crate reports one of the enums below.
//!
//! * `EnqueueError` - a producer handed the batch a coordinate it can never apply
//! * `MutationError` - the world refused a single block write while draining
//! * `BatchError` - a batch was misconfigured or started twice
//! * `ConfigError` - the JSON configuration could not be loaded
//! * `AppError` - anything that stops the command line tool
//!
//! Producer errors are returned straight to the caller. Mutation errors never
//! leave the tick scheduler: the drain task logs them and moves on to the next
//! queued block.

use std::io;

use thiserror::Error;

use crate::engine_state::voxels::chunk::ChunkPos;

/// Rejected enqueue request.
#[derive(Debug, Error, PartialEq)]
pub enum EnqueueError {
    /// A fractional coordinate was NaN or infinite.
    #[error("coordinate {axis} is not finite ({value})")]
    NonFinite {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
        /// The offending value.
        value: f64,
    },

    /// A fractional coordinate does not fit into a block coordinate.
    #[error("coordinate {axis} = {value} is outside the addressable block range")]
    OutOfRange {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
        /// The offending value.
        value: f64,
    },

    /// A border column lies outside the `i32` block range.
    #[error("column ({center_x} + {dx}, {center_z} + {dz}) is outside the addressable block range")]
    ColumnOutOfRange {
        /// Border center.
        center_x: i32,
        /// Border center.
        center_z: i32,
        /// Column offset from the center.
        dx: i32,
        /// Column offset from the center.
        dz: i32,
    },

    /// A border radius beyond the supported maximum.
    #[error("border radius {radius} exceeds the maximum of {max}")]
    RadiusTooLarge {
        /// Requested radius.
        radius: i32,
        /// Largest accepted radius.
        max: i32,
    },

    /// The block lies below the world floor or above the build limit.
    #[error("y = {y} is outside the world height range 0..{height}")]
    OutsideWorld {
        /// Requested block height.
        y: i32,
        /// World build limit.
        height: i32,
    },
}

/// A single block write that could not be applied.
#[derive(Debug, Error, PartialEq)]
pub enum MutationError {
    /// The chunk that should hold the block is not loaded.
    #[error("chunk ({}, {}) is not loaded", .0.x, .0.z)]
    ChunkNotLoaded(ChunkPos),

    /// The block lies outside the vertical range of the world.
    #[error("y = {0} is outside the world")]
    OutsideWorld(i32),

    /// The world does not accept the requested material.
    #[error("material {0} is not supported by this world")]
    UnsupportedMaterial(String),
}

/// Misuse of a batch.
#[derive(Debug, Error, PartialEq)]
pub enum BatchError {
    /// A rate limit of zero would never drain anything.
    #[error("rate limit must be at least one block per tick")]
    ZeroRateLimit,

    /// `run`/`run_debug` was called a second time.
    #[error("the batch has already been started")]
    AlreadyStarted,
}

/// Failure while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid JSON for `AppConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The material name is not known.
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    /// A value is syntactically valid but semantically wrong.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Top-level failure of the border tool.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The batch could not be started.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// The border produced an unusable coordinate.
    #[error("failed to queue border: {0}")]
    Enqueue(#[from] EnqueueError),
}
