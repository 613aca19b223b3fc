//! # Core Module
//!
//! Shared-ownership primitives used by the rest of the crate.
//!
//! Everything in this crate runs on the tick thread, so the only container
//! needed is `StResource`: a reference-counted cell that lets the batch,
//! its drain task and the task handle see the same queue, world and state.
//!
//! ## Usage
//! ```rust
//! use mass_block_update::core::StResource;
//!
//! let counter = StResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod st_resource;

pub use st_resource::StResource;
