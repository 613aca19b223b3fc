//! # Border Producers
//!
//! Fills a mass block update with a wall standing on the terrain around a
//! center point.
//!
//! The outline of the wall is chosen by a `ColumnShape`, which yields ground
//! column offsets relative to the center. For every column the wall starts at
//! the terrain surface and rises `height` blocks, stopping at the build limit.

use serde::{Deserialize, Serialize};

use super::{BasicMassBlockUpdate, MassBlockUpdate, UpdateHandle};
use crate::engine_state::task_management::TickScheduler;
use crate::engine_state::voxels::chunk::{ChunkPos, WORLD_HEIGHT};
use crate::engine_state::voxels::world::BlockWorld;
use crate::error::{BatchError, EnqueueError};

/// A ground column offset `(dx, dz)` from the border center.
pub type Column = (i32, i32);

/// Largest border radius a producer accepts, the horizontal extent of a standard world.
pub const MAX_BORDER_RADIUS: i32 = 30_000_000;

/// Produces the outline of a border.
pub trait ColumnShape {
    /// Column offsets of a border with the given radius. Empty for a negative radius.
    fn columns(&self, radius: i32) -> Vec<Column>;
}

/// The outline of an axis-aligned square: every column with `max(|dx|, |dz|) == radius`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Square;

impl ColumnShape for Square {
    fn columns(&self, radius: i32) -> Vec<Column> {
        if radius < 0 {
            return Vec::new();
        }
        if radius == 0 {
            return vec![(0, 0)];
        }

        let mut columns = Vec::with_capacity(8 * radius as usize);
        for d in -radius..=radius {
            columns.push((d, -radius));
            columns.push((d, radius));
        }
        for d in -radius + 1..radius {
            columns.push((-radius, d));
            columns.push((radius, d));
        }
        columns
    }
}

/// A rasterized circle from the integer midpoint algorithm.
///
/// Each step plots one point per quadrant, so the outline is closed under
/// rotation by 90 degrees and contains no duplicates.
#[derive(Copy, Clone, Debug, Default)]
pub struct Circle;

impl ColumnShape for Circle {
    fn columns(&self, radius: i32) -> Vec<Column> {
        if radius < 0 {
            return Vec::new();
        }
        if radius == 0 {
            return vec![(0, 0)];
        }

        // |x|, |z| <= radius, so only the error term needs the wider type.
        let mut columns = Vec::new();
        let mut x = -radius;
        let mut z = 0;
        let mut err: i64 = 2 - 2 * radius as i64;

        while x < 0 {
            columns.push((-x, z));
            columns.push((-z, -x));
            columns.push((x, -z));
            columns.push((z, x));

            let step = err;
            if step <= z as i64 {
                z += 1;
                err += z as i64 * 2 + 1;
            }
            if step > x as i64 || err > z as i64 {
                x += 1;
                err += x as i64 * 2 + 1;
            }
        }
        columns
    }
}

/// A shape defined by a closure.
pub struct CustomShape<F>(pub F);

impl<F: Fn(i32) -> Vec<Column>> ColumnShape for CustomShape<F> {
    fn columns(&self, radius: i32) -> Vec<Column> {
        (self.0)(radius)
    }
}

/// The built-in shapes, as named in configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderShape {
    /// See `Square`.
    #[default]
    Square,
    /// See `Circle`.
    Circle,
}

impl ColumnShape for BorderShape {
    fn columns(&self, radius: i32) -> Vec<Column> {
        match self {
            BorderShape::Square => Square.columns(radius),
            BorderShape::Circle => Circle.columns(radius),
        }
    }
}

/// A mass block update that knows how to lay out borders.
pub struct BorderBlockUpdate<W: BlockWorld> {
    update: BasicMassBlockUpdate<W>,
}

impl<W: BlockWorld + 'static> BorderBlockUpdate<W> {
    /// Wraps an existing batch.
    pub fn new(update: BasicMassBlockUpdate<W>) -> Self {
        BorderBlockUpdate { update }
    }

    /// Queues a border of the given shape.
    ///
    /// # Arguments
    /// * `shape` - Outline of the border
    /// * `center_x`, `center_z` - Column the border is centered on
    /// * `radius` - Distance from the center to the outline
    /// * `height` - Number of blocks stacked on the terrain at each column
    ///
    /// # Returns
    /// The number of blocks queued.
    ///
    /// # Errors
    /// `RadiusTooLarge` above `MAX_BORDER_RADIUS` and `ColumnOutOfRange` if a
    /// column falls outside the `i32` range. Nothing is queued in either case.
    pub fn create_border(
        &mut self,
        shape: &dyn ColumnShape,
        center_x: i32,
        center_z: i32,
        radius: i32,
        height: i32,
    ) -> Result<usize, EnqueueError> {
        if radius > MAX_BORDER_RADIUS {
            return Err(EnqueueError::RadiusTooLarge {
                radius,
                max: MAX_BORDER_RADIUS,
            });
        }

        let columns = shape
            .columns(radius)
            .into_iter()
            .map(|(dx, dz)| match (center_x.checked_add(dx), center_z.checked_add(dz)) {
                (Some(x), Some(z)) => Ok((x, z)),
                _ => Err(EnqueueError::ColumnOutOfRange {
                    center_x,
                    center_z,
                    dx,
                    dz,
                }),
            })
            .collect::<Result<Vec<Column>, EnqueueError>>()?;

        let mut queued = 0;
        for (x, z) in columns {
            let (surface, chunk) = {
                let world = self.update.world().get();
                let surface = world.highest_block_y_at(x, z).max(0);
                (surface, world.chunk_containing(x, surface, z))
            };
            self.update.add_chunk(chunk);

            let top = surface.saturating_add(height.max(0)).min(WORLD_HEIGHT);
            for y in surface..top {
                self.update.add_block(x, y, z)?;
                queued += 1;
            }
        }

        log::debug!(
            "Queued {} blocks for a border of radius {} around ({}, {})",
            queued,
            radius,
            center_x,
            center_z
        );
        Ok(queued)
    }

    /// Queues a square border.
    pub fn create_square_border(
        &mut self,
        center_x: i32,
        center_z: i32,
        radius: i32,
        height: i32,
    ) -> Result<usize, EnqueueError> {
        self.create_border(&Square, center_x, center_z, radius, height)
    }

    /// Queues a circular border.
    pub fn create_circular_border(
        &mut self,
        center_x: i32,
        center_z: i32,
        radius: i32,
        height: i32,
    ) -> Result<usize, EnqueueError> {
        self.create_border(&Circle, center_x, center_z, radius, height)
    }

    /// The wrapped batch.
    pub fn inner(&self) -> &BasicMassBlockUpdate<W> {
        &self.update
    }

    /// Unwraps the batch.
    pub fn into_inner(self) -> BasicMassBlockUpdate<W> {
        self.update
    }
}

impl<W: BlockWorld + 'static> MassBlockUpdate for BorderBlockUpdate<W> {
    fn add_block_and_chunk(&mut self, x: i32, y: i32, z: i32) -> Result<(), EnqueueError> {
        self.update.add_block_and_chunk(x, y, z)
    }

    fn add_block(&mut self, x: i32, y: i32, z: i32) -> Result<(), EnqueueError> {
        self.update.add_block(x, y, z)
    }

    fn add_block_f64(&mut self, x: f64, y: f64, z: f64) -> Result<(), EnqueueError> {
        self.update.add_block_f64(x, y, z)
    }

    fn add_chunk(&mut self, chunk: ChunkPos) {
        self.update.add_chunk(chunk)
    }

    fn run(&mut self, scheduler: &mut TickScheduler) -> Result<UpdateHandle, BatchError> {
        self.update.run(scheduler)
    }

    fn run_debug(&mut self, scheduler: &mut TickScheduler) -> Result<UpdateHandle, BatchError> {
        self.update.run_debug(scheduler)
    }
}
