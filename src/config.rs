//! # Configuration
//!
//! JSON configuration for the border tool. Every field has a default, so an
//! empty object `{}` is a valid configuration.
//!
//! ```json
//! {
//!     "update": { "rate_limit": 500, "debug": true, "tick_period_ms": 50, "material": "stone" },
//!     "border": { "shape": "circle", "center_x": 0, "center_z": 0, "radius": 32, "height": 8 },
//!     "terrain": { "generator": { "method": "perlin", "base_height": 64, "amplitude": 12 } }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine_state::block_update::border::{BorderShape, MAX_BORDER_RADIUS};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{CHUNK_DIMENSION, WORLD_HEIGHT};
use crate::engine_state::voxels::world::TerrainGenerator;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rate limit and material of the batch.
    pub update: UpdateConfig,
    /// Shape and placement of the border.
    pub border: BorderConfig,
    /// World generation.
    pub terrain: TerrainConfig,
}

/// How the batch drains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Maximum blocks written per tick.
    pub rate_limit: usize,
    /// Print per-tick load statistics when the batch completes.
    pub debug: bool,
    /// Length of one tick in milliseconds.
    pub tick_period_ms: u64,
    /// Name of the block written, e.g. `"stone"`.
    pub material: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        UpdateConfig {
            rate_limit: 500,
            debug: false,
            tick_period_ms: 50,
            material: "stone".to_string(),
        }
    }
}

impl UpdateConfig {
    /// Resolves `material` to a block type.
    pub fn material(&self) -> Result<BlockType, ConfigError> {
        BlockType::from_name(&self.material)
            .ok_or_else(|| ConfigError::UnknownMaterial(self.material.clone()))
    }

    /// `tick_period_ms` as a duration.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

/// Where and how big the border is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// Outline of the border.
    pub shape: BorderShape,
    /// Column the border is centered on.
    pub center_x: i32,
    /// See `center_x`.
    pub center_z: i32,
    /// Distance from the center to the outline, at most `MAX_BORDER_RADIUS`.
    pub radius: i32,
    /// Blocks stacked on the terrain per column.
    pub height: i32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        BorderConfig {
            shape: BorderShape::Square,
            center_x: 0,
            center_z: 0,
            radius: 32,
            height: 8,
        }
    }
}

/// The world the border is built in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// How chunks are generated.
    pub generator: TerrainGenerator,
    /// Chunks loaded around the border center. Defaults to enough to cover the border.
    pub load_radius_chunks: Option<i32>,
}

impl AppConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update.rate_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "update.rate_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        self.update.material()?;
        if self.border.radius < 0 {
            return Err(ConfigError::Invalid {
                field: "border.radius",
                reason: format!("{} is negative", self.border.radius),
            });
        }
        if self.border.radius > MAX_BORDER_RADIUS {
            return Err(ConfigError::Invalid {
                field: "border.radius",
                reason: format!("{} exceeds the maximum of {}", self.border.radius, MAX_BORDER_RADIUS),
            });
        }
        let radius = self.border.radius;
        for (field, center) in [
            ("border.center_x", self.border.center_x),
            ("border.center_z", self.border.center_z),
        ] {
            if center.checked_add(radius).is_none() || center.checked_sub(radius).is_none() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} +/- radius {} leaves the block range", center, radius),
                });
            }
        }
        if !(0..=WORLD_HEIGHT).contains(&self.border.height) {
            return Err(ConfigError::Invalid {
                field: "border.height",
                reason: format!("{} is outside 0..={}", self.border.height, WORLD_HEIGHT),
            });
        }
        let max_chunks = MAX_BORDER_RADIUS / CHUNK_DIMENSION + 1;
        if matches!(self.terrain.load_radius_chunks, Some(radius) if !(0..=max_chunks).contains(&radius)) {
            return Err(ConfigError::Invalid {
                field: "terrain.load_radius_chunks",
                reason: format!("must be within 0..={}", max_chunks),
            });
        }
        Ok(())
    }

    /// Chunk radius to load so the whole border lands in loaded chunks.
    pub fn load_radius_chunks(&self) -> i32 {
        self.terrain
            .load_radius_chunks
            .unwrap_or(self.border.radius / CHUNK_DIMENSION + 1)
    }
}
