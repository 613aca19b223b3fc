#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! # Mass Block Update
//!
//! Rate limited bulk block writes for a tick driven voxel world.
//!
//! Producers queue block positions and the chunks they touch into a batch.
//! When the batch is started it registers a task with the tick scheduler that
//! writes at most `rate_limit` blocks per tick, so no single tick stalls. Once
//! every block is written the touched chunks are refreshed exactly once.
//!
//! ## Key Modules
//!
//! * `core` - Shared single-threaded resource handles
//! * `engine_state` - The world, the tick scheduler and the mass block update itself
//! * `config` - JSON configuration for the border tool
//! * `error` - Error enums for every fallible operation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mass_block_update::config::AppConfig;
//!
//! mass_block_update::init_logging();
//! let config = AppConfig::load("border.json").unwrap();
//! let summary = mass_block_update::run(&config).unwrap();
//! println!("{:?}", summary);
//! ```

use config::AppConfig;
use engine_state::block_update::completion::UpdateSummary;
use engine_state::{BorderRequest, ServerState};
use error::AppError;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

#[cfg(test)]
pub(crate) mod test_utils;

/// Installs the stdout logger, filtered by `RUST_LOG`.
///
/// Calling it more than once is harmless; later calls leave the first logger in place.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if initialized {
        log::info!("Logger initialized");
    }
}

/// Builds the configured border in a freshly generated world and ticks until it is done.
///
/// # Returns
///
/// The summary of the finished batch, or `None` if it did not complete.
pub fn run(config: &AppConfig) -> Result<Option<UpdateSummary>, AppError> {
    config.validate()?;

    let mut server = ServerState::new(&config.terrain.generator);
    server.load_area(
        config.border.center_x,
        config.border.center_z,
        config.load_radius_chunks(),
    );

    let request = BorderRequest {
        center_x: config.border.center_x,
        center_z: config.border.center_z,
        radius: config.border.radius,
        height: config.border.height,
    };
    let handle = server.start_border(
        &config.border.shape,
        request,
        config.update.material()?,
        config.update.rate_limit,
        config.update.debug,
    )?;

    let ticks = server.run(config.update.tick_period(), None);
    log::info!("Tick loop idle after {} ticks ({:?})", ticks, handle.state());

    Ok(handle.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::world::TerrainGenerator;

    #[test]
    fn run_builds_a_circle_in_a_flat_world() {
        let mut config = AppConfig::default();
        config.update.tick_period_ms = 0;
        config.update.rate_limit = 64;
        config.update.debug = true;
        config.border.shape = engine_state::block_update::border::BorderShape::Circle;
        config.border.radius = 20;
        config.border.height = 4;
        config.terrain.generator = TerrainGenerator::Flat { height: 30 };

        let summary = run(&config).unwrap().unwrap();
        assert!(summary.applied > 0);
        assert_eq!(summary.applied % 4, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.debug.is_some());
    }

    #[test]
    fn run_rejects_a_border_at_the_edge_of_the_block_range() {
        let mut config = AppConfig::default();
        config.border.center_x = i32::MAX;
        config.border.radius = 2;
        config.border.height = 1;
        assert!(matches!(
            run(&config),
            Err(AppError::Config(crate::error::ConfigError::Invalid { field: "border.center_x", .. }))
        ));
    }

    #[test]
    fn run_rejects_an_invalid_config() {
        let mut config = AppConfig::default();
        config.update.material = "unobtainium".to_string();
        assert!(matches!(run(&config), Err(AppError::Config(_))));
    }
}
