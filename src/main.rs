//! # Mass Block Update Border Tool
//!
//! Generates a world, builds the configured border through a rate limited
//! mass block update and reports the outcome.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- border.json
//! ```
//!
//! Without an argument the built-in defaults are used.

use mass_block_update::config::AppConfig;
use mass_block_update::error::AppError;

fn main() {
    mass_block_update::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path),
        None => Ok(AppConfig::default()),
    };

    let result = config
        .map_err(AppError::from)
        .and_then(|config| mass_block_update::run(&config));

    match result {
        Ok(Some(summary)) => log::info!(
            "Border complete: {} blocks written, {} skipped, {} chunks refreshed",
            summary.applied,
            summary.failed,
            summary.chunks_refreshed
        ),
        Ok(None) => log::warn!("Border update stopped before completing"),
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    }
}
