use std::time::Duration;

use mass_block_update::config::AppConfig;
use mass_block_update::engine_state::block_update::border::{BorderBlockUpdate, BorderShape, Circle};
use mass_block_update::engine_state::block_update::MassBlockUpdate;
use mass_block_update::engine_state::task_management::task::TaskState;
use mass_block_update::engine_state::voxels::block::block_type::BlockType;
use mass_block_update::engine_state::voxels::chunk::ChunkPos;
use mass_block_update::engine_state::voxels::world::{BlockPos, BlockWorld, TerrainGenerator};
use mass_block_update::engine_state::{BorderRequest, ServerState};
use mass_block_update::error::{AppError, BatchError};

#[test]
fn circular_border_follows_perlin_terrain() {
    let generator = TerrainGenerator::Perlin {
        seed: Some(42),
        base_height: 70,
        amplitude: 10,
    };
    let mut server = ServerState::new(&generator);
    server.load_area(0, 0, 2);

    let surfaces: Vec<(i32, i32, i32)> = {
        let world = server.world.get();
        [(12, 0), (0, 12), (-12, 0), (0, -12)]
            .iter()
            .map(|&(x, z)| (x, z, world.highest_block_y_at(x, z)))
            .collect()
    };

    let request = BorderRequest {
        center_x: 0,
        center_z: 0,
        radius: 12,
        height: 5,
    };
    let handle = server
        .start_border(&BorderShape::Circle, request, BlockType::GLASS, 50, false)
        .unwrap();
    server.run(Duration::ZERO, None);

    assert_eq!(handle.state(), TaskState::Completed);
    let summary = handle.summary().unwrap();
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.chunks_refreshed, 4);

    let world = server.world.get();
    for (x, z, surface) in surfaces {
        for y in surface..surface + 5 {
            assert_eq!(world.get_block_at(BlockPos::new(x, y, z)), BlockType::GLASS);
        }
        assert_eq!(world.highest_block_y_at(x, z), surface + 5);
    }
    assert!(world.dirty_chunks().is_empty());
}

#[test]
fn two_batches_share_the_tick_loop() {
    let mut server = ServerState::new(&TerrainGenerator::Flat { height: 20 });
    server.load_area(0, 0, 1);

    let mut walls = server.new_update(BlockType::WOOD, 5).unwrap();
    for x in 0..12 {
        walls.add_block_and_chunk(x, 20, 3).unwrap();
    }
    let mut ring = BorderBlockUpdate::new(server.new_update(BlockType::STONE, 100).unwrap());
    ring.create_border(&Circle, 0, 0, 6, 1).unwrap();

    let walls_handle = server.start(&mut walls, false).unwrap();
    let ring_handle = server.start(&mut ring, true).unwrap();

    server.tick();
    assert_eq!(ring_handle.state(), TaskState::Completed);
    assert_eq!(walls_handle.state(), TaskState::Running);

    server.run(Duration::ZERO, None);
    assert_eq!(walls_handle.summary().unwrap().applied, 12);
    assert_eq!(ring_handle.summary().unwrap().debug.unwrap().total_cycles, 1);
    assert_eq!(server.scheduler().tick_count(), 3);

    assert!(matches!(
        server.start(&mut walls, false),
        Err(AppError::Batch(BatchError::AlreadyStarted))
    ));
}

#[test]
fn unloaded_chunks_are_skipped_not_fatal() {
    let mut server = ServerState::new(&TerrainGenerator::Flat { height: 10 });
    server.load_area(0, 0, 0);

    let mut update = server.new_update(BlockType::STONE, 4).unwrap();
    update.add_block_and_chunk(1, 10, 1).unwrap();
    update.add_block_and_chunk(40, 10, 1).unwrap();
    update.add_block_f64(2.9, 10.2, -0.0).unwrap();

    let handle = server.start(&mut update, false).unwrap();
    server.run(Duration::ZERO, Some(10));

    let summary = handle.summary().unwrap();
    assert_eq!(summary.applied, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.chunks_refreshed, 2);
    let world = server.world.get();
    assert_eq!(world.get_block_at(BlockPos::new(2, 10, 0)), BlockType::STONE);
    assert!(world.get_chunk_at(ChunkPos::new(2, 0)).is_none());
}

#[test]
fn config_file_drives_a_full_run() {
    let config = AppConfig::from_json_str(
        r#"{
            "update": { "rate_limit": 10, "tick_period_ms": 0, "material": "wood" },
            "border": { "shape": "square", "center_x": -40, "center_z": 100, "radius": 3, "height": 2 },
            "terrain": { "generator": { "method": "flat", "height": 64 } }
        }"#,
    )
    .unwrap();

    let summary = mass_block_update::run(&config).unwrap().unwrap();
    assert_eq!(summary.applied, 24 * 2);
    assert_eq!(summary.failed, 0);
    assert!(summary.debug.is_none());
}
