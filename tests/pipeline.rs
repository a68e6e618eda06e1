use std::sync::Arc;

use cgmath::{Point2, Point3, Vector3};
use voxel_terrain::{
    config::WorldConfig,
    terrain_state::{
        generation::{generate_column, Palette, SamplePool, Seed, SeedSource, WorldContext},
        meshing::{MeshData, MeshPass},
        voxels::{BlockCode, BlockGrid, BlockType, AIR, CHUNK_DIMENSION, NULL},
        TerrainState,
    },
};

fn config(seed: &str, multithreading: bool) -> WorldConfig {
    WorldConfig {
        seed: SeedSource::Text(seed.into()),
        height_in_chunks: 3,
        multithreading,
        worker_count: Some(2),
        ..Default::default()
    }
}

fn generated(config: &WorldConfig, columns: &[Point2<i32>]) -> TerrainState {
    let mut terrain = TerrainState::new(config).unwrap();
    for column in columns {
        assert!(terrain.request_column(*column).unwrap());
    }
    terrain.run_until_idle();
    terrain
}

#[test]
fn scheduled_generation_matches_direct_generation() {
    let config = config("TESTSEED1", true);
    let position = Point2::new(2, -3);
    let terrain = generated(&config, &[position]);

    let context = Arc::new(WorldContext::new(&config).unwrap());
    let direct = generate_column(&context, position, &mut SamplePool::new()).unwrap();

    let world = terrain.world().get();
    for (y, grid) in direct.grids.iter().enumerate() {
        let chunk = world
            .chunk_at(Point3::new(position.x, y as i32, position.y))
            .unwrap();
        assert_eq!(&chunk.grid, grid);
    }
}

#[test]
fn threaded_and_inline_worlds_agree() {
    let columns = [Point2::new(0, 0), Point2::new(1, 0), Point2::new(0, 1)];
    let threaded = generated(&config("agree", true), &columns);
    let inline = generated(&config("agree", false), &columns);

    for column in columns {
        for y in 0..3 {
            let position = Point3::new(column.x, y, column.y);
            assert!(threaded.is_chunk_meshed(position));
            assert!(inline.is_chunk_meshed(position));
            let a = threaded.world().get().chunk_at(position).unwrap().grid.clone();
            let b = inline.world().get().chunk_at(position).unwrap().grid.clone();
            assert_eq!(a, b);
        }
    }
    for pass in MeshPass::ALL {
        assert_eq!(
            threaded.mesh_manager().get().quad_count(pass),
            inline.mesh_manager().get().quad_count(pass)
        );
    }
}

#[test]
fn generated_codes_are_valid_blocks() {
    let terrain = generated(&config("codes", false), &[Point2::new(0, 0)]);
    let world = terrain.world().get();
    for y in 0..3 {
        let chunk = world.chunk_at(Point3::new(0, y, 0)).unwrap();
        assert_eq!(chunk.grid.count(|code| code == NULL), 0);
        assert!(chunk
            .grid
            .codes()
            .iter()
            .all(|code| BlockType::from_code(*code) != BlockType::NULL));
    }
}

#[test]
fn spawn_heights_sit_on_solid_ground() {
    let config = WorldConfig {
        height_in_chunks: 8,
        ..config("spawn", false)
    };
    let terrain = generated(&config, &[Point2::new(0, 0)]);
    let mut found = 0;
    for z in 0..CHUNK_DIMENSION {
        for x in 0..CHUNK_DIMENSION {
            let Some(height) = terrain.spawn_height(x, z) else {
                continue;
            };
            found += 1;
            let below = BlockType::from_code(terrain.get_block(Point3::new(x, height - 1, z)));
            let at = BlockType::from_code(terrain.get_block(Point3::new(x, height, z)));
            assert!(below.is_solid());
            assert!(!at.is_solid());
        }
    }
    assert!(found > 0);
}

#[test]
fn boundary_edits_remesh_both_chunks() {
    let mut terrain = generated(&config("edits", false), &[Point2::new(0, 0)]);
    let stored = terrain.mesh_manager().get().meshes_stored();

    let top_of_bottom_chunk = Point3::new(3, CHUNK_DIMENSION - 1, 3);
    terrain.set_block(top_of_bottom_chunk, AIR).unwrap();
    assert!(!terrain.is_chunk_meshed(Point3::new(0, 0, 0)));
    assert!(!terrain.is_chunk_meshed(Point3::new(0, 1, 0)));

    terrain.run_until_idle();
    assert!(terrain.is_chunk_meshed(Point3::new(0, 0, 0)));
    assert!(terrain.is_chunk_meshed(Point3::new(0, 1, 0)));
    assert_eq!(terrain.mesh_manager().get().meshes_stored(), stored + 4);

    let world = terrain.world().get();
    let chunk = world.chunk_at(Point3::new(0, 0, 0)).unwrap();
    assert_eq!(chunk.changed_positions(), vec![Point3::new(3, CHUNK_DIMENSION - 1, 3)]);
}

#[test]
fn unloading_releases_everything() {
    let columns = [Point2::new(0, 0), Point2::new(1, 0)];
    let mut terrain = generated(&config("unload", true), &columns);
    let allocations = terrain.sample_pool().get().allocations();

    assert!(terrain.unload_column(Point2::new(1, 0)));
    terrain.run_until_idle();
    assert_eq!(terrain.world().get().column_count(), 1);
    assert_eq!(terrain.get_block(Point3::new(CHUNK_DIMENSION + 1, 1, 1)), NULL);
    assert_eq!(terrain.sample_pool().get().available(), 6);
    // The remaining column was re-meshed against the gap.
    assert!(terrain.is_chunk_meshed(Point3::new(0, 0, 0)));

    terrain.request_column(Point2::new(5, 5)).unwrap();
    terrain.run_until_idle();
    assert_eq!(terrain.sample_pool().get().allocations(), allocations);
}

#[test]
fn mesher_suppresses_shared_and_unloaded_faces() {
    let palette = Palette::generate(&Seed::from("mesher"));
    let mut grid = BlockGrid::new(Vector3::new(2, 2, 2), AIR);
    grid.set(Point3::new(0, 0, 0), 3);
    grid.set(Point3::new(1, 0, 0), 3);

    let air = |_: Point3<i32>| -> BlockCode { AIR };
    let mesh = MeshData::build(&grid, Point3::new(0, 0, 0), MeshPass::Opaque, &air, &palette);
    // Two same-material voxels merge into one quad per remaining side.
    assert_eq!(mesh.quad_count(), 6);
    assert!(mesh.faces.iter().all(|face| !(face.side.axis() == 0 && face.ll.x == 1)));

    let null = |_: Point3<i32>| -> BlockCode { NULL };
    let mesh = MeshData::build(&grid, Point3::new(0, 0, 0), MeshPass::Opaque, &null, &palette);
    assert!(mesh
        .faces
        .iter()
        .all(|face| face.side.is_positive() || face.ll[face.side.axis()] != 0));
    assert!(mesh.quad_count() < 6);
}
