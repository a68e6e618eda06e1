#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! Procedural voxel terrain: seeded noise fields, block assignment and
//! greedy meshing, scheduled as cooperative tasks.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership and pooling primitives
//! * `config` - World configuration loaded from JSON
//! * `error` - The crate's error type
//! * `terrain_state` - Noise, generation, voxels, meshing and task management
//!
//! ## Architecture
//!
//! A world is fully determined by its [`config::WorldConfig`]. The seed is
//! hashed into a permutation table, a palette and a personality; columns of
//! chunks are generated from those on worker threads or inline, and every
//! generated chunk is meshed once per render pass.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point2;
//! use voxel_terrain::{config::WorldConfig, terrain_state::TerrainState};
//!
//! let config = WorldConfig {
//!     height_in_chunks: 2,
//!     multithreading: false,
//!     ..Default::default()
//! };
//! let mut terrain = TerrainState::new(&config).unwrap();
//! terrain.request_area(Point2::new(0, 0), 1).unwrap();
//! terrain.run_until_idle();
//! assert_eq!(terrain.world().get().column_count(), 9);
//! ```
//!
//! ## Performance Considerations
//!
//! * Fields are sampled on a coarse lattice and trilinearly expanded
//! * Sample buffers are pooled and reused across columns
//! * Meshes merge coplanar faces and are evicted least recently meshed first
//! * Every task yields once its per-step time budget is spent

use std::path::PathBuf;

use cgmath::Point2;
use log::{error, info};

pub mod config;
pub mod core;
pub mod error;
pub mod terrain_state;

use config::WorldConfig;
use error::TerrainResult;
use terrain_state::{meshing::MeshPass, TerrainState};

/// Columns generated around the origin by [`run`], as a radius.
pub const PREVIEW_RADIUS: i32 = 2;

/// Generates a patch of terrain and writes its previews.
///
/// Reads an optional JSON configuration path and an optional output
/// directory from the command line. Logging is controlled by `RUST_LOG`.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    if let Err(err) = generate(config_path, output) {
        error!("Terrain generation failed: {err}");
        std::process::exit(1);
    }
}

fn generate(config_path: Option<PathBuf>, output: PathBuf) -> TerrainResult<()> {
    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            WorldConfig::from_path(&path)?
        }
        None => WorldConfig::default(),
    };

    let mut terrain = TerrainState::new(&config)?;
    let requested = terrain.request_area(Point2::new(0, 0), PREVIEW_RADIUS)?;
    let elapsed = terrain.run_until_idle();

    let (chunks, columns) = {
        let world = terrain.world().get();
        (world.chunk_count(), world.column_count())
    };
    let (opaque, transparent) = {
        let meshes = terrain.mesh_manager().get();
        (meshes.quad_count(MeshPass::Opaque), meshes.quad_count(MeshPass::Transparent))
    };
    info!(
        "Generated {columns}/{requested} columns ({chunks} chunks) in {:.2?}: {opaque} opaque and {transparent} transparent quads",
        elapsed
    );
    if let Some(height) = terrain.spawn_height(0, 0) {
        info!("Spawn height at the origin: {height}");
    }

    terrain.save_previews(&output)
}
