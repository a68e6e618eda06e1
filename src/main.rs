//! # Voxel Terrain Entry Point
//!
//! Generates a patch of terrain around the origin and writes `palette.png`
//! and `spawn_map.png`.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [output-dir]
//! ```

fn main() {
    voxel_terrain::run();
}
