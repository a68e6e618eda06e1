//! Mesh generation for voxel terrain.
//!
//! Converts a chunk's block codes into quads with greedy meshing, merging
//! coplanar faces of the same material into maximal rectangles.
//!
//! # Architecture
//! - [`MeshData`]: render and collision buffers of one pass of one chunk
//! - [`Face`]: a merged rectangle with its corners, extent and material
//! - [`greedy`]: the slice-mask builder and rectangle merge
//!
//! # Usage
//! ```
//! use cgmath::{Point3, Vector3};
//! use voxel_terrain::terrain_state::generation::{Palette, Seed};
//! use voxel_terrain::terrain_state::meshing::{MeshData, MeshPass};
//! use voxel_terrain::terrain_state::voxels::{BlockCode, BlockGrid, AIR};
//!
//! let mut grid = BlockGrid::new(Vector3::new(2, 2, 2), AIR);
//! grid.set(Point3::new(0, 0, 0), 3);
//! let palette = Palette::generate(&Seed::from("docs"));
//! let outside = |_: Point3<i32>| -> BlockCode { AIR };
//! let mesh = MeshData::build(&grid, Point3::new(0, 0, 0), MeshPass::Opaque, &outside, &palette);
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod face;
mod greedy;
#[allow(clippy::module_inception)]
mod mesh;

pub use face::{Face, MaskRect};
pub use greedy::{greedy, merge_mask};
pub use mesh::*;
