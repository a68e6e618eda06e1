//! Columns of stacked chunks.

use cgmath::Point2;

use crate::terrain_state::generation::{SampleSet, SpawnMap};

/// A vertical stack of chunks sharing one (x, z) footprint.
///
/// Columns are the unit of generation and unloading. Chunks are referred to
/// by their arena index in the owning [`super::world::World`], never by
/// reference.
#[derive(Debug)]
pub struct Column {
    /// Column coordinates: chunk x and chunk z.
    pub position: Point2<i32>,
    /// Identifies the generation request this column slot belongs to.
    pub token: u64,
    /// Arena indices of the chunks, bottom to top. Empty until generated.
    pub chunks: Vec<usize>,
    /// Per-cell spawn data produced alongside the voxels.
    pub spawn_map: Option<SpawnMap>,
    /// Sample buffers the column was generated from, returned to the pool on unload.
    pub samples: Option<SampleSet>,
}

impl Column {
    /// A column slot awaiting generation.
    pub fn reserved(position: Point2<i32>, token: u64) -> Self {
        Column {
            position,
            token,
            chunks: Vec::new(),
            spawn_map: None,
            samples: None,
        }
    }

    /// Whether generation results have been installed.
    pub fn is_generated(&self) -> bool {
        !self.chunks.is_empty()
    }
}
