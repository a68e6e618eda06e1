//! # Error Module
//!
//! Errors surfaced by the terrain core. Noise evaluation and meshing are total
//! functions and never fail; errors only appear while building a world from
//! configuration, constructing regions, editing voxels, or exporting previews.

use cgmath::{Point3, Vector3};
use thiserror::Error;

/// Every recoverable failure the crate reports.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// Reading a configuration file or writing a preview failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Config(#[from] serde_json::Error),

    /// A preview image could not be encoded.
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    /// A configuration value is outside the range the generator supports.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A region's size is not a whole number of sampling strides.
    #[error("region of size {size:?} is not aligned to sampling stride {stride:?}")]
    UnalignedRegion {
        /// Size of the rejected region in voxels.
        size: Vector3<i32>,
        /// Coarse sampling stride per axis.
        stride: Vector3<i32>,
    },

    /// A voxel edit targeted a coordinate that no loaded chunk owns.
    #[error("no loaded chunk owns voxel {0:?}")]
    OutOfBounds(Point3<i32>),

    /// A voxel edit tried to place a code that is neither air nor a palette block.
    #[error("block code {0} cannot be placed")]
    InvalidBlock(u16),
}

/// Shorthand result type used across the crate.
pub type TerrainResult<T> = Result<T, TerrainError>;
