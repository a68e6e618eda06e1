//! Vertex data structures for terrain meshes.
//!
//! This module defines the vertex format produced by the greedy mesher. The
//! layout is plain old data so a host can upload a mesh's vertex buffer
//! without conversion.

use cgmath::Point3;

use crate::terrain_state::voxels::BlockSide;

/// A vertex of a terrain quad.
///
/// Positions are chunk-local voxel corners; the owning
/// [`super::MeshData`] records the chunk's world origin.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes)
/// - Texture Index: u32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Side: u32 (4 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
    /// Z coordinate in chunk space
    pub z: i32,
    /// Atlas tile of the face this vertex belongs to
    pub texture_index: u32,
    /// UV coordinates in tile-repeat space (a 3x2 face spans 0..3, 0..2)
    pub tex_coords: [f32; 2],
    /// The face direction, as the `BlockSide` discriminant
    pub side: u32,
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - Chunk-local position of the vertex
    /// * `texture_index` - Atlas tile of the face
    /// * `tex_coords` - Repeat-space UV coordinates
    /// * `side` - Face direction
    pub fn new(pos: Point3<i32>, texture_index: u32, tex_coords: [f32; 2], side: BlockSide) -> Self {
        Vertex {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            texture_index,
            tex_coords,
            side: side as u32,
        }
    }

    /// Position of the vertex.
    pub fn position(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Face direction of the vertex, decoded from its discriminant.
    pub fn block_side(&self) -> Option<BlockSide> {
        num::FromPrimitive::from_u32(self.side)
    }
}
