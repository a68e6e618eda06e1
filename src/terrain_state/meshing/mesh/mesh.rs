//! Mesh data structures produced by the greedy mesher.
//!
//! A chunk gets two independent meshes, one per [`MeshPass`]. Each holds
//! render geometry (vertices with atlas UVs plus triangle indices) and a
//! simplified collision surface built from the same visibility masks with
//! material identity erased.

use cgmath::Point3;

use crate::terrain_state::{
    generation::{FaceUvs, Palette},
    voxels::{BlockGrid, BlockLookup, BlockType},
};

use super::{face::Face, greedy};
use crate::terrain_state::meshing::vertex::Vertex;

/// Which material a mesh renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshPass {
    /// Rock faces against air or glass.
    Opaque,
    /// Glass faces against air.
    Transparent,
}

impl MeshPass {
    /// Both passes, opaque first.
    pub const ALL: [MeshPass; 2] = [MeshPass::Opaque, MeshPass::Transparent];

    /// Whether `block` is the material this pass renders.
    pub fn is_target(self, block: BlockType) -> bool {
        match self {
            MeshPass::Opaque => matches!(block, BlockType::ROCK(_)),
            MeshPass::Transparent => matches!(block, BlockType::GLASS(_)),
        }
    }

    /// Whether a face of this pass's material shows against `other`.
    ///
    /// Rock shows against air and glass. Glass only shows against air, so
    /// rock and glass never produce a transparent face. Null never shows a
    /// face in either pass.
    pub fn is_exposed_to(self, other: BlockType) -> bool {
        match self {
            MeshPass::Opaque => matches!(other, BlockType::AIR | BlockType::GLASS(_)),
            MeshPass::Transparent => other == BlockType::AIR,
        }
    }
}

/// The mesh of one pass of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// World coordinate of the chunk's minimum corner; vertices are relative to it.
    pub origin: Point3<i32>,
    /// The pass this mesh renders.
    pub pass: MeshPass,
    /// Every merged face, in emission order.
    pub faces: Vec<Face>,
    /// Four vertices per face.
    pub vertices: Vec<Vertex>,
    /// Six indices per face.
    pub triangles: Vec<u32>,
    /// Collision surface corners.
    pub collider_vertices: Vec<[f32; 3]>,
    /// Collision surface indices.
    pub collider_triangles: Vec<u32>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new(origin: Point3<i32>, pass: MeshPass) -> Self {
        MeshData {
            origin,
            pass,
            faces: Vec::new(),
            vertices: Vec::new(),
            triangles: Vec::new(),
            collider_vertices: Vec::new(),
            collider_triangles: Vec::new(),
        }
    }

    /// Generates the mesh of a block grid using greedy meshing.
    ///
    /// # Arguments
    /// * `grid` - The chunk's block codes
    /// * `origin` - World coordinate of the grid's minimum corner
    /// * `pass` - Which material to mesh
    /// * `lookup` - Answers for voxels just outside the grid, in world coordinates
    /// * `palette` - Source of face texture placement
    pub fn build<L: BlockLookup + ?Sized>(
        grid: &BlockGrid,
        origin: Point3<i32>,
        pass: MeshPass,
        lookup: &L,
        palette: &Palette,
    ) -> Self {
        greedy::greedy(grid, origin, pass, lookup, palette)
    }

    /// Appends a render face.
    pub fn add_face(&mut self, face: Face, uvs: &FaceUvs) {
        let num_faces = self.faces.len() as u32;
        self.vertices.extend(Self::generate_face_vertices(&face, uvs));
        self.triangles.extend(Self::generate_face_indices(num_faces));
        self.faces.push(face);
    }

    /// Appends a collision face.
    pub fn add_collider_face(&mut self, face: &Face) {
        let num_faces = (self.collider_vertices.len() / 4) as u32;
        for corner in face.corners() {
            self.collider_vertices
                .push([corner.x as f32, corner.y as f32, corner.z as f32]);
        }
        self.collider_triangles
            .extend(Self::generate_face_indices(num_faces));
    }

    /// Generates vertex data for a single face.
    ///
    /// # Returns
    /// The four corners in winding order, each with its repeat-space UV.
    pub fn generate_face_vertices(face: &Face, uvs: &FaceUvs) -> [Vertex; 4] {
        let corners = face.corners();
        std::array::from_fn(|i| Vertex::new(corners[i], uvs.tile, uvs.uvs[i], face.side))
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Returns
    /// Two counter-clockwise triangles over the face's four vertices.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 2, base, base + 2, base + 3]
    }

    /// Number of render quads.
    pub fn quad_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of collision quads.
    pub fn collider_quad_count(&self) -> usize {
        self.collider_vertices.len() / 4
    }

    /// Whether the mesh has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// UV coordinates in vertex order.
    pub fn uv_coordinates(&self) -> Vec<[f32; 2]> {
        self.vertices.iter().map(|v| v.tex_coords).collect()
    }

    /// The vertex buffer as upload-ready bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as upload-ready bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain_state::voxels::BlockSide;

    #[test]
    fn pass_visibility() {
        let rock = BlockType::ROCK(1);
        let glass = BlockType::GLASS(1);
        assert!(MeshPass::Opaque.is_target(rock));
        assert!(!MeshPass::Opaque.is_target(glass));
        assert!(MeshPass::Opaque.is_exposed_to(BlockType::AIR));
        assert!(MeshPass::Opaque.is_exposed_to(glass));
        assert!(!MeshPass::Opaque.is_exposed_to(rock));
        assert!(!MeshPass::Transparent.is_exposed_to(rock));
        assert!(!MeshPass::Transparent.is_exposed_to(glass));
        for pass in MeshPass::ALL {
            assert!(!pass.is_exposed_to(BlockType::NULL));
        }
    }

    #[test]
    fn faces_extend_the_buffers() {
        let face = Face {
            ll: Point3::new(0, 1, 0),
            lr: Point3::new(0, 1, 1),
            ur: Point3::new(1, 1, 1),
            ul: Point3::new(1, 1, 0),
            width: 1,
            height: 1,
            code: 0,
            side: BlockSide::TOP,
        };
        let uvs = FaceUvs {
            tile: 0,
            uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        };
        let mut mesh = MeshData::new(Point3::new(0, 0, 0), MeshPass::Opaque);
        mesh.add_face(face, &uvs);
        mesh.add_face(face, &uvs);
        mesh.add_collider_face(&face);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(&mesh.triangles[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.collider_quad_count(), 1);
        assert_eq!(mesh.vertex_bytes().len(), 8 * 28);
        assert_eq!(mesh.index_bytes().len(), 12 * 4);
        assert_eq!(mesh.uv_coordinates()[2], [1.0, 1.0]);
    }
}
