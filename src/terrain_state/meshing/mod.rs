//! Mesh generation and management for voxel terrain.
//!
//! This module turns built chunks into renderable geometry and keeps the
//! results until the host collects them.
//!
//! # Architecture
//! - `MeshManager`: holds the latest mesh of each pass of each chunk
//! - `mesh/`: the greedy mesher and mesh data structures
//! - `tasks/`: the cooperative task that meshes one pass of one chunk
//! - `UvCache`: per-build memo of face texture placement
//!
//! # Completion
//! Every chunk has one slot per [`MeshPass`]. Publishing a mesh task marks
//! the slot incomplete; storing its result marks it complete again. Hosts
//! poll [`MeshManager::is_complete`] before reading a slot, the same way
//! generation polls its field flags.
//!
//! # Performance Considerations
//! - Greedy meshing keeps quad counts proportional to distinct rectangles
//! - The opaque and transparent passes are separate tasks and may run in parallel
//! - Retained meshes are capped; the least recently meshed chunk is evicted first

use std::collections::HashMap;
use std::num::NonZeroUsize;

use cgmath::Point3;
use log::debug;
use lru::LruCache;

mod mesh;
pub mod tasks;
pub mod uv_cache;
pub mod vertex;

pub use mesh::*;
pub use uv_cache::UvCache;
pub use vertex::Vertex;

/// The mesh of one pass of a chunk and whether it is current.
#[derive(Debug, Default)]
pub struct MeshSlot {
    /// The latest stored mesh, if any.
    pub data: Option<MeshData>,
    /// `false` while a mesh task for this slot is outstanding.
    pub complete: bool,
    /// Chunk revision the stored mesh was built from.
    pub revision: u64,
}

/// Both mesh slots of a chunk.
#[derive(Debug, Default)]
pub struct ChunkMeshes {
    opaque: MeshSlot,
    transparent: MeshSlot,
}

impl ChunkMeshes {
    /// The slot of `pass`.
    pub fn slot(&self, pass: MeshPass) -> &MeshSlot {
        match pass {
            MeshPass::Opaque => &self.opaque,
            MeshPass::Transparent => &self.transparent,
        }
    }

    fn slot_mut(&mut self, pass: MeshPass) -> &mut MeshSlot {
        match pass {
            MeshPass::Opaque => &mut self.opaque,
            MeshPass::Transparent => &mut self.transparent,
        }
    }
}

/// Keeps the meshes of every meshed chunk.
pub struct MeshManager {
    /// Slots per chunk position
    meshes: HashMap<Point3<i32>, ChunkMeshes>,
    /// Chunks with stored meshes, least recently meshed first out
    least_recently_meshed_chunks: LruCache<Point3<i32>, ()>,
    /// Total meshes stored since creation
    meshes_stored: usize,
}

impl MeshManager {
    /// Creates a manager retaining meshes for at most `capacity` chunks.
    pub fn new(capacity: usize) -> Self {
        MeshManager {
            meshes: HashMap::new(),
            least_recently_meshed_chunks: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            meshes_stored: 0,
        }
    }

    /// Marks a slot as awaiting a new mesh.
    pub fn mark_pending(&mut self, chunk_position: Point3<i32>, pass: MeshPass) {
        self.meshes
            .entry(chunk_position)
            .or_default()
            .slot_mut(pass)
            .complete = false;
    }

    /// Stores a finished mesh and marks its slot complete.
    ///
    /// # Returns
    /// Chunks whose meshes were evicted to make room.
    ///
    /// # Implementation Details
    /// - A chunk new to the cache evicts least recently meshed chunks until it fits
    /// - A chunk already cached is promoted instead
    pub fn store(&mut self, chunk_position: Point3<i32>, mesh: MeshData, revision: u64) -> Vec<Point3<i32>> {
        let mut evicted = Vec::new();
        if self.least_recently_meshed_chunks.contains(&chunk_position) {
            self.least_recently_meshed_chunks.promote(&chunk_position);
        } else {
            while self.least_recently_meshed_chunks.len() >= self.least_recently_meshed_chunks.cap().get() {
                let Some((lru_chunk_position, _)) = self.least_recently_meshed_chunks.pop_lru() else {
                    break;
                };
                self.meshes.remove(&lru_chunk_position);
                debug!("Evicted meshes of chunk {:?}", lru_chunk_position);
                evicted.push(lru_chunk_position);
            }
            self.least_recently_meshed_chunks.push(chunk_position, ());
        }

        let pass = mesh.pass;
        *self.meshes.entry(chunk_position).or_default().slot_mut(pass) = MeshSlot {
            data: Some(mesh),
            complete: true,
            revision,
        };
        self.meshes_stored += 1;
        evicted
    }

    /// Whether the slot holds a current mesh.
    pub fn is_complete(&self, chunk_position: Point3<i32>, pass: MeshPass) -> bool {
        self.meshes
            .get(&chunk_position)
            .is_some_and(|meshes| meshes.slot(pass).complete)
    }

    /// Checks if both passes of a chunk have been meshed.
    ///
    /// Promotes the chunk in the eviction order when they have.
    pub fn is_chunk_meshed(&mut self, chunk_position: Point3<i32>) -> bool {
        let meshed = MeshPass::ALL
            .iter()
            .all(|pass| self.is_complete(chunk_position, *pass));
        if meshed {
            self.least_recently_meshed_chunks.promote(&chunk_position);
        }
        meshed
    }

    /// Both slots of a chunk.
    pub fn chunk_meshes(&self, chunk_position: Point3<i32>) -> Option<&ChunkMeshes> {
        self.meshes.get(&chunk_position)
    }

    /// The stored mesh of a slot.
    pub fn mesh(&self, chunk_position: Point3<i32>, pass: MeshPass) -> Option<&MeshData> {
        self.meshes.get(&chunk_position)?.slot(pass).data.as_ref()
    }

    /// Hands a stored mesh over to the caller, leaving the slot complete but empty.
    pub fn take_mesh(&mut self, chunk_position: Point3<i32>, pass: MeshPass) -> Option<MeshData> {
        self.meshes.get_mut(&chunk_position)?.slot_mut(pass).data.take()
    }

    /// Forgets a chunk's meshes.
    pub fn remove_chunk(&mut self, chunk_position: Point3<i32>) -> bool {
        self.least_recently_meshed_chunks.pop(&chunk_position);
        self.meshes.remove(&chunk_position).is_some()
    }

    /// Number of chunks with at least one slot.
    pub fn chunk_count(&self) -> usize {
        self.meshes.len()
    }

    /// Render quads across every stored mesh of a pass.
    pub fn quad_count(&self, pass: MeshPass) -> usize {
        self.meshes
            .values()
            .filter_map(|meshes| meshes.slot(pass).data.as_ref())
            .map(MeshData::quad_count)
            .sum()
    }

    /// Total meshes stored since creation.
    pub fn meshes_stored(&self) -> usize {
        self.meshes_stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(pass: MeshPass) -> MeshData {
        MeshData::new(Point3::new(0, 0, 0), pass)
    }

    #[test]
    fn slots_complete_when_stored() {
        let mut manager = MeshManager::new(4);
        let position = Point3::new(1, 2, 3);
        manager.mark_pending(position, MeshPass::Opaque);
        manager.mark_pending(position, MeshPass::Transparent);
        assert!(!manager.is_complete(position, MeshPass::Opaque));

        manager.store(position, mesh(MeshPass::Opaque), 0);
        assert!(manager.is_complete(position, MeshPass::Opaque));
        assert!(!manager.is_chunk_meshed(position));

        manager.store(position, mesh(MeshPass::Transparent), 0);
        assert!(manager.is_chunk_meshed(position));
        assert!(manager.take_mesh(position, MeshPass::Opaque).is_some());
        assert!(manager.mesh(position, MeshPass::Opaque).is_none());
        assert!(manager.is_complete(position, MeshPass::Opaque));
        assert_eq!(manager.meshes_stored(), 2);
    }

    #[test]
    fn least_recently_meshed_chunks_are_evicted() {
        let mut manager = MeshManager::new(2);
        let a = Point3::new(0, 0, 0);
        let b = Point3::new(1, 0, 0);
        let c = Point3::new(2, 0, 0);
        assert!(manager.store(a, mesh(MeshPass::Opaque), 0).is_empty());
        assert!(manager.store(b, mesh(MeshPass::Opaque), 0).is_empty());
        manager.store(a, mesh(MeshPass::Transparent), 0);

        assert_eq!(manager.store(c, mesh(MeshPass::Opaque), 0), vec![b]);
        assert!(manager.mesh(b, MeshPass::Opaque).is_none());
        assert!(manager.mesh(a, MeshPass::Transparent).is_some());
        assert_eq!(manager.chunk_count(), 2);
    }

    #[test]
    fn removed_chunks_free_their_place() {
        let mut manager = MeshManager::new(1);
        let a = Point3::new(0, 0, 0);
        manager.store(a, mesh(MeshPass::Opaque), 0);
        assert!(manager.remove_chunk(a));
        assert!(!manager.remove_chunk(a));
        assert!(manager.store(Point3::new(5, 0, 0), mesh(MeshPass::Opaque), 0).is_empty());
    }
}
