//! Task for generating one mesh pass of a chunk.
//!
//! This module contains the `ChunkMeshGenerationTask`, which meshes a chunk
//! on a worker (or inline) and hands the result back to the owning thread.
//! There the result is stored only if the chunk still exists at the revision
//! it was meshed from; anything older is discarded.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, warn};

use crate::{
    core::MtResource,
    terrain_state::{
        generation::WorldContext,
        meshing::{MeshData, MeshManager, MeshPass},
        task_management::{
            budget::WorkBudget,
            task::{Task, TaskProgress, TaskResult},
        },
        voxels::World,
    },
};

/// A task that meshes one pass of a chunk.
///
/// This task is responsible for:
/// 1. Waiting until the chunk's grid is built
/// 2. Running the greedy mesher against the world's neighbour lookups
/// 3. Returning the mesh with the chunk revision it was built from
///
/// The build itself is not split across steps: it reads the world under
/// one lock so the grid and its neighbours agree.
pub struct ChunkMeshGenerationTask {
    /// The voxel world
    world: MtResource<World>,
    /// Where finished meshes go
    mesh_manager: MtResource<MeshManager>,
    /// Palette source
    context: Arc<WorldContext>,
    /// Chunk coordinates
    chunk_position: Point3<i32>,
    /// Which material to mesh
    pass: MeshPass,
    /// The mesh and its revision, once built
    output: Option<(MeshData, u64)>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `world` - The voxel world
    /// * `mesh_manager` - Where the result is stored
    /// * `context` - The world's context, for the palette
    /// * `chunk_position` - Chunk coordinates
    /// * `pass` - Which material to mesh
    pub fn new(
        world: MtResource<World>,
        mesh_manager: MtResource<MeshManager>,
        context: Arc<WorldContext>,
        chunk_position: Point3<i32>,
        pass: MeshPass,
    ) -> Self {
        ChunkMeshGenerationTask {
            world,
            mesh_manager,
            context,
            chunk_position,
            pass,
            output: None,
        }
    }

    /// One task per pass for a chunk, with both slots marked pending.
    pub fn for_both_passes(
        world: &MtResource<World>,
        mesh_manager: &MtResource<MeshManager>,
        context: &Arc<WorldContext>,
        chunk_position: Point3<i32>,
    ) -> Vec<Box<dyn Task>> {
        let mut manager = mesh_manager.get_mut();
        MeshPass::ALL
            .into_iter()
            .map(|pass| {
                manager.mark_pending(chunk_position, pass);
                Box::new(ChunkMeshGenerationTask::new(
                    world.clone(),
                    mesh_manager.clone(),
                    context.clone(),
                    chunk_position,
                    pass,
                )) as Box<dyn Task>
            })
            .collect()
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Meshes the chunk once its grid is built.
    ///
    /// # Returns
    /// `Complete` after meshing, or immediately if the chunk is gone
    fn step(&mut self, _budget: &WorkBudget) -> TaskProgress {
        let world = self.world.get();
        let Some(chunk) = world.chunk_at(self.chunk_position) else {
            return TaskProgress::Complete;
        };
        if !chunk.built {
            return TaskProgress::Pending;
        }

        let mesh = MeshData::build(&chunk.grid, chunk.origin(), self.pass, &*world, &self.context.palette);
        self.output = Some((mesh, chunk.revision));
        TaskProgress::Complete
    }

    fn finish(self: Box<Self>) -> Box<dyn TaskResult> {
        Box::new(ChunkMeshGenerationTaskResult {
            world: self.world,
            mesh_manager: self.mesh_manager,
            chunk_position: self.chunk_position,
            pass: self.pass,
            output: self.output,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    world: MtResource<World>,
    mesh_manager: MtResource<MeshManager>,
    chunk_position: Point3<i32>,
    pass: MeshPass,
    output: Option<(MeshData, u64)>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Stores the mesh if it is still current.
    ///
    /// # Returns
    /// No follow-up tasks
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>> {
        let Some((mesh, revision)) = self.output else {
            debug!("Chunk {:?} unloaded before meshing", self.chunk_position);
            return Vec::new();
        };

        let current = self.world.get().chunk_at(self.chunk_position).map(|chunk| chunk.revision);
        if current != Some(revision) {
            warn!(
                "Discarding stale {:?} mesh of chunk {:?} (revision {}, now {:?})",
                self.pass, self.chunk_position, revision, current
            );
            return Vec::new();
        }

        debug!(
            "Meshed chunk {:?} {:?}: {} quads",
            self.chunk_position,
            self.pass,
            mesh.quad_count()
        );
        self.mesh_manager.get_mut().store(self.chunk_position, mesh, revision);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point2, Vector3};

    use super::*;
    use crate::config::WorldConfig;
    use crate::terrain_state::generation::{SampleSet, SpawnMap};
    use crate::terrain_state::voxels::{BlockGrid, ColumnInstall, AIR, CHUNK_DIMENSION};

    fn setup() -> (MtResource<World>, MtResource<MeshManager>, Arc<WorldContext>) {
        let config = WorldConfig {
            height_in_chunks: 1,
            ..Default::default()
        };
        let context = Arc::new(WorldContext::new(&config).unwrap());
        let mut world = World::new(1);
        let token = world.reserve_column(Point2::new(0, 0)).unwrap();
        let mut grid = BlockGrid::new(Vector3::new(CHUNK_DIMENSION, CHUNK_DIMENSION, CHUNK_DIMENSION), AIR);
        grid.set(Point3::new(4, 4, 4), 0);
        world
            .install_column(ColumnInstall {
                position: Point2::new(0, 0),
                token,
                grids: vec![grid],
                spawn_map: SpawnMap::new(CHUNK_DIMENSION as usize),
                samples: SampleSet::empty(),
            })
            .unwrap();
        (MtResource::new(world), MtResource::new(MeshManager::new(8)), context)
    }

    fn run(task: Box<dyn Task>) {
        let follow_ups = task.run_blocking().handle_result();
        assert!(follow_ups.is_empty());
    }

    #[test]
    fn meshes_are_stored() {
        let (world, meshes, context) = setup();
        let origin = Point3::new(0, 0, 0);
        for task in ChunkMeshGenerationTask::for_both_passes(&world, &meshes, &context, origin) {
            run(task);
        }
        let manager = meshes.get();
        assert_eq!(manager.mesh(origin, MeshPass::Opaque).map(|m| m.quad_count()), Some(6));
        assert_eq!(manager.mesh(origin, MeshPass::Transparent).map(|m| m.quad_count()), Some(0));
        assert!(manager.is_complete(origin, MeshPass::Transparent));
    }

    #[test]
    fn stale_meshes_are_discarded() {
        let (world, meshes, context) = setup();
        let origin = Point3::new(0, 0, 0);
        let mut task = Box::new(ChunkMeshGenerationTask::new(
            world.clone(),
            meshes.clone(),
            context,
            origin,
            MeshPass::Opaque,
        ));
        assert_eq!(task.step(&WorkBudget::unbounded()), TaskProgress::Complete);
        world.get_mut().set_block(Point3::new(1, 1, 1), 0).unwrap();

        assert!(task.finish().handle_result().is_empty());
        assert!(meshes.get().mesh(origin, MeshPass::Opaque).is_none());
    }

    #[test]
    fn missing_chunks_complete_without_a_mesh() {
        let (world, meshes, context) = setup();
        let position = Point3::new(7, 0, 7);
        run(Box::new(ChunkMeshGenerationTask::new(world, meshes.clone(), context, position, MeshPass::Opaque)));
        assert!(meshes.get().chunk_meshes(position).is_none());
    }
}
