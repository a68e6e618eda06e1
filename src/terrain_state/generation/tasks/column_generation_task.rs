//! # Column Generation Task
//!
//! Runs a [`ColumnGenerator`] under the task manager and installs its output
//! into the world. Installation publishes mesh tasks for the new chunks and
//! for the already built chunks beside them.

use std::sync::Arc;

use cgmath::Point2;
use log::warn;

use crate::{
    core::MtResource,
    terrain_state::{
        generation::{
            column_generator::{ColumnGenerator, ColumnOutput},
            context::WorldContext,
            sample_set::SamplePool,
        },
        meshing::{tasks::ChunkMeshGenerationTask, MeshManager},
        task_management::{
            budget::WorkBudget,
            task::{Task, TaskProgress, TaskResult},
        },
        voxels::{ColumnInstall, World},
    },
};

/// Shared state a column task writes into when it finishes.
#[derive(Clone)]
pub struct ColumnTargets {
    /// The voxel world
    pub world: MtResource<World>,
    /// Where mesh tasks store their results
    pub mesh_manager: MtResource<MeshManager>,
    /// Where unused sample buffers go back to
    pub pool: MtResource<SamplePool>,
    /// The world's context
    pub context: Arc<WorldContext>,
}

/// A task that assigns every voxel of a column.
///
/// This task is responsible for:
/// 1. Sampling the column's height fields
/// 2. Waiting until the column's dense fields are expanded
/// 3. Filling the chunk grids layer by layer within each step's budget
pub struct ColumnGenerationTask {
    /// The incremental generator
    generator: ColumnGenerator,
    /// Token of the world reservation this column fills
    token: u64,
    /// Where the output goes
    targets: ColumnTargets,
}

impl ColumnGenerationTask {
    /// Creates a new column generation task.
    ///
    /// # Arguments
    /// * `generator` - Generator over the column's sample set
    /// * `token` - Token returned by [`World::reserve_column`]
    /// * `targets` - Shared state the result is installed into
    pub fn new(generator: ColumnGenerator, token: u64, targets: ColumnTargets) -> Self {
        ColumnGenerationTask {
            generator,
            token,
            targets,
        }
    }
}

impl Task for ColumnGenerationTask {
    fn step(&mut self, budget: &WorkBudget) -> TaskProgress {
        self.generator.step(budget)
    }

    fn finish(self: Box<Self>) -> Box<dyn TaskResult> {
        Box::new(ColumnGenerationTaskResult {
            position: self.generator.position(),
            output: self.generator.into_output(),
            token: self.token,
            targets: self.targets,
        })
    }
}

/// The result of a column generation task.
pub struct ColumnGenerationTaskResult {
    position: Point2<i32>,
    output: ColumnOutput,
    token: u64,
    targets: ColumnTargets,
}

impl TaskResult for ColumnGenerationTaskResult {
    /// Installs the column and schedules meshing.
    ///
    /// # Returns
    /// Two mesh tasks per installed or invalidated chunk, or nothing if the
    /// column was unloaded meanwhile
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>> {
        let ColumnGenerationTaskResult {
            position,
            output,
            token,
            targets,
        } = *self;
        let ColumnOutput {
            grids,
            spawn_map,
            samples,
        } = output;
        let install = ColumnInstall {
            position,
            token,
            grids,
            spawn_map,
            samples,
        };

        let installed = {
            let mut world = targets.world.get_mut();
            world.install_column(install).map(|mut positions| {
                positions.extend(world.invalidate_column_neighbours(position));
                positions
            })
        };

        match installed {
            Ok(positions) => positions
                .into_iter()
                .flat_map(|position| {
                    ChunkMeshGenerationTask::for_both_passes(
                        &targets.world,
                        &targets.mesh_manager,
                        &targets.context,
                        position,
                    )
                })
                .collect(),
            Err(install) => {
                warn!(
                    "Discarding generated column {:?}: unloaded or requested again",
                    install.position
                );
                install.samples.release(&mut targets.pool.get_mut());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::terrain_state::generation::{
        region::Region,
        sample_set::{FieldKind, SampleSet},
        tasks::{FieldExpansionTask, FieldSampleTask},
    };
    use crate::terrain_state::meshing::MeshPass;

    fn targets() -> ColumnTargets {
        let config = WorldConfig {
            height_in_chunks: 2,
            ..Default::default()
        };
        ColumnTargets {
            world: MtResource::new(World::new(2)),
            mesh_manager: MtResource::new(MeshManager::new(16)),
            pool: MtResource::new(SamplePool::new()),
            context: Arc::new(WorldContext::new(&config).unwrap()),
        }
    }

    fn ready_task(targets: &ColumnTargets, position: Point2<i32>, token: u64) -> Box<ColumnGenerationTask> {
        let context = &targets.context;
        let region = Region::for_column(position, context.height_in_chunks, context.sample_rate).unwrap();
        let samples = SampleSet::new(region, context.sample_rate, &context.fields, &mut targets.pool.get_mut());
        for kind in FieldKind::ALL {
            let field = samples.field(kind).clone();
            Box::new(FieldSampleTask::new(context.table.clone(), field.clone())).run_blocking();
            Box::new(FieldExpansionTask::new(field)).run_blocking();
        }
        let generator = ColumnGenerator::new(context.clone(), position, samples);
        Box::new(ColumnGenerationTask::new(generator, token, targets.clone()))
    }

    #[test]
    fn installs_and_schedules_meshing() {
        let targets = targets();
        let position = Point2::new(0, 0);
        let token = targets.world.get_mut().reserve_column(position).unwrap();

        let follow_ups = ready_task(&targets, position, token).run_blocking().handle_result();
        assert_eq!(follow_ups.len(), 4);
        assert_eq!(targets.world.get().chunk_count(), 2);
        let top = cgmath::Point3::new(0, 1, 0);
        assert!(!targets.mesh_manager.get().is_complete(top, MeshPass::Opaque));
    }

    #[test]
    fn neighbours_are_remeshed() {
        let targets = targets();
        for (index, position) in [Point2::new(0, 0), Point2::new(1, 0)].into_iter().enumerate() {
            let token = targets.world.get_mut().reserve_column(position).unwrap();
            let follow_ups = ready_task(&targets, position, token).run_blocking().handle_result();
            // The second column also re-meshes the two chunks of the first.
            assert_eq!(follow_ups.len(), 4 * (index + 1));
        }
    }

    #[test]
    fn unloaded_columns_are_discarded() {
        let targets = targets();
        let position = Point2::new(4, 4);
        let token = targets.world.get_mut().reserve_column(position).unwrap();
        let task = ready_task(&targets, position, token);
        targets.world.get_mut().remove_column(position);

        let follow_ups = task.run_blocking().handle_result();
        assert!(follow_ups.is_empty());
        assert_eq!(targets.world.get().chunk_count(), 0);
        assert_eq!(targets.pool.get().available(), 6);
    }
}
