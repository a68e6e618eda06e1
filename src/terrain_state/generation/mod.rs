//! # Terrain Generation
//!
//! Turns a seed into block codes.
//!
//! ## Architecture
//!
//! * **Seed / WorldContext**: everything derived once per world: the
//!   permutation table, palette, personality and resolved noise fields
//! * **Region / SampleRegion / SampleSet**: coarse lattice sampling of the
//!   3D fields of a column and their trilinear expansion to voxel density
//! * **TerrainRules**: the per-voxel band chain from densities to a block
//! * **ColumnGenerator**: drives the rules over a whole column
//! * **tasks**: the same pipeline as cooperative tasks for the task manager
//!
//! ## Data Flow
//!
//! 1. A column's region is sampled on a stride lattice, one field per task
//! 2. Each field is expanded to a dense grid once its samples are in
//! 3. The column generator waits for all three fields, then fills its chunks
//! 4. The filled grids are installed into the world and meshed

use std::sync::Arc;

use cgmath::Point2;

use crate::error::TerrainResult;
use crate::terrain_state::task_management::{
    budget::WorkBudget,
    task::{Task, TaskProgress},
};

pub mod column_generator;
pub mod context;
pub mod palette;
pub mod personality;
pub mod region;
pub mod sample_region;
pub mod sample_set;
pub mod seed;
pub mod tasks;
pub mod terrain_rules;

pub use column_generator::{ColumnGenerator, ColumnOutput};
pub use context::{FieldSet, WorldContext};
pub use palette::{FaceUvs, Palette};
pub use personality::{ModPattern, Personality, PersonalityRanges};
pub use region::Region;
pub use sample_region::SampleRegion;
pub use sample_set::{FieldKind, SamplePool, SampleSet, SpawnCell, SpawnMap};
pub use seed::{Seed, SeedSource};
pub use terrain_rules::{TerrainConfig, TerrainRules};

use tasks::{FieldExpansionTask, FieldSampleTask};

/// Generates a column on the calling thread.
///
/// Runs the same tasks the task manager would, one after another with no
/// budget. Output is identical to scheduled generation.
///
/// # Arguments
/// * `context` - The world
/// * `position` - Column coordinates
/// * `pool` - Buffer pool for the column's fields
///
/// # Errors
/// [`crate::error::TerrainError::UnalignedRegion`] if the world's sample rate
/// does not tile the column.
pub fn generate_column(
    context: &Arc<WorldContext>,
    position: Point2<i32>,
    pool: &mut SamplePool,
) -> TerrainResult<ColumnOutput> {
    let region = Region::for_column(position, context.height_in_chunks, context.sample_rate)?;
    let samples = SampleSet::new(region, context.sample_rate, &context.fields, pool);

    for kind in FieldKind::ALL {
        let field = samples.field(kind).clone();
        Box::new(FieldSampleTask::new(context.table.clone(), field.clone())).run_blocking();
        Box::new(FieldExpansionTask::new(field)).run_blocking();
    }

    let mut generator = ColumnGenerator::new(context.clone(), position, samples);
    let budget = WorkBudget::unbounded();
    while generator.step(&budget) == TaskProgress::Pending {}
    Ok(generator.into_output())
}
