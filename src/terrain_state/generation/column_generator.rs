//! # Column Generator
//!
//! Assigns a block to every voxel of a column once its fields are ready.
//!
//! ## Phases
//! 1. **Heights**: sample the 2D height and spawn fields per (x, z) cell
//! 2. **AwaitFields**: poll until every dense field is complete
//! 3. **Voxels**: run the terrain rules one horizontal layer at a time,
//!    bottom to top, tracking each cell's spawn height on the way up

use std::sync::Arc;

use cgmath::{Point2, Point3};

use crate::terrain_state::{
    noise::quantize,
    task_management::{budget::WorkBudget, task::TaskProgress},
    voxels::{BlockGrid, BlockType, CHUNK_DIMENSION},
};

use super::{
    context::WorldContext,
    sample_set::{FieldKind, SampleSet, SpawnMap},
    terrain_rules::{ColumnHeights, VoxelInput},
};

const CELLS: usize = CHUNK_DIMENSION as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Heights,
    AwaitFields,
    Voxels,
    Done,
}

/// Everything generation produces for one column.
#[derive(Debug)]
pub struct ColumnOutput {
    /// One grid per chunk, bottom to top.
    pub grids: Vec<BlockGrid>,
    /// Spawn data per (x, z) cell.
    pub spawn_map: SpawnMap,
    /// The fields the column was generated from.
    pub samples: SampleSet,
}

/// Incremental voxel assignment for one column.
pub struct ColumnGenerator {
    context: Arc<WorldContext>,
    position: Point2<i32>,
    samples: SampleSet,
    phase: Phase,
    heights: Vec<ColumnHeights>,
    spawn_map: SpawnMap,
    grids: Vec<BlockGrid>,
    previous_solid: Vec<bool>,
    next_y: i32,
}

impl ColumnGenerator {
    /// Prepares a column.
    ///
    /// # Arguments
    /// * `context` - The world
    /// * `position` - Column coordinates
    /// * `samples` - Dense fields for the column's region, possibly still in progress
    pub fn new(context: Arc<WorldContext>, position: Point2<i32>, samples: SampleSet) -> Self {
        let height = context.height_in_chunks.max(1) as usize;
        ColumnGenerator {
            context,
            position,
            samples,
            phase: Phase::Heights,
            heights: Vec::with_capacity(CELLS * CELLS),
            spawn_map: SpawnMap::new(CELLS),
            grids: (0..height).map(|_| BlockGrid::chunk()).collect(),
            previous_solid: vec![false; CELLS * CELLS],
            next_y: 0,
        }
    }

    /// Column coordinates.
    pub fn position(&self) -> Point2<i32> {
        self.position
    }

    fn world_xz(&self, x: usize, z: usize) -> (f64, f64) {
        (
            f64::from(self.position.x * CHUNK_DIMENSION + x as i32),
            f64::from(self.position.y * CHUNK_DIMENSION + z as i32),
        )
    }

    fn sample_heights(&mut self) {
        let context = self.context.clone();
        let table = &context.table;
        let fields = &context.fields;
        let rules = context.rules();

        self.heights.clear();
        for z in 0..CELLS {
            for x in 0..CELLS {
                let (wx, wz) = self.world_xz(x, z);
                let terrain = fields.terrain_height.sample_2d(table, wx, wz).value;
                let mountain = fields.mountain_height.sample_2d(table, wx, wz).value;
                self.heights.push(rules.heights(terrain, mountain));

                let value = fields.spawn.sample_2d(table, wx, wz).value;
                if let Some(cell) = self.spawn_map.get_mut(x, z) {
                    cell.value = value;
                    cell.frequency = fields.spawn.frequency_at(table, wx, wz);
                    cell.intensity = quantize(value, fields.spawn.scale).clamp(0, 255) as u8;
                }
            }
        }
    }

    fn fill_layer(&mut self, y: i32) {
        let context = self.context.clone();
        let rules = context.rules();
        let cave = self.samples.field(FieldKind::Cave).get();
        let pattern = self.samples.field(FieldKind::Pattern).get();
        let stripe = self.samples.field(FieldKind::Stripe).get();

        let chunk = (y / CHUNK_DIMENSION) as usize;
        let local_y = y % CHUNK_DIMENSION;

        for z in 0..CELLS {
            for x in 0..CELLS {
                let cell = x + CELLS * z;
                let local = Point3::new(x as i32, y, z as i32);
                let input = VoxelInput {
                    y,
                    heights: self.heights[cell],
                    cave: cave.get_normalized(local),
                    pattern: pattern.get_normalized(local),
                    stripe: stripe.get_normalized(local),
                };
                let code = rules.block_at(&input);
                self.grids[chunk].set(Point3::new(x as i32, local_y, z as i32), code);

                let solid = BlockType::from_code(code).is_solid();
                if self.previous_solid[cell] && !solid {
                    if let Some(spawn) = self.spawn_map.get_mut(x, z) {
                        spawn.height.get_or_insert(y);
                    }
                }
                self.previous_solid[cell] = solid;
            }
        }
    }

    /// Advances generation.
    ///
    /// # Returns
    /// `Complete` once every voxel is assigned.
    pub fn step(&mut self, budget: &WorkBudget) -> TaskProgress {
        let timer = budget.start();
        loop {
            match self.phase {
                Phase::Heights => {
                    self.sample_heights();
                    self.phase = Phase::AwaitFields;
                }
                Phase::AwaitFields => {
                    if !self.samples.is_complete() {
                        return TaskProgress::Pending;
                    }
                    self.phase = Phase::Voxels;
                }
                Phase::Voxels => {
                    let top = self.context.world_height();
                    self.fill_layer(self.next_y);
                    self.next_y += 1;
                    if self.next_y >= top {
                        self.phase = Phase::Done;
                    }
                }
                Phase::Done => return TaskProgress::Complete,
            }
            if self.phase != Phase::Done && timer.exhausted() {
                return TaskProgress::Pending;
            }
        }
    }

    /// Whether every voxel has been assigned.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Hands over the generated data.
    pub fn into_output(self) -> ColumnOutput {
        ColumnOutput {
            grids: self.grids,
            spawn_map: self.spawn_map,
            samples: self.samples,
        }
    }
}
