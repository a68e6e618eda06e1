//! # Field Sample Task
//!
//! Computes the coarse samples of one field of a column, a z-slice of
//! lattice points at a time.

use std::sync::Arc;

use log::debug;

use crate::{
    core::MtResource,
    terrain_state::{
        generation::sample_region::SampleRegion,
        noise::HashTable,
        task_management::{
            budget::WorkBudget,
            task::{Task, TaskProgress, TaskResult},
        },
    },
};

/// A task that fills a field's coarse sample grid.
///
/// Sets the field's `sampled` flag when the last slice is done, which is
/// what the matching [`super::FieldExpansionTask`] waits for.
pub struct FieldSampleTask {
    /// Permutation table of the world
    table: Arc<HashTable>,
    /// The field being sampled
    field: MtResource<SampleRegion>,
    /// Next lattice z-slice to sample
    next_slice: i32,
}

impl FieldSampleTask {
    /// Creates a new field sample task.
    ///
    /// # Arguments
    /// * `table` - The world's permutation table
    /// * `field` - Shared handle to the field's sample region
    pub fn new(table: Arc<HashTable>, field: MtResource<SampleRegion>) -> Self {
        FieldSampleTask {
            table,
            field,
            next_slice: 0,
        }
    }
}

impl Task for FieldSampleTask {
    /// Samples slices until the budget runs out or the grid is full.
    ///
    /// # Returns
    /// `Complete` once every slice is sampled and the flag is set
    fn step(&mut self, budget: &WorkBudget) -> TaskProgress {
        let timer = budget.start();
        let mut region = self.field.get_mut();
        let total = region.sample_slices();

        while self.next_slice < total {
            region.sample_slice(&self.table, self.next_slice);
            self.next_slice += 1;
            if self.next_slice < total && timer.exhausted() {
                return TaskProgress::Pending;
            }
        }

        region.mark_sampled();
        TaskProgress::Complete
    }

    fn finish(self: Box<Self>) -> Box<dyn TaskResult> {
        Box::new(FieldTaskResult {
            stage: "sampled",
            slices: self.next_slice,
        })
    }
}

/// The result of a field sample or expansion task.
///
/// The flags on the shared region already carry the outcome, so there is
/// nothing left to apply.
pub struct FieldTaskResult {
    pub(super) stage: &'static str,
    pub(super) slices: i32,
}

impl TaskResult for FieldTaskResult {
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>> {
        debug!("Field {} ({} slices)", self.stage, self.slices);
        Vec::new()
    }
}
