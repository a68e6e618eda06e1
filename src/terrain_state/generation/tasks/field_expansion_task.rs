//! # Field Expansion Task
//!
//! Interpolates a field's coarse samples into its dense grid. The task
//! polls the field's `sampled` flag and does nothing until it is set.

use crate::{
    core::MtResource,
    terrain_state::{
        generation::sample_region::SampleRegion,
        task_management::{
            budget::WorkBudget,
            task::{Task, TaskProgress, TaskResult},
        },
    },
};

use super::field_sample_task::FieldTaskResult;

/// A task that expands a sampled field into dense density values.
pub struct FieldExpansionTask {
    /// The field being expanded
    field: MtResource<SampleRegion>,
    /// Next coarse cell z-slice to expand
    next_slice: i32,
}

impl FieldExpansionTask {
    /// Creates a new field expansion task.
    ///
    /// # Arguments
    /// * `field` - Shared handle to the same region its sample task fills
    pub fn new(field: MtResource<SampleRegion>) -> Self {
        FieldExpansionTask { field, next_slice: 0 }
    }
}

impl Task for FieldExpansionTask {
    /// Waits for sampling, then expands cell slices within the budget.
    ///
    /// # Returns
    /// `Complete` once the dense grid is populated and the flag is set
    fn step(&mut self, budget: &WorkBudget) -> TaskProgress {
        if !self.field.get().is_sampled() {
            return TaskProgress::Pending;
        }

        let timer = budget.start();
        let mut region = self.field.get_mut();
        let total = region.expand_slices();

        while self.next_slice < total {
            region.expand_slice(self.next_slice);
            self.next_slice += 1;
            if self.next_slice < total && timer.exhausted() {
                return TaskProgress::Pending;
            }
        }

        region.mark_complete();
        TaskProgress::Complete
    }

    fn finish(self: Box<Self>) -> Box<dyn TaskResult> {
        Box::new(FieldTaskResult {
            stage: "expanded",
            slices: self.next_slice,
        })
    }
}
