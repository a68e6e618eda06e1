//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: A resumable unit of work, advanced one budgeted step at a time
//! - `TaskResult`: The output of a finished task, applied on the owning thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is published via `TaskManager::publish_task()`
//! 2. A worker (or the owning thread) calls `step()` with a work budget
//! 3. A `Pending` task goes back into the queue and is stepped again later
//! 4. A `Complete` task is turned into a `TaskResult` with `finish()`
//! 5. The result's `handle_result()` runs on the owning thread and may publish new tasks
//!
//! Waiting on another task is a step that checks a flag and returns
//! `Pending` without doing work. There is no blocking wait and no
//! cancellation: a started task always runs to completion, and stale output
//! is discarded when its result is handled.
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the owning thread
//! - All shared state must be properly synchronized

use super::budget::WorkBudget;

/// Whether a task needs another step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskProgress {
    /// More work remains, or the task is waiting on another task.
    Pending,
    /// The task is done and can be finished.
    Complete,
}

/// A resumable unit of work.
///
/// Tasks own everything they need or hold `MtResource` handles to shared
/// state. They should do a bounded amount of work per step so no step
/// monopolises a worker or a frame.
pub trait Task: Send {
    /// Advances the task.
    ///
    /// # Arguments
    /// * `budget` - How long this step may run before yielding
    ///
    /// # Returns
    /// [`TaskProgress::Complete`] once `finish` may be called.
    fn step(&mut self, budget: &WorkBudget) -> TaskProgress;

    /// Converts a completed task into its result.
    fn finish(self: Box<Self>) -> Box<dyn TaskResult>;

    /// Short name for logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Steps the task with an unbounded budget until it completes.
    ///
    /// Only valid for tasks whose dependencies are already satisfied;
    /// a task waiting on work that nothing else advances would spin forever.
    fn run_blocking(mut self: Box<Self>) -> Box<dyn TaskResult> {
        let budget = WorkBudget::unbounded();
        while self.step(&budget) == TaskProgress::Pending {}
        self.finish()
    }
}

/// The output of a finished [`Task`].
///
/// Results are handled on the thread that owns the `TaskManager`. That is
/// where shared state is updated and follow-up work is published.
pub trait TaskResult: Send {
    /// Applies the result.
    ///
    /// # Returns
    /// Tasks to publish next (can be empty).
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>>;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    /// Counts to a target one unit per step, then reports into a shared counter.
    pub(crate) struct CountingTask {
        pub remaining: usize,
        pub finished: Arc<AtomicUsize>,
        pub follow_ups: usize,
    }

    impl Task for CountingTask {
        fn step(&mut self, _budget: &WorkBudget) -> TaskProgress {
            if self.remaining == 0 {
                return TaskProgress::Complete;
            }
            self.remaining -= 1;
            if self.remaining == 0 {
                TaskProgress::Complete
            } else {
                TaskProgress::Pending
            }
        }

        fn finish(self: Box<Self>) -> Box<dyn TaskResult> {
            Box::new(CountingResult {
                finished: self.finished,
                follow_ups: self.follow_ups,
            })
        }
    }

    pub(crate) struct CountingResult {
        finished: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    impl TaskResult for CountingResult {
        fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>> {
            self.finished.fetch_add(1, Ordering::SeqCst);
            (0..self.follow_ups)
                .map(|_| {
                    Box::new(CountingTask {
                        remaining: 2,
                        finished: self.finished.clone(),
                        follow_ups: 0,
                    }) as Box<dyn Task>
                })
                .collect()
        }
    }

    #[test]
    fn run_blocking_drives_to_completion() {
        let finished = Arc::new(AtomicUsize::new(0));
        let task = Box::new(CountingTask {
            remaining: 5,
            finished: finished.clone(),
            follow_ups: 0,
        });
        let result = task.run_blocking();
        assert!(result.handle_result().is_empty());
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
