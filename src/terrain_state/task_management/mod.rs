//! # Task Management System
//!
//! Runs cooperative, budgeted tasks either on a pool of worker threads or
//! inline on the owning thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A resumable unit of work, stepped under a `WorkBudget`
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the owning thread and one worker
//!
//! ## Threaded Mode
//! - One OS thread per worker, each fed through its own channel
//! - Each worker steps the task it receives exactly once and sends it back,
//!   either still pending or finished into a result
//! - Pending tasks re-enter the queue, so a task waiting on another task
//!   never occupies a worker between polls
//!
//! ## Inline Mode
//! - Selected with zero workers
//! - `process_queued_tasks()` steps queued tasks on the calling thread until
//!   the queue drains or the frame budget is spent
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands tasks to worker channels round-robin
//! 3. Workers step tasks and return them
//! 4. Outcomes are collected on the owning thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks
//! 6. The cycle continues until all work is complete
//!
//! ## Example Usage
//! ```rust
//! use voxel_terrain::terrain_state::task_management::{budget::WorkBudget, TaskManager};
//!
//! let mut task_manager = TaskManager::new(2, WorkBudget::from_micros(500), WorkBudget::from_micros(4_000));
//!
//! // In your main loop:
//! task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! assert!(task_manager.is_idle());
//! ```

pub mod budget;
pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use budget::WorkBudget;
use log::{debug, error, info, warn};
use task::{Task, TaskProgress, TaskResult};
use web_time::Instant;

/// What a worker sends back after stepping a task.
pub enum TaskOutcome {
    /// The task needs more steps.
    Pending(Box<dyn Task>),
    /// The task finished.
    Complete(Box<dyn TaskResult>),
}

/// Steps a task once and classifies the outcome.
fn step_task(mut task: Box<dyn Task>, budget: &WorkBudget) -> TaskOutcome {
    match task.step(budget) {
        TaskProgress::Pending => TaskOutcome::Pending(task),
        TaskProgress::Complete => {
            debug!("Finished {}", task.name());
            TaskOutcome::Complete(task.finish())
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        /// Worker count used when the configuration does not pin one.
        pub fn default_worker_count() -> usize {
            1
        }
    } else {
        /// Worker count used when the configuration does not pin one: all
        /// cores but the one driving the manager.
        pub fn default_worker_count() -> usize {
            thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(1)
        }
    }
}

/// A communication channel between the owning thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owning thread to the worker
/// - `outcome_receiver`: Receives stepped tasks and results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined on drop
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Option<Sender<Box<dyn Task>>>,
    outcome_receiver: Receiver<TaskOutcome>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TaskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskOutcome::Pending(task) => write!(f, "Pending({})", task.name()),
            TaskOutcome::Complete(_) => write!(f, "Complete"),
        }
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Re-queuing tasks that are still pending
/// - Collecting and processing task results
/// - Running tasks inline when there are no workers
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    current_channel: usize,
    step_budget: WorkBudget,
    frame_budget: WorkBudget,
    completed: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a worker never sits on queued work while another is idle.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; zero runs every task inline
    /// * `step_budget` - Budget handed to each `Task::step`
    /// * `frame_budget` - Total inline work per `process_queued_tasks` call
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize, step_budget: WorkBudget, frame_budget: WorkBudget) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} task workers, available parallelism: {:?}",
                num_workers,
                thread::available_parallelism()
            );
        } else {
            info!("Running tasks inline on the owning thread");
        }

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (outcome_tx, outcome_rx) = channel::<TaskOutcome>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    if outcome_tx.send(step_task(task, &step_budget)).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: Some(task_tx),
                outcome_receiver: outcome_rx,
                num_tasks_in_flight: 0,
                worker: Some(worker),
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            step_budget,
            frame_budget,
            completed: 0,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks that have finished since creation.
    pub fn completed_count(&self) -> usize {
        self.completed
    }

    /// Tasks waiting for a worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// `true` when nothing is queued and no worker holds a task.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self
                .channels
                .iter()
                .all(|channel| channel.num_tasks_in_flight == 0)
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (e.g., worker disconnected)
    fn try_send_task(&mut self, task: Box<dyn Task>, channel_idx: usize) -> Result<(), Box<dyn Task>> {
        let channel = &mut self.channels[channel_idx];
        let Some(sender) = channel.task_sender.as_ref() else {
            return Err(task);
        };
        match sender.send(task) {
            Ok(()) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(error) => Err(error.0),
        }
    }

    /// Finds an available worker channel using round-robin from the last used one.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel below `MAX_TASKS_IN_FLIGHT`
    /// - `None` if all channels are busy or there are no channels
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| {
                let channel = &self.channels[idx];
                channel.task_sender.is_some() && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Whether any worker can still take tasks.
    fn has_live_workers(&self) -> bool {
        self.channels.iter().any(|channel| channel.task_sender.is_some())
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if it was queued
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    warn!("Worker {} disconnected, queuing {}", channel_idx, task.name());
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto free workers, or steps them inline when there are none.
    ///
    /// Inline stepping stops once the frame budget is spent. Pending tasks
    /// go to the back of the queue so every queued task gets a turn.
    pub fn process_queued_tasks(&mut self) {
        if self.queued_tasks.is_empty() {
            return;
        }

        if !self.has_live_workers() {
            self.run_inline();
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    fn run_inline(&mut self) {
        let frame = self.frame_budget.start();
        let queued = self.queued_tasks.len();
        let mut stepped = 0;

        while let Some(task) = self.queued_tasks.pop_front() {
            match step_task(task, &self.step_budget) {
                TaskOutcome::Pending(task) => self.queued_tasks.push_back(task),
                TaskOutcome::Complete(result) => {
                    self.completed += 1;
                    self.queued_tasks.extend(result.handle_result());
                }
            }
            stepped += 1;
            // Each task present at entry gets at least one step per call.
            if stepped >= queued && frame.exhausted() {
                break;
            }
        }
    }

    /// Collects outcomes from the workers.
    ///
    /// Pending tasks are re-published; results are handled here, on the
    /// owning thread, and any tasks they return are published.
    pub fn process_completed_tasks(&mut self) {
        let mut tasks_to_queue = Vec::new();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.outcome_receiver.try_recv() {
                    Ok(TaskOutcome::Pending(task)) => {
                        channel.num_tasks_in_flight -= 1;
                        tasks_to_queue.push(task);
                    }
                    Ok(TaskOutcome::Complete(result)) => {
                        channel.num_tasks_in_flight -= 1;
                        self.completed += 1;
                        tasks_to_queue.extend(result.handle_result());
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // The worker is gone and so are the tasks it held.
                        if channel.task_sender.take().is_some() {
                            error!(
                                "Task worker {} stopped, dropping {} tasks in flight",
                                index, channel.num_tasks_in_flight
                            );
                        }
                        channel.num_tasks_in_flight = 0;
                        break;
                    }
                }
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// Drives every task, including follow-ups, until the manager is idle.
    ///
    /// # Returns
    /// Wall-clock time spent.
    pub fn run_until_idle(&mut self) -> std::time::Duration {
        let started = Instant::now();
        while !self.is_idle() {
            self.process_completed_tasks();
            self.process_queued_tasks();
            if !self.channels.is_empty() {
                thread::yield_now();
            }
        }
        started.elapsed()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for channel in &mut self.channels {
            // Closing the sender ends the worker's receive loop.
            channel.task_sender.take();
        }
        for channel in &mut self.channels {
            if let Some(worker) = channel.worker.take() {
                if worker.join().is_err() {
                    warn!("A task worker panicked");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::task::tests::CountingTask;
    use super::*;

    fn counting(remaining: usize, finished: &Arc<AtomicUsize>, follow_ups: usize) -> Box<dyn Task> {
        Box::new(CountingTask {
            remaining,
            finished: finished.clone(),
            follow_ups,
        })
    }

    #[test]
    fn inline_manager_runs_everything() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(0, WorkBudget::unbounded(), WorkBudget::unbounded());
        for _ in 0..4 {
            manager.publish_task(counting(3, &finished, 1));
        }
        manager.run_until_idle();
        assert_eq!(finished.load(Ordering::SeqCst), 8);
        assert_eq!(manager.completed_count(), 8);
        assert!(manager.is_idle());
    }

    #[test]
    fn threaded_manager_runs_everything() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(3, WorkBudget::unbounded(), WorkBudget::unbounded());
        for _ in 0..10 {
            manager.publish_task(counting(4, &finished, 2));
        }
        manager.run_until_idle();
        assert_eq!(finished.load(Ordering::SeqCst), 30);
        assert!(manager.is_idle());
    }

    #[test]
    fn busy_workers_queue_tasks() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(1, WorkBudget::unbounded(), WorkBudget::unbounded());
        assert!(manager.publish_task(counting(1, &finished, 0)));
        assert!(!manager.publish_task(counting(1, &finished, 0)));
        assert_eq!(manager.queued_count(), 1);
        manager.run_until_idle();
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    struct PanickingTask;

    impl Task for PanickingTask {
        fn step(&mut self, _budget: &WorkBudget) -> TaskProgress {
            panic!("step failed");
        }

        fn finish(self: Box<Self>) -> Box<dyn TaskResult> {
            unreachable!()
        }
    }

    #[test]
    fn dead_workers_fall_back_to_inline() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(1, WorkBudget::unbounded(), WorkBudget::unbounded());
        assert!(manager.publish_task(Box::new(PanickingTask)));
        manager.publish_task(counting(2, &finished, 1));
        manager.publish_task(counting(2, &finished, 0));

        manager.run_until_idle();
        assert!(manager.is_idle());
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn default_worker_count_is_positive() {
        assert!(default_worker_count() >= 1);
    }
}
