//! # Work Budgets
//!
//! Per-step and per-frame time limits for cooperative tasks.

use std::time::Duration;

use web_time::Instant;

/// How long a task may run before it should yield.
///
/// Tasks poll a [`BudgetTimer`] between units of work (a scan row, a slice,
/// a voxel column) and return once it reports exhaustion. At least one unit
/// is always performed, so every step makes progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkBudget {
    limit: Option<Duration>,
}

impl WorkBudget {
    /// A budget of `limit` wall-clock time per step.
    pub fn new(limit: Duration) -> Self {
        WorkBudget { limit: Some(limit) }
    }

    /// A budget in microseconds; zero means unbounded.
    pub fn from_micros(micros: u64) -> Self {
        if micros == 0 {
            WorkBudget::unbounded()
        } else {
            WorkBudget::new(Duration::from_micros(micros))
        }
    }

    /// A budget that never runs out: tasks finish in one step.
    pub fn unbounded() -> Self {
        WorkBudget { limit: None }
    }

    /// Starts measuring a step.
    pub fn start(&self) -> BudgetTimer {
        BudgetTimer {
            started: Instant::now(),
            limit: self.limit,
        }
    }

    /// The configured limit.
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

/// A running step's clock.
#[derive(Debug)]
pub struct BudgetTimer {
    started: Instant,
    limit: Option<Duration>,
}

impl BudgetTimer {
    /// Whether the step has used up its budget.
    pub fn exhausted(&self) -> bool {
        match self.limit {
            Some(limit) => self.started.elapsed() >= limit,
            None => false,
        }
    }

    /// Time spent so far.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
