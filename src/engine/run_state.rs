//! Run state management
//!
//! Tracks the phase of a task run and the execution record built along the way.

use crate::core::{ExecutionRecord, Plan, StepRecord};

/// Phase of a task run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    /// Browser `open` in progress
    Opening,
    /// Executing the step with this 1-based index
    Running(usize),
    /// Closing after every step ran
    ClosingOk,
    /// Closing after a failure
    ClosingErr,
    /// Record persisted
    Done,
}

/// State of one task run
#[derive(Debug, Clone)]
pub struct RunState {
    pub phase: RunPhase,
    pub record: ExecutionRecord,
}

impl RunState {
    /// Create the state for a run of `plan`
    pub fn new(plan: &Plan, task_id: &str) -> Self {
        Self {
            phase: RunPhase::NotStarted,
            record: ExecutionRecord::start(plan, task_id),
        }
    }

    /// Move to the next phase
    pub fn enter(&mut self, phase: RunPhase) {
        self.phase = phase;
    }

    /// Append the record of a finished step
    pub fn push_step(&mut self, step: StepRecord) {
        debug_assert_eq!(step.index, self.record.steps.len() + 1);
        self.record.steps.push(step);
    }

    /// Number of steps recorded so far
    pub fn completed_steps(&self) -> usize {
        self.record.steps.len()
    }
}
