//! Run lifecycle observer
//!
//! The executor reports progress through a [`RunObserver`] instead of printing.

use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::core::{Step, StepRecord, TraceError};
use crate::engine::run_state::RunPhase;

/// Callbacks at defined points of a task run. All methods default to no-ops.
pub trait RunObserver: Send {
    fn run_started(&mut self, _task_id: &str, _total_steps: usize) {}

    /// The run moved to `phase`
    fn phase_changed(&mut self, _task_id: &str, _phase: RunPhase) {}

    fn step_started(&mut self, _index: usize, _step: &Step) {}

    fn step_completed(&mut self, _record: &StepRecord) {}

    /// A step with an unknown action was skipped
    fn step_skipped(&mut self, _index: usize, _step: &Step) {}

    fn run_completed(&mut self, _task_id: &str, _task_dir: &Path) {}

    fn run_failed(&mut self, _task_id: &str, _error: &TraceError) {}
}

/// Observer that emits tracing events
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn run_started(&mut self, task_id: &str, total_steps: usize) {
        info!(task_id, total_steps, "Starting task");
    }

    fn phase_changed(&mut self, task_id: &str, phase: RunPhase) {
        debug!(task_id, ?phase, "Run phase");
    }

    fn step_started(&mut self, index: usize, step: &Step) {
        info!(step = index, action = %step.action, "Step {}: {}", index, step.description);
    }

    fn step_completed(&mut self, record: &StepRecord) {
        info!(
            step = record.index,
            url = %record.url,
            screenshot = record.screenshot.as_deref().unwrap_or("-"),
            "Step complete"
        );
    }

    fn step_skipped(&mut self, index: usize, step: &Step) {
        warn!(step = index, action = %step.action, "Unknown action, skipping");
    }

    fn run_completed(&mut self, task_id: &str, task_dir: &Path) {
        info!(task_id, "Finished task. Dataset at: {}", task_dir.display());
    }

    fn run_failed(&mut self, task_id: &str, err: &TraceError) {
        error!(task_id, step = err.step_index(), "Task failed: {}", err);
    }
}
