//! Task executor
//!
//! Walks a plan one step at a time against a browser, captures screenshots
//! where asked, and persists the execution record as a dataset entry.
//!
//! The browser is opened once per run and closed exactly once on every exit
//! path. A failing step stops the run; the steps completed before it are
//! still written to `meta.json` before the error is returned.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::browser::Browser;
use crate::core::config::DEFAULT_WAIT_TIMEOUT_MS;
use crate::core::{ActionKind, Plan, Result, Step, StepRecord, TraceError};
use crate::engine::capture::{capture, fallback_label};
use crate::engine::dataset::{self, TaskLayout};
use crate::engine::observer::{RunObserver, TracingObserver};
use crate::engine::resolver;
use crate::engine::run_state::{RunPhase, RunState};

/// Outcome of dispatching one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Executed,
    Skipped,
}

/// Executes plans against a browser and records UI states
pub struct TaskExecutor<B: Browser> {
    browser: B,
    out_dir: PathBuf,
    /// Timeout for `wait_for` steps without a `timeout` param
    wait_timeout_ms: u64,
    observer: Box<dyn RunObserver>,
}

impl<B: Browser> TaskExecutor<B> {
    /// Create an executor writing dataset entries under `out_dir`
    pub fn new(browser: B, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            browser,
            out_dir: out_dir.into(),
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            observer: Box::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Set the timeout used by `wait_for` steps that don't carry one
    pub fn with_default_wait_timeout(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Where the dataset entry of a run will be written
    pub fn layout(&self, plan: &Plan, task_id: &str) -> TaskLayout {
        TaskLayout::new(&self.out_dir, &plan.app_name, task_id)
    }

    /// Execute `plan` as task `task_id`.
    ///
    /// Fails with [`TraceError::CapabilityOpenFailed`] if the browser can't
    /// start, or [`TraceError::StepFailed`] naming the first step that failed.
    pub async fn run(&mut self, plan: &Plan, task_id: &str) -> Result<()> {
        let layout = self.layout(plan, task_id);
        let mut state = RunState::new(plan, task_id);
        self.observer.run_started(task_id, plan.steps.len());

        self.enter(&mut state, RunPhase::Opening);
        let outcome = match self.open(&layout).await {
            Ok(()) => self.run_steps(plan, &layout, &mut state).await,
            Err(e) => Err(e),
        };

        let closing = if outcome.is_ok() {
            RunPhase::ClosingOk
        } else {
            RunPhase::ClosingErr
        };
        self.enter(&mut state, closing);
        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            warn!(
                task_id,
                browser = self.browser.name(),
                phase = ?state.phase,
                "Failed to close browser: {}",
                e
            );
        }

        let persisted = dataset::write_record(&layout, &state.record).await;
        self.enter(&mut state, RunPhase::Done);

        let result = match outcome {
            Ok(()) => persisted.map(|_| ()).and(closed),
            Err(err) => {
                if let Err(e) = persisted {
                    error!(
                        task_id,
                        steps = state.completed_steps(),
                        "Failed to persist partial record: {}",
                        e
                    );
                }
                Err(err)
            }
        };

        match &result {
            Ok(()) => self.observer.run_completed(task_id, layout.task_dir()),
            Err(e) => self.observer.run_failed(task_id, e),
        }
        result
    }

    fn enter(&mut self, state: &mut RunState, phase: RunPhase) {
        state.enter(phase);
        self.observer.phase_changed(&state.record.task_id, state.phase);
    }

    async fn open(&mut self, layout: &TaskLayout) -> Result<()> {
        tokio::fs::create_dir_all(layout.steps_dir()).await?;
        self.browser.open().await.map_err(|e| match e {
            TraceError::CapabilityOpenFailed(_) => e,
            other => TraceError::CapabilityOpenFailed(other.to_string()),
        })
    }

    async fn run_steps(
        &mut self,
        plan: &Plan,
        layout: &TaskLayout,
        state: &mut RunState,
    ) -> Result<()> {
        let steps_dir = layout.steps_dir();

        for (i, step) in plan.steps.iter().enumerate() {
            let index = i + 1;
            self.enter(state, RunPhase::Running(index));
            self.observer.step_started(index, step);

            let record = self
                .execute_step(index, step, &steps_dir)
                .await
                .map_err(|e| TraceError::at_step(index, e))?;

            self.observer.step_completed(&record);
            state.push_step(record);
        }

        Ok(())
    }

    async fn execute_step(
        &mut self,
        index: usize,
        step: &Step,
        steps_dir: &Path,
    ) -> Result<StepRecord> {
        if self.dispatch(step).await? == Dispatch::Skipped {
            self.observer.step_skipped(index, step);
        }

        let screenshot = if step.capture {
            let label = step
                .label()
                .map(str::to_string)
                .unwrap_or_else(|| fallback_label(index));
            Some(capture(&mut self.browser, steps_dir, index, &label).await?)
        } else {
            None
        };

        let url = self.browser.current_url().await?;

        Ok(StepRecord {
            index,
            description: step.description.clone(),
            action: step.action.clone(),
            params: step.params.clone(),
            url,
            screenshot: screenshot.map(|p| p.display().to_string()),
        })
    }

    async fn dispatch(&mut self, step: &Step) -> Result<Dispatch> {
        match &step.action {
            ActionKind::OpenUrl => {
                let url = require(step, "url")?;
                self.browser.navigate(url).await?;
            }
            ActionKind::Click => {
                let target = resolver::resolve(&mut self.browser, &step.locator_hints()).await?;
                self.browser.click(&target).await?;
            }
            ActionKind::Fill => {
                let value = param_text(step, "value")?;
                let target = resolver::resolve(&mut self.browser, &step.locator_hints()).await?;
                self.browser.fill(&target, &value).await?;
            }
            ActionKind::WaitFor => {
                let selector = require(step, "selector")?;
                let timeout_ms = self.wait_timeout(step)?;
                self.browser.wait_for(selector, timeout_ms).await?;
            }
            ActionKind::Screenshot => {
                debug!("Explicit screenshot step (captured through the step's capture flag)");
            }
            ActionKind::Unrecognized(_) => return Ok(Dispatch::Skipped),
        }
        Ok(Dispatch::Executed)
    }

    fn wait_timeout(&self, step: &Step) -> Result<u64> {
        let Some(value) = step.params.get("timeout") else {
            return Ok(self.wait_timeout_ms);
        };
        match value {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_millis)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_millis))
            }
            _ => None,
        }
        .ok_or_else(|| invalid_param(step, "timeout", value))
    }
}

/// A string param the action can't run without
fn require<'a>(step: &'a Step, key: &str) -> Result<&'a str> {
    match step.params.get(key) {
        None => Err(TraceError::missing_param(step.action.as_str(), key)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(invalid_param(step, key, other)),
    }
}

/// An optional scalar param rendered as text; absent means empty
fn param_text(step: &Step, key: &str) -> Result<String> {
    match step.params.get(key) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(invalid_param(step, key, other)),
    }
}

fn invalid_param(step: &Step, key: &str, value: &Value) -> TraceError {
    TraceError::InvalidParam {
        action: step.action.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Milliseconds from a float, if it is a non-negative whole number
fn whole_millis(ms: f64) -> Option<u64> {
    (ms.is_finite() && ms >= 0.0 && ms.fract() == 0.0 && ms <= u64::MAX as f64)
        .then_some(ms as u64)
}
