//! Task runner used by the binary
//!
//! Plans (or loads) a task, picks a browser driver and runs the executor.

use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::browser::{AgentBrowser, Browser, MockBrowser};
use crate::core::{Config, Plan, Result};
use crate::engine::TaskExecutor;
use crate::planner::{Planner, RulePlanner};

/// What to run
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub app_name: String,
    pub request: String,
    pub task_id: String,
    /// Run this plan file instead of planning the request
    pub plan_file: Option<PathBuf>,
    /// Use the stand-in driver instead of agent-browser
    pub mock: bool,
}

/// Install the global tracing subscriber
pub fn init_logging(debug: bool) {
    let default = if debug { "uitrace=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Read a plan from a JSON file
pub fn load_plan(path: &Path) -> Result<Plan> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Plan and execute one task, returning the dataset directory
pub async fn run_task_for_request(config: &Config, task: &TaskRequest) -> Result<PathBuf> {
    let plan = match &task.plan_file {
        Some(path) => {
            info!(path = %path.display(), "Loading plan");
            load_plan(path)?
        }
        None => RulePlanner::new().plan(&task.app_name, &task.request),
    };

    info!(
        app = %plan.app_name,
        steps = plan.steps.len(),
        "Planned: {}",
        plan.original_request
    );

    if task.mock {
        execute(MockBrowser::new(), config, &plan, &task.task_id).await
    } else {
        execute(
            AgentBrowser::from_config(&config.browser),
            config,
            &plan,
            &task.task_id,
        )
        .await
    }
}

async fn execute<B: Browser>(
    browser: B,
    config: &Config,
    plan: &Plan,
    task_id: &str,
) -> Result<PathBuf> {
    let mut executor = TaskExecutor::new(browser, &config.dataset.out_dir)
        .with_default_wait_timeout(config.executor.wait_timeout_ms);
    executor.run(plan, task_id).await?;
    Ok(executor.layout(plan, task_id).task_dir().to_path_buf())
}
