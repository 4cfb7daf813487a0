//! uitrace - scripted browser runs recorded as dataset entries
//!
//! Turns a natural-language request into an ordered plan of UI actions,
//! executes it against a browser and records a screenshot/metadata trace of
//! every step under `<out_dir>/<app>/<task_id>/`.
//!
//! # Architecture
//!
//! - **Core**: Plan and record types, configuration, and error handling
//! - **Browser**: The browser capability trait with a real and a mock driver
//! - **Engine**: Target resolution, state capture, and the task executor
//! - **Planner**: Request to plan mapping
//! - **CLI**: Logging setup and the task runner used by the binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use uitrace::browser::MockBrowser;
//! use uitrace::engine::TaskExecutor;
//! use uitrace::planner::{Planner, RulePlanner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let plan = RulePlanner::new().plan("linear", "How do I create a project in Linear?");
//!     let mut executor = TaskExecutor::new(MockBrowser::new(), "dataset");
//!     executor.run(&plan, "demo_task").await.unwrap();
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod core;
pub mod engine;
pub mod planner;

// Re-export commonly used items
pub use crate::core::{Config, Plan, Result, Step, TraceError};
pub use engine::TaskExecutor;
