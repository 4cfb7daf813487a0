//! Task execution engine
//!
//! Runs a plan against a browser and writes the resulting dataset entry.

pub mod capture;
pub mod dataset;
pub mod executor;
pub mod observer;
pub mod resolver;
pub mod run_state;

pub use dataset::TaskLayout;
pub use executor::TaskExecutor;
pub use observer::{RunObserver, TracingObserver};
pub use run_state::{RunPhase, RunState};
