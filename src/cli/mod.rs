//! CLI module - glue between the binary and the engine

pub mod runner;

pub use runner::{init_logging, run_task_for_request, TaskRequest};
