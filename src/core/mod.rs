//! Core module - shared infrastructure for uitrace
//!
//! This module contains the plan and record types, configuration, and error
//! handling used throughout the crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Result, TraceError};
pub use types::*;
