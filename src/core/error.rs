//! Error types for uitrace
//!
//! One error enum shared by the browser drivers, the execution engine and the CLI.

use thiserror::Error;

use crate::core::types::LocatorHints;

/// Main error type for uitrace operations
#[derive(Error, Debug)]
pub enum TraceError {
    /// The browser session could not be started
    #[error("Failed to open browser: {0}")]
    CapabilityOpenFailed(String),

    /// No locator strategy matched an element
    #[error("Could not find element for {hints}")]
    TargetNotFound { hints: LocatorHints },

    /// A step is missing a parameter its action needs
    #[error("Step '{action}' is missing required param '{key}'")]
    MissingRequiredParam { action: String, key: String },

    /// A step param is present but unusable
    #[error("Step '{action}' has invalid param '{key}': {value}")]
    InvalidParam {
        action: String,
        key: String,
        value: String,
    },

    /// A browser operation itself failed (timeout, driver error, ...)
    #[error("Browser operation '{operation}' failed: {message}")]
    CapabilityOperationFailed { operation: String, message: String },

    /// A run stopped at a step; carries the 1-based step index
    #[error("Step {index} failed: {source}")]
    StepFailed {
        index: usize,
        #[source]
        source: Box<TraceError>,
    },

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for uitrace operations
pub type Result<T> = std::result::Result<T, TraceError>;

impl TraceError {
    /// Create a browser operation error
    pub fn operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CapabilityOperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a missing param error
    pub fn missing_param(action: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingRequiredParam {
            action: action.into(),
            key: key.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error as the failure of step `index`
    pub fn at_step(index: usize, error: TraceError) -> Self {
        Self::StepFailed {
            index,
            source: Box::new(error),
        }
    }

    /// Step index for run failures, if any
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::StepFailed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The underlying error of a step failure, or `self`
    pub fn kind(&self) -> &TraceError {
        match self {
            Self::StepFailed { source, .. } => source.kind(),
            other => other,
        }
    }
}
