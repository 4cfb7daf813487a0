//! Browser capability
//!
//! The executor drives a browser only through the [`Browser`] trait. Two
//! drivers ship with the crate: [`AgentBrowser`] wraps the agent-browser CLI,
//! [`MockBrowser`] logs calls and returns synthetic values for tests.

mod agent_browser;
mod mock;

pub use agent_browser::AgentBrowser;
pub use mock::{MockBrowser, MockCall, MockElement};

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use crate::core::{LocatorHints, Result};

/// A single element lookup strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Substring match on visible text
    Text(String),
    /// Match on the placeholder attribute
    Placeholder(String),
    /// ARIA role plus accessible name
    Role { role: String, name: String },
    /// Raw CSS selector
    Selector(String),
}

impl Locator {
    /// Strategy name, used in logs
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Text(_) => "text",
            Locator::Placeholder(_) => "placeholder",
            Locator::Role { .. } => "role",
            Locator::Selector(_) => "selector",
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Text(text) => write!(f, "text={:?}", text),
            Locator::Placeholder(p) => write!(f, "placeholder={:?}", p),
            Locator::Role { role, name } => write!(f, "role={} name={:?}", role, name),
            Locator::Selector(s) => write!(f, "selector={:?}", s),
        }
    }
}

/// An element picked by the target resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Strategy that found the element
    pub locator: Locator,
    /// Driver specific reference to the element
    pub target: String,
    /// The full hint bundle the element was resolved from
    pub hints: LocatorHints,
}

/// Operations the task executor needs from a browser
///
/// `open` and `close` bracket one task run. `close` must be safe to call
/// after a failed or partial `open`.
#[async_trait]
pub trait Browser: Send {
    /// Start the browser session
    async fn open(&mut self) -> Result<()>;

    /// Tear the session down
    async fn close(&mut self) -> Result<()>;

    /// Navigate and wait for the document to be ready
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// References of all elements matching `locator`, in document order
    async fn query(&mut self, locator: &Locator) -> Result<Vec<String>>;

    /// Click a resolved element
    async fn click(&mut self, target: &ElementHandle) -> Result<()>;

    /// Type `value` into a resolved element
    async fn fill(&mut self, target: &ElementHandle, value: &str) -> Result<()>;

    /// Wait until `selector` is present, failing after `timeout_ms`
    async fn wait_for(&mut self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Save a full page screenshot to `path`
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// Current page location
    async fn current_url(&mut self) -> Result<String>;

    /// Driver name
    fn name(&self) -> &str;
}
