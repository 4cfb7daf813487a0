//! Stand-in browser that logs calls instead of driving a real one
//!
//! Lets the executor run end to end without a browser. Optionally serves a
//! fake page so target resolution can be exercised against known elements.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::browser::{Browser, ElementHandle, Locator};
use crate::core::{Result, TraceError};

/// An element on the fake page
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub id: String,
    pub text: Option<String>,
    pub placeholder: Option<String>,
    pub role: Option<String>,
    pub selector: Option<String>,
}

impl MockElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Text(text) => self
                .text
                .as_deref()
                .is_some_and(|t| contains_ignore_case(t, text)),
            Locator::Placeholder(placeholder) => {
                self.placeholder.as_deref() == Some(placeholder.as_str())
            }
            Locator::Role { role, name } => {
                self.role.as_deref() == Some(role.as_str())
                    && self
                        .text
                        .as_deref()
                        .is_some_and(|t| contains_ignore_case(t, name))
            }
            Locator::Selector(selector) => self.selector.as_deref() == Some(selector.as_str()),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A call received by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Open,
    Close,
    Navigate(String),
    Query(Locator),
    Click(ElementHandle),
    Fill { target: ElementHandle, value: String },
    WaitFor { selector: String, timeout_ms: u64 },
    Screenshot(PathBuf),
}

/// Browser stand-in for tests and dry runs
#[derive(Debug)]
pub struct MockBrowser {
    url: String,
    page: Option<Vec<MockElement>>,
    calls: Vec<MockCall>,
    fail_open: bool,
    fail_operation: Option<String>,
}

impl MockBrowser {
    /// A mock where every locator matches one synthetic element
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            page: None,
            calls: Vec::new(),
            fail_open: false,
            fail_operation: None,
        }
    }

    /// A mock serving a fixed page; locators only match these elements
    pub fn with_page(elements: Vec<MockElement>) -> Self {
        Self {
            page: Some(elements),
            ..Self::new()
        }
    }

    /// Make `open` fail
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make one operation (e.g. "navigate", "wait_for") fail
    pub fn failing_on(mut self, operation: impl Into<String>) -> Self {
        self.fail_operation = Some(operation.into());
        self
    }

    /// All calls received so far
    pub fn calls(&self) -> &[MockCall] {
        &self.calls
    }

    /// Number of `close` calls received
    pub fn close_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MockCall::Close))
            .count()
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.fail_operation.as_deref() == Some(operation) {
            return Err(TraceError::operation(operation, "injected failure"));
        }
        Ok(())
    }
}

impl Default for MockBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn open(&mut self) -> Result<()> {
        info!("[MockBrowser] open");
        self.calls.push(MockCall::Open);
        if self.fail_open {
            return Err(TraceError::CapabilityOpenFailed(
                "mock configured to fail".to_string(),
            ));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        info!("[MockBrowser] close");
        self.calls.push(MockCall::Close);
        self.check("close")
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        info!(url, "[MockBrowser] navigate");
        self.calls.push(MockCall::Navigate(url.to_string()));
        self.check("navigate")?;
        self.url = url.to_string();
        Ok(())
    }

    async fn query(&mut self, locator: &Locator) -> Result<Vec<String>> {
        self.calls.push(MockCall::Query(locator.clone()));
        self.check("query")?;
        let matches = match &self.page {
            None => vec![format!("mock:{}", locator.strategy())],
            Some(elements) => elements
                .iter()
                .filter(|e| e.matches(locator))
                .map(|e| e.id.clone())
                .collect(),
        };
        info!(%locator, count = matches.len(), "[MockBrowser] query");
        Ok(matches)
    }

    async fn click(&mut self, target: &ElementHandle) -> Result<()> {
        info!(target = %target.target, hints = %target.hints, "[MockBrowser] click");
        self.calls.push(MockCall::Click(target.clone()));
        self.check("click")
    }

    async fn fill(&mut self, target: &ElementHandle, value: &str) -> Result<()> {
        info!(target = %target.target, hints = %target.hints, value, "[MockBrowser] fill");
        self.calls.push(MockCall::Fill {
            target: target.clone(),
            value: value.to_string(),
        });
        self.check("fill")
    }

    async fn wait_for(&mut self, selector: &str, timeout_ms: u64) -> Result<()> {
        info!(selector, timeout_ms, "[MockBrowser] wait_for");
        self.calls.push(MockCall::WaitFor {
            selector: selector.to_string(),
            timeout_ms,
        });
        self.check("wait_for")
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "[MockBrowser] screenshot");
        self.calls.push(MockCall::Screenshot(path.to_path_buf()));
        self.check("screenshot")?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, b"mock screenshot").await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.check("current_url")?;
        Ok(self.url.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
