//! Browser driver - wraps agent-browser CLI
//!
//! Every operation is one agent-browser subcommand run against a named session.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::browser::{Browser, ElementHandle, Locator};
use crate::core::config::BrowserConfig;
use crate::core::{Result, TraceError};

/// Driver for real browser automation via agent-browser CLI
pub struct AgentBrowser {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Upper bound for a single command
    command_timeout: Duration,
    /// Set once a session launch was attempted
    started: bool,
}

impl AgentBrowser {
    /// Create a new driver for a session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            headed: false,
            command_timeout: Duration::from_millis(30000),
            started: false,
        }
    }

    /// Create a driver from configuration
    pub fn from_config(config: &BrowserConfig) -> Self {
        let mut browser = Self::new(config.session_name.clone());
        browser.headed = config.headed;
        browser.command_timeout = Duration::from_millis(config.timeout_ms);
        browser
    }

    /// Set headed mode
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Translate a locator into a Playwright selector string
    fn selector_for(locator: &Locator) -> String {
        match locator {
            Locator::Text(text) => format!("text={}", text),
            Locator::Placeholder(placeholder) => {
                format!("[placeholder=\"{}\"]", escape_quotes(placeholder))
            }
            Locator::Role { role, name } => {
                format!("role={}[name=\"{}\"]", role, escape_quotes(name))
            }
            Locator::Selector(selector) => selector.clone(),
        }
    }

    /// Run an agent-browser command
    async fn run_command(&self, operation: &str, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        debug!(session = %self.session_name, ?args, "agent-browser");

        let output = match timeout(self.command_timeout, cmd.output()).await {
            Ok(output) => output.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TraceError::AgentBrowserNotFound
                } else {
                    TraceError::operation(operation, format!("Failed to run agent-browser: {}", e))
                }
            })?,
            Err(_) => {
                return Err(TraceError::operation(
                    operation,
                    format!("timed out after {}ms", self.command_timeout.as_millis()),
                ))
            }
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TraceError::operation(
                operation,
                format!("agent-browser command failed: {}", stderr.trim()),
            ))
        }
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl Browser for AgentBrowser {
    async fn open(&mut self) -> Result<()> {
        if !Self::is_available().await {
            return Err(TraceError::CapabilityOpenFailed(
                TraceError::AgentBrowserNotFound.to_string(),
            ));
        }

        // The daemon may come up even if this command fails, so close must run.
        self.started = true;
        self.run_command("open", &["open", "about:blank"])
            .await
            .map_err(|e| TraceError::CapabilityOpenFailed(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.run_command("close", &["close"]).await?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.run_command("navigate", &["open", url]).await?;
        self.run_command("navigate", &["wait", "--load", "domcontentloaded"])
            .await?;
        Ok(())
    }

    async fn query(&mut self, locator: &Locator) -> Result<Vec<String>> {
        let selector = Self::selector_for(locator);
        let output = self
            .run_command("query", &["get", "count", &selector])
            .await?;
        let count: usize = output.trim().parse().map_err(|_| {
            TraceError::operation("query", format!("unexpected count output: {}", output.trim()))
        })?;

        Ok((0..count)
            .map(|i| format!("{} >> nth={}", selector, i))
            .collect())
    }

    async fn click(&mut self, target: &ElementHandle) -> Result<()> {
        self.run_command("click", &["click", &target.target]).await?;
        Ok(())
    }

    async fn fill(&mut self, target: &ElementHandle, value: &str) -> Result<()> {
        self.run_command("fill", &["fill", &target.target, value])
            .await?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout_ms: u64) -> Result<()> {
        match timeout(
            Duration::from_millis(timeout_ms),
            self.run_command("wait_for", &["wait", selector]),
        )
        .await
        {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(TraceError::operation(
                "wait_for",
                format!("'{}' did not appear within {}ms", selector, timeout_ms),
            )),
        }
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let path_str = path.to_string_lossy();
        self.run_command("screenshot", &["screenshot", &path_str, "--full"])
            .await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.run_command("current_url", &["get", "url"])
            .await
            .map(|s| s.trim().to_string())
    }

    fn name(&self) -> &str {
        "agent-browser"
    }
}

impl Default for AgentBrowser {
    fn default() -> Self {
        Self::new("uitrace")
    }
}
