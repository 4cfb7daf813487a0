//! Shared types used across uitrace modules
//!
//! Contains the action plan handed to the executor and the execution record it produces.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of UI action a step performs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Navigate to `params.url`
    OpenUrl,
    /// Click the element described by the locator params
    Click,
    /// Type `params.value` into the element described by the locator params
    Fill,
    /// Wait for `params.selector` to appear
    WaitFor,
    /// Marker step; capture is driven by the step's `capture` flag
    Screenshot,
    /// An action name this build does not know; skipped at run time
    Unrecognized(String),
}

impl ActionKind {
    /// Wire name of the action
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::OpenUrl => "open_url",
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::WaitFor => "wait_for",
            ActionKind::Screenshot => "screenshot",
            ActionKind::Unrecognized(name) => name.as_str(),
        }
    }
}

impl From<String> for ActionKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "open_url" => ActionKind::OpenUrl,
            "click" => ActionKind::Click,
            "fill" => ActionKind::Fill,
            "wait_for" => ActionKind::WaitFor,
            "screenshot" => ActionKind::Screenshot,
            _ => ActionKind::Unrecognized(name),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub action: ActionKind,
    /// Human readable description
    pub description: String,
    /// Action specific parameters
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Snapshot the page after this step
    #[serde(default)]
    pub capture: bool,
}

impl Step {
    /// Create a step with no params and no capture
    pub fn new(action: ActionKind, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            params: Map::new(),
            capture: false,
        }
    }

    /// Add a param
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Request a capture after this step
    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Get a string param by key
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    /// Screenshot label, if the step names one
    pub fn label(&self) -> Option<&str> {
        self.get_string("label").filter(|l| !l.is_empty())
    }

    /// Locator hints from the params, excluding payload keys such as `value`
    pub fn locator_hints(&self) -> LocatorHints {
        LocatorHints {
            text: self.get_string("text").map(str::to_string),
            placeholder: self.get_string("placeholder").map(str::to_string),
            role: self.get_string("role").map(str::to_string),
            selector: self.get_string("selector").map(str::to_string),
        }
    }
}

/// An ordered list of steps for one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub app_name: String,
    pub original_request: String,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(app_name: impl Into<String>, original_request: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            original_request: original_request.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// Loose attributes used to find one UI element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl LocatorHints {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.placeholder.is_none()
            && self.role.is_none()
            && self.selector.is_none()
    }
}

impl fmt::Display for LocatorHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| match v {
            Some(s) => format!("{:?}", s),
            None => "None".to_string(),
        };
        write!(
            f,
            "text={}, placeholder={}, role={}, selector={}",
            show(&self.text),
            show(&self.placeholder),
            show(&self.role),
            show(&self.selector)
        )
    }
}

/// What happened at one executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step index
    pub index: usize,
    pub description: String,
    pub action: ActionKind,
    pub params: Map<String, Value>,
    /// Browser location after the step ran
    pub url: String,
    /// Screenshot path, `null` when the step was not captured
    pub screenshot: Option<String>,
}

/// Metadata for one task run, persisted as `meta.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub task_id: String,
    pub app_name: String,
    pub original_request: String,
    pub created_at: String,
    pub steps: Vec<StepRecord>,
}

impl ExecutionRecord {
    /// Start an empty record for a plan, stamped with the current UTC time
    pub fn start(plan: &Plan, task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            app_name: plan.app_name.clone(),
            original_request: plan.original_request.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            steps: Vec::new(),
        }
    }
}
