//! Rule-based planner
//!
//! Matches keywords in the request against a few known workflows and falls
//! back to a generic "open and capture" plan.

use crate::core::{ActionKind, Plan, Step};
use crate::planner::Planner;

/// Planner driven by literal keyword rules
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePlanner;

impl RulePlanner {
    pub fn new() -> Self {
        Self
    }

    fn linear_create_project() -> Vec<Step> {
        vec![
            Step::new(ActionKind::OpenUrl, "Open Linear workspace")
                .param("url", "https://linear.app")
                .captured(),
            Step::new(ActionKind::Click, "Open Projects section")
                .param("text", "Projects")
                .captured(),
            Step::new(ActionKind::Click, "Click 'Create project' button")
                .param("text", "Create project")
                .captured(),
            Step::new(ActionKind::Fill, "Fill project name")
                .param("placeholder", "Name")
                .param("value", "Demo Project")
                .captured(),
            Step::new(ActionKind::Click, "Submit project form")
                .param("text", "Create")
                .captured(),
            Step::new(ActionKind::Screenshot, "Capture success state / created project")
                .param("label", "project_created")
                .captured(),
        ]
    }

    fn notion_filter_database() -> Vec<Step> {
        vec![
            Step::new(ActionKind::OpenUrl, "Open Notion workspace (database view)")
                .param("url", "https://www.notion.so")
                .captured(),
            Step::new(ActionKind::Click, "Open database filter menu")
                .param("text", "Filter")
                .captured(),
            Step::new(ActionKind::Click, "Add filter condition")
                .param("text", "Add filter")
                .captured(),
            Step::new(ActionKind::Screenshot, "Capture filtered database state")
                .param("label", "filtered_state")
                .captured(),
        ]
    }

    fn generic() -> Vec<Step> {
        vec![
            Step::new(ActionKind::OpenUrl, "Open homepage")
                .param("url", "https://example.com")
                .captured(),
            Step::new(ActionKind::Screenshot, "Capture initial state")
                .param("label", "initial_state")
                .captured(),
        ]
    }
}

impl Planner for RulePlanner {
    fn plan(&self, app_name: &str, request: &str) -> Plan {
        let req = request.to_lowercase();

        let steps = if req.contains("linear") && req.contains("project") {
            Self::linear_create_project()
        } else if req.contains("notion") && req.contains("filter") {
            Self::notion_filter_database()
        } else {
            Self::generic()
        };

        Plan {
            app_name: app_name.to_string(),
            original_request: request.to_string(),
            steps,
        }
    }
}
