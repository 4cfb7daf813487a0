//! Task executor integration tests
//!
//! Runs plans end to end against the mock browser and inspects the dataset
//! entry left on disk.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;
use uitrace::browser::{Locator, MockBrowser, MockCall, MockElement};
use uitrace::core::{ActionKind, ExecutionRecord, LocatorHints, Plan, Step, StepRecord, TraceError};
use uitrace::engine::{RunObserver, RunPhase, TaskExecutor};

/// Observer that keeps event names and phases, shared with the test
#[derive(Clone, Default)]
struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
    phases: Arc<Mutex<Vec<RunPhase>>>,
}

impl EventLog {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn phases(&self) -> Vec<RunPhase> {
        self.phases.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl RunObserver for EventLog {
    fn run_started(&mut self, task_id: &str, total_steps: usize) {
        self.push(format!("run_started:{}:{}", task_id, total_steps));
    }

    fn phase_changed(&mut self, _task_id: &str, phase: RunPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn step_started(&mut self, index: usize, _step: &Step) {
        self.push(format!("step_started:{}", index));
    }

    fn step_completed(&mut self, record: &StepRecord) {
        self.push(format!("step_completed:{}", record.index));
    }

    fn step_skipped(&mut self, index: usize, _step: &Step) {
        self.push(format!("step_skipped:{}", index));
    }

    fn run_completed(&mut self, task_id: &str, _task_dir: &Path) {
        self.push(format!("run_completed:{}", task_id));
    }

    fn run_failed(&mut self, task_id: &str, error: &TraceError) {
        self.push(format!("run_failed:{}:{:?}", task_id, error.step_index()));
    }
}

fn read_meta(out_dir: &Path, app: &str, task_id: &str) -> ExecutionRecord {
    let path = out_dir.join(app).join(task_id).join("meta.json");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing {}: {}", path.display(), e));
    serde_json::from_str(&content).unwrap()
}

fn linear_page() -> Vec<MockElement> {
    vec![
        MockElement::new("nav-projects").text("Projects").role("link"),
        MockElement::new("new-project").text("New project").role("button"),
        MockElement::new("name-input").placeholder("Name").selector("#project-name"),
        MockElement::new("submit").text("Create").role("button"),
    ]
}

#[tokio::test]
async fn test_record_matches_plan_on_success() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("linear", "create a project")
        .step(Step::new(ActionKind::OpenUrl, "Open Linear").param("url", "https://linear.app"))
        .step(Step::new(ActionKind::Click, "Open projects").param("text", "Projects").captured())
        .step(
            Step::new(ActionKind::Fill, "Name it")
                .param("placeholder", "Name")
                .param("value", "Demo"),
        )
        .step(Step::new(ActionKind::WaitFor, "Wait for form").param("selector", "#project-name"))
        .step(Step::new(ActionKind::Screenshot, "Final").param("label", "done").captured());

    let mut executor = TaskExecutor::new(MockBrowser::with_page(linear_page()), tmp.path());
    executor.run(&plan, "task-1").await.unwrap();

    let record = read_meta(tmp.path(), "linear", "task-1");
    assert_eq!(record.task_id, "task-1");
    assert_eq!(record.app_name, "linear");
    assert_eq!(record.original_request, "create a project");
    assert_eq!(record.steps.len(), plan.steps.len());

    for (i, (step, rec)) in plan.steps.iter().zip(&record.steps).enumerate() {
        assert_eq!(rec.index, i + 1);
        assert_eq!(rec.description, step.description);
        assert_eq!(rec.action, step.action);
        assert_eq!(rec.params, step.params);
        assert_eq!(rec.url, "https://linear.app");
    }
}

#[tokio::test]
async fn test_capture_flag_controls_screenshots() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("demo", "capture some")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test").captured())
        .step(Step::new(ActionKind::Screenshot, "Not captured"))
        .step(Step::new(ActionKind::Screenshot, "Captured without label").captured());

    let mut executor = TaskExecutor::new(MockBrowser::new(), tmp.path());
    executor.run(&plan, "t").await.unwrap();

    let record = read_meta(tmp.path(), "demo", "t");
    for rec in &record.steps {
        let step = &plan.steps[rec.index - 1];
        match &rec.screenshot {
            Some(path) => {
                assert!(step.capture);
                let path = PathBuf::from(path);
                assert!(path.parent().unwrap().is_dir());
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                assert!(name.starts_with(&format!("{:02}_", rec.index)));
            }
            None => assert!(!step.capture),
        }
    }

    let last = record.steps[2].screenshot.as_deref().unwrap();
    assert!(last.ends_with("03_step_3.png"));

    let raw: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(tmp.path().join("demo/t/meta.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(raw["steps"][1]["screenshot"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_scenario_open_url_with_label() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("x", "open x").step(
        Step::new(ActionKind::OpenUrl, "Open x")
            .param("url", "https://x.test")
            .param("label", "home")
            .captured(),
    );

    let mut executor = TaskExecutor::new(MockBrowser::new(), tmp.path());
    executor.run(&plan, "a").await.unwrap();

    let record = read_meta(tmp.path(), "x", "a");
    assert_eq!(record.steps.len(), 1);
    assert_eq!(record.steps[0].url, "https://x.test");

    let shot = tmp.path().join("x").join("a").join("steps").join("01_home.png");
    assert!(shot.exists());
    assert_eq!(record.steps[0].screenshot.as_deref(), Some(shot.display().to_string().as_str()));

    let files: Vec<_> = std::fs::read_dir(tmp.path().join("x/a/steps")).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_scenario_fill_strips_value_from_hints() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("crm", "add a company").step(
        Step::new(ActionKind::Fill, "Company name")
            .param("placeholder", "Name")
            .param("value", "Acme"),
    );

    let mut executor = TaskExecutor::new(MockBrowser::new(), tmp.path());
    executor.run(&plan, "b").await.unwrap();

    let fill = executor
        .browser()
        .calls()
        .iter()
        .find_map(|c| match c {
            MockCall::Fill { target, value } => Some((target.clone(), value.clone())),
            _ => None,
        })
        .expect("fill was called");

    assert_eq!(fill.1, "Acme");
    assert_eq!(
        fill.0.hints,
        LocatorHints {
            placeholder: Some("Name".to_string()),
            ..Default::default()
        }
    );
    assert_eq!(fill.0.locator, Locator::Placeholder("Name".to_string()));

    // the persisted params are the original ones
    let record = read_meta(tmp.path(), "crm", "b");
    assert_eq!(record.steps[0].params["value"], json!("Acme"));
}

#[tokio::test]
async fn test_scenario_target_not_found_at_step_three() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("linear", "create a project")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://linear.app"))
        .step(Step::new(ActionKind::Click, "Projects").param("text", "Projects"))
        .step(Step::new(ActionKind::Click, "Archive").param("text", "Archive everything"))
        .step(Step::new(ActionKind::Click, "Create").param("text", "Create"));

    let log = EventLog::default();
    let mut executor = TaskExecutor::new(MockBrowser::with_page(linear_page()), tmp.path())
        .with_observer(log.clone());
    let err = executor.run(&plan, "c").await.unwrap_err();

    assert_eq!(err.step_index(), Some(3));
    match err.kind() {
        TraceError::TargetNotFound { hints } => {
            assert_eq!(hints.text.as_deref(), Some("Archive everything"))
        }
        other => panic!("unexpected error: {other}"),
    }

    let record = read_meta(tmp.path(), "linear", "c");
    assert_eq!(record.steps.len(), 2);

    let browser = executor.browser();
    assert_eq!(browser.close_count(), 1);
    assert_eq!(browser.calls().last(), Some(&MockCall::Close));

    // step 4 never ran
    let clicks = browser
        .calls()
        .iter()
        .filter(|c| matches!(c, MockCall::Click(_)))
        .count();
    assert_eq!(clicks, 1);
    assert!(!browser
        .calls()
        .iter()
        .any(|c| matches!(c, MockCall::Query(Locator::Text(t)) if t == "Create")));

    let events = log.events();
    assert_eq!(events.last().map(String::as_str), Some("run_failed:c:Some(3)"));
    assert!(!events.contains(&"step_started:4".to_string()));
}

#[tokio::test]
async fn test_scenario_wait_for_default_timeout() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "wait")
        .step(Step::new(ActionKind::WaitFor, "Wait for list").param("selector", ".list"))
        .step(
            Step::new(ActionKind::WaitFor, "Wait for detail")
                .param("selector", ".detail")
                .param("timeout", 250),
        );

    let mut executor = TaskExecutor::new(MockBrowser::new(), tmp.path());
    executor.run(&plan, "d").await.unwrap();

    let waits: Vec<_> = executor
        .browser()
        .calls()
        .iter()
        .filter_map(|c| match c {
            MockCall::WaitFor {
                selector,
                timeout_ms,
            } => Some((selector.as_str(), *timeout_ms)),
            _ => None,
        })
        .collect();
    assert_eq!(waits, vec![(".list", 5000), (".detail", 250)]);
}

#[tokio::test]
async fn test_close_called_once_on_success() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "open").step(
        Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test"),
    );

    let mut executor = TaskExecutor::new(MockBrowser::new(), tmp.path());
    executor.run(&plan, "ok").await.unwrap();

    let browser = executor.into_browser();
    assert_eq!(browser.close_count(), 1);
    assert_eq!(browser.calls().first(), Some(&MockCall::Open));
    assert_eq!(browser.calls().last(), Some(&MockCall::Close));
}

#[tokio::test]
async fn test_operation_failure_stops_run() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "wait then open")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test"))
        .step(Step::new(ActionKind::WaitFor, "Wait").param("selector", "#never"))
        .step(Step::new(ActionKind::OpenUrl, "Open again").param("url", "https://y.test"));

    let mut executor = TaskExecutor::new(MockBrowser::new().failing_on("wait_for"), tmp.path());
    let err = executor.run(&plan, "e").await.unwrap_err();

    assert_eq!(err.step_index(), Some(2));
    assert!(matches!(
        err.kind(),
        TraceError::CapabilityOperationFailed { operation, .. } if operation == "wait_for"
    ));
    assert_eq!(executor.browser().close_count(), 1);
    assert!(!executor
        .browser()
        .calls()
        .contains(&MockCall::Navigate("https://y.test".to_string())));

    let record = read_meta(tmp.path(), "app", "e");
    assert_eq!(record.steps.len(), 1);
}

#[tokio::test]
async fn test_close_failure_after_success_is_reported() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "open twice")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test"))
        .step(Step::new(ActionKind::OpenUrl, "Open again").param("url", "https://y.test"));

    let log = EventLog::default();
    let mut executor = TaskExecutor::new(MockBrowser::new().failing_on("close"), tmp.path())
        .with_observer(log.clone());
    let err = executor.run(&plan, "c").await.unwrap_err();

    assert_eq!(err.step_index(), None);
    assert!(matches!(
        &err,
        TraceError::CapabilityOperationFailed { operation, .. } if operation == "close"
    ));
    assert_eq!(executor.browser().close_count(), 1);
    assert_eq!(read_meta(tmp.path(), "app", "c").steps.len(), 2);
    assert_eq!(
        log.phases(),
        vec![
            RunPhase::Opening,
            RunPhase::Running(1),
            RunPhase::Running(2),
            RunPhase::ClosingOk,
            RunPhase::Done,
        ]
    );
    assert_eq!(log.events().last().map(String::as_str), Some("run_failed:c:None"));
}

#[tokio::test]
async fn test_close_failure_does_not_mask_step_failure() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "open without url")
        .step(Step::new(ActionKind::OpenUrl, "Open"));

    let log = EventLog::default();
    let mut executor = TaskExecutor::new(MockBrowser::new().failing_on("close"), tmp.path())
        .with_observer(log.clone());
    let err = executor.run(&plan, "m").await.unwrap_err();

    assert_eq!(err.step_index(), Some(1));
    assert!(matches!(
        err.kind(),
        TraceError::MissingRequiredParam { key, .. } if key == "url"
    ));
    assert_eq!(executor.browser().close_count(), 1);
    assert!(read_meta(tmp.path(), "app", "m").steps.is_empty());
    assert_eq!(
        log.phases(),
        vec![
            RunPhase::Opening,
            RunPhase::Running(1),
            RunPhase::ClosingErr,
            RunPhase::Done,
        ]
    );
}

#[tokio::test]
async fn test_screenshot_failure_keeps_earlier_steps() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "open and capture")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test"))
        .step(
            Step::new(ActionKind::OpenUrl, "Open detail")
                .param("url", "https://x.test/detail")
                .captured(),
        )
        .step(Step::new(ActionKind::OpenUrl, "Open more").param("url", "https://x.test/more"));

    let mut executor =
        TaskExecutor::new(MockBrowser::new().failing_on("screenshot"), tmp.path());
    let err = executor.run(&plan, "s").await.unwrap_err();

    assert_eq!(err.step_index(), Some(2));
    assert!(matches!(
        err.kind(),
        TraceError::CapabilityOperationFailed { operation, .. } if operation == "screenshot"
    ));
    assert_eq!(executor.browser().close_count(), 1);
    assert!(!executor
        .browser()
        .calls()
        .contains(&MockCall::Navigate("https://x.test/more".to_string())));

    let record = read_meta(tmp.path(), "app", "s");
    assert_eq!(record.steps.len(), 1);
    assert_eq!(record.steps[0].url, "https://x.test");
}

#[tokio::test]
async fn test_current_url_failure_fails_the_step() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "open")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test"));

    let mut executor =
        TaskExecutor::new(MockBrowser::new().failing_on("current_url"), tmp.path());
    let err = executor.run(&plan, "u").await.unwrap_err();

    assert_eq!(err.step_index(), Some(1));
    assert!(matches!(
        err.kind(),
        TraceError::CapabilityOperationFailed { operation, .. } if operation == "current_url"
    ));
    assert_eq!(executor.browser().close_count(), 1);
    assert!(read_meta(tmp.path(), "app", "u").steps.is_empty());
}

#[tokio::test]
async fn test_open_failure_persists_empty_record() {
    let tmp = TempDir::new().unwrap();
    let plan = Plan::new("app", "never runs")
        .step(Step::new(ActionKind::OpenUrl, "Open").param("url", "https://x.test"));

    let mut executor = TaskExecutor::new(MockBrowser::new().failing_open(), tmp.path());
    let err = executor.run(&plan, "f").await.unwrap_err();

    assert!(matches!(err, TraceError::CapabilityOpenFailed(_)));
    assert_eq!(err.step_index(), None);
    assert_eq!(
        executor.browser().calls(),
        &[MockCall::Open, MockCall::Close]
    );

    let record = read_meta(tmp.path(), "app", "f");
    assert!(record.steps.is_empty());
}

#[tokio::test]
async fn test_unknown_action_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let plan: Plan = serde_json::from_value(json!({
        "app_name": "app",
        "original_request": "hover then open",
        "steps": [
            {"action": "hover", "description": "Hover the menu", "params": {"text": "Menu"}},
            {"action": "open_url", "description": "Open", "params": {"url": "https://x.test"}}
        ]
    }))
    .unwrap();

    let log = EventLog::default();
    let mut executor = TaskExecutor::new(MockBrowser::new(), tmp.path()).with_observer(log.clone());
    executor.run(&plan, "g").await.unwrap();

    let record = read_meta(tmp.path(), "app", "g");
    assert_eq!(record.steps.len(), 2);
    assert_eq!(record.steps[0].action, ActionKind::Unrecognized("hover".to_string()));
    assert_eq!(record.steps[0].url, "about:blank");
    assert_eq!(record.steps[1].url, "https://x.test");

    assert_eq!(
        log.events(),
        vec![
            "run_started:g:2",
            "step_started:1",
            "step_skipped:1",
            "step_completed:1",
            "step_started:2",
            "step_completed:2",
            "run_completed:g",
        ]
    );
}

#[tokio::test]
async fn test_independent_runs_do_not_share_state() {
    let tmp = TempDir::new().unwrap();
    let plan_a = Plan::new("app", "a")
        .step(Step::new(ActionKind::OpenUrl, "Open a").param("url", "https://a.test").captured());
    let plan_b = Plan::new("app", "b")
        .step(Step::new(ActionKind::OpenUrl, "Open b").param("url", "https://b.test").captured());

    let out_a = tmp.path().join("a");
    let out_b = tmp.path().join("b");
    let mut exec_a = TaskExecutor::new(MockBrowser::new(), &out_a);
    let mut exec_b = TaskExecutor::new(MockBrowser::new(), &out_b);

    let (ra, rb) = tokio::join!(exec_a.run(&plan_a, "t"), exec_b.run(&plan_b, "t"));
    ra.unwrap();
    rb.unwrap();

    assert_eq!(read_meta(&out_a, "app", "t").steps[0].url, "https://a.test");
    assert_eq!(read_meta(&out_b, "app", "t").steps[0].url, "https://b.test");
}
