//! Integration tests for running phases through the public API.

use std::path::Path;
use std::sync::{Arc, Mutex};

use kickstartds::logging::{LogLevel, LogRecord, LogSink, Logger, LoggerRegistry, SinkKind};
use kickstartds::runner::{PhaseKind, PhaseSteps, ProgressDisplay, RunOptions, StepRunner};
use kickstartds::steps::{FnStep, StepCategory};
use kickstartds::telemetry::{Telemetry, TimingBackend, TimingPoint};
use kickstartds::workspace::WorkspaceManager;
use kickstartds::{KickstartError, Result};
use tempfile::TempDir;

#[derive(Default)]
struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl LogSink for CollectingSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn log(&self, record: &LogRecord) {
        self.messages.lock().unwrap().push(record.message.clone());
    }
}

#[derive(Clone, Default)]
struct RecordingBackend {
    points: Arc<Mutex<Vec<TimingPoint>>>,
    averages: Vec<(String, f64)>,
}

impl TimingBackend for RecordingBackend {
    fn write(&self, point: &TimingPoint) -> Result<()> {
        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }

    fn query_averages(&self, _module: &str, _command: &str) -> Result<Vec<(String, f64)>> {
        Ok(self.averages.clone())
    }
}

struct Setup {
    temp: TempDir,
    registry: LoggerRegistry,
    console: Arc<CollectingSink>,
    workspaces: WorkspaceManager,
}

fn setup() -> Setup {
    let temp = TempDir::new().unwrap();
    let console = Arc::new(CollectingSink::default());
    let sink = Arc::clone(&console);
    let registry = LoggerRegistry::new(temp.path())
        .with_console_factory(move || Arc::clone(&sink) as Arc<dyn LogSink>);
    let workspaces = WorkspaceManager::new(temp.path().join("tmp"));
    Setup {
        temp,
        registry,
        console,
        workspaces,
    }
}

fn logger(setup: &Setup) -> Logger {
    setup
        .registry
        .get_logger("tokens", LogLevel::Info, true, false, Some("compile"))
        .unwrap()
}

fn hidden() -> RunOptions {
    RunOptions {
        progress: ProgressDisplay::Hidden,
        ..Default::default()
    }
}

#[test]
fn forward_phase_records_timings_and_activates_progress() {
    let setup = setup();
    let backend = RecordingBackend {
        averages: vec![("compile".to_string(), 5000.0)],
        ..Default::default()
    };
    let telemetry = Telemetry::with_backend(Box::new(backend.clone()));

    let steps = PhaseSteps::new()
        .run(FnStep::boxed("check", |logger: &Logger, _: &Path| {
            logger.info("inputs present");
            Ok(true)
        }))
        .run(FnStep::boxed("compile", |_: &Logger, workspace: &Path| {
            std::fs::write(workspace.join("out.css"), ":root {}")?;
            Ok(true)
        }));

    let report = StepRunner::new(
        &setup.registry,
        logger(&setup),
        &telemetry,
        &setup.workspaces,
        "tokens",
        "compile",
    )
    .with_options(hidden())
    .start("site", &steps, false)
    .unwrap();

    assert_eq!(report.phase, PhaseKind::Forward);
    assert!(report.progress_active);
    let names: Vec<&str> = report.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["check", "compile"]);
    assert!(report.steps.iter().all(|s| s.category == StepCategory::Run));

    let workspace = setup.workspaces.path_for("tokens", "compile", "site");
    assert!(workspace.join("out.css").is_file());

    let points = backend.points.lock().unwrap();
    assert_eq!(points.len(), 1);
    let fields: Vec<&str> = points[0].fields.iter().map(|(k, _)| k.as_str()).collect();
    assert!(fields.contains(&"compile"));
}

#[test]
fn failing_check_stops_before_run_steps() {
    let setup = setup();
    let telemetry = Telemetry::disabled();
    let ran = Arc::new(Mutex::new(false));
    let ran_flag = Arc::clone(&ran);

    let steps = PhaseSteps::new()
        .check(FnStep::boxed("checkPrerequisites", |logger: &Logger, _: &Path| {
            logger.error("node is missing");
            Ok(false)
        }))
        .run(FnStep::boxed("compile", move |_: &Logger, _: &Path| {
            *ran_flag.lock().unwrap() = true;
            Ok(true)
        }));

    let err = StepRunner::new(
        &setup.registry,
        logger(&setup),
        &telemetry,
        &setup.workspaces,
        "tokens",
        "compile",
    )
    .with_options(hidden())
    .start("site", &steps, false)
    .unwrap_err();

    match err {
        KickstartError::StepFailed { step, .. } => assert_eq!(step, "check-prerequisites"),
        other => panic!("unexpected error {other}"),
    }
    assert!(!*ran.lock().unwrap());
    assert!(setup
        .console
        .messages
        .lock()
        .unwrap()
        .contains(&"node is missing".to_string()));
    assert_ne!(
        std::env::current_dir().unwrap(),
        setup.workspaces.path_for("tokens", "compile", "site")
    );
}

#[test]
fn revert_runs_only_revert_steps() {
    let setup = setup();
    let telemetry = Telemetry::disabled();

    let steps = PhaseSteps::new()
        .check(FnStep::boxed("check", |_: &Logger, _: &Path| Ok(false)))
        .revert(FnStep::boxed("removeOutput", |_: &Logger, _: &Path| Ok(true)));

    let report = StepRunner::new(
        &setup.registry,
        logger(&setup),
        &telemetry,
        &setup.workspaces,
        "tokens",
        "compile",
    )
    .with_options(hidden())
    .start("site", &steps, true)
    .unwrap();

    assert_eq!(report.phase, PhaseKind::Revert);
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].name, "remove-output");
    assert!(!report.progress_active);
    assert!(setup.temp.path().join("tmp").is_dir());
}
