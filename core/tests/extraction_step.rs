mod common;

use std::ffi::OsString;
use std::sync::Arc;

use common::{zip_bytes, CountingSource, ScriptedRunner, Workspace};
use pretty_assertions::assert_eq;
use ripkit_core::api::{
    AssetExtractionStep, ExtractionSettings, FetchError, RecordingReporter, RunError, Step,
    StepError, StepOutcome,
};
use ripkit_core::error::step::Stage;

fn step(
    settings: ExtractionSettings,
    runner: &Arc<ScriptedRunner>,
    source: &Arc<CountingSource>,
) -> AssetExtractionStep {
    AssetExtractionStep::new(settings, runner.clone(), source.clone())
}

#[tokio::test]
async fn any_missing_required_path_fails_without_side_effects() {
    let strip: [fn(&mut ExtractionSettings); 4] = [
        |s| s.tool.executable = None,
        |s| s.paths.input = None,
        |s| s.paths.output = None,
        |s| s.paths.run_config = None,
    ];

    for remove in strip {
        let ws = Workspace::new();
        let mut settings = ws.settings();
        remove(&mut settings);
        let runner = Arc::new(ScriptedRunner::with_lines(&["Exporting"]));
        let source = Arc::new(CountingSource::default());
        let reporter = RecordingReporter::new();

        let outcome = step(settings, &runner, &source).run(&reporter).await;

        let err = outcome.failure().expect("validation must fail");
        assert!(
            matches!(err, StepError::ConfigurationMissing { .. }),
            "{err}"
        );
        assert_eq!(err.stage(), Stage::Validation);
        assert_eq!(runner.start_count(), 0);
        assert_eq!(source.calls(), 0);
        assert!(!ws.run_config.exists());
        assert!(!ws.output.exists());
        assert!(!ws.install_dir.exists());
        assert!(reporter.titles().is_empty());
    }
}

#[tokio::test]
async fn installed_tool_runs_with_positional_arguments() {
    let ws = Workspace::new();
    ws.install_tool();
    let mut settings = ws.settings();
    settings
        .run_config
        .insert("ScriptExportMode".into(), toml::Value::String("Decompiled".into()));
    let runner = Arc::new(ScriptedRunner::with_lines(&["Exporting a", "Exporting b"]));
    let source = Arc::new(CountingSource::default());
    let reporter = RecordingReporter::new();

    let outcome = step(settings, &runner, &source).run(&reporter).await;

    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(source.calls(), 0);

    let start = runner.last_start().unwrap();
    assert_eq!(start.cmd, ws.executable);
    assert_eq!(
        start.args,
        vec![
            OsString::from(&ws.run_config),
            OsString::from(&ws.output),
            OsString::from(&ws.input),
        ]
    );

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ws.run_config).unwrap()).unwrap();
    assert_eq!(written["ScriptExportMode"], "Decompiled");
    assert!(ws.output.is_dir());
    assert!(!reporter.is_active());
}

#[tokio::test]
async fn missing_tool_is_fetched_once_then_reused() {
    let ws = Workspace::new();
    let runner = Arc::new(ScriptedRunner::with_lines(&["Exporting a"]));
    let source = Arc::new(CountingSource::serving(zip_bytes(&[(
        "ripper",
        b"#!/bin/sh\nexit 0\n",
    )])));
    let reporter = RecordingReporter::new();
    let step = step(ws.settings(), &runner, &source);

    assert!(step.run(&reporter).await.is_success());
    assert!(ws.executable.is_file());
    assert!(!ws.temp_archive().exists());

    assert!(step.run(&reporter).await.is_success());
    assert_eq!(source.calls(), 1);
    assert_eq!(runner.start_count(), 2);
}

#[tokio::test]
async fn corrupt_archive_fails_in_extraction_and_leaves_no_temp_file() {
    let ws = Workspace::new();
    let runner = Arc::new(ScriptedRunner::with_lines(&[]));
    let source = Arc::new(CountingSource::serving(b"not a zip at all".to_vec()));
    let reporter = RecordingReporter::new();

    let outcome = step(ws.settings(), &runner, &source).run(&reporter).await;

    let err = outcome.failure().expect("fetch must fail");
    assert!(
        matches!(err, StepError::Fetch(FetchError::ExtractionFailed { .. })),
        "{err}"
    );
    assert_eq!(err.stage(), Stage::Extraction);
    assert!(!ws.temp_archive().exists());
    assert_eq!(runner.start_count(), 0);
    assert!(!reporter.is_active());
}

#[tokio::test]
async fn non_zero_exit_maps_to_failure_with_code_and_stderr() {
    let ws = Workspace::new();
    ws.install_tool();
    let runner = Arc::new(ScriptedRunner::with_lines(&["Exporting a"]).exiting(7, "disk full"));
    let source = Arc::new(CountingSource::default());

    let outcome = step(ws.settings(), &runner, &source)
        .run(&RecordingReporter::new())
        .await;

    let err = outcome.failure().expect("run must fail");
    let cause = err.to_string();
    assert!(cause.contains('7'), "{cause}");
    assert!(cause.contains("disk full"), "{cause}");
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn cancellation_is_a_distinct_failure() {
    let ws = Workspace::new();
    ws.install_tool();
    let lines: Vec<String> = (1..=8).map(|i| format!("Exporting {i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let runner = Arc::new(ScriptedRunner::with_lines(&refs));
    let source = Arc::new(CountingSource::default());
    let reporter = RecordingReporter::cancel_after(3);

    let outcome = step(ws.settings(), &runner, &source).run(&reporter).await;

    let err = outcome.failure().expect("cancelled run is not a success");
    assert!(matches!(err, StepError::Run(RunError::Cancelled)), "{err}");
    assert!(err.is_cancelled());
    assert_eq!(runner.kill_count(), 1);
    assert_eq!(reporter.labels().len(), 4);
    assert!(!reporter.is_active());
}

#[tokio::test]
async fn repeated_runs_do_not_depend_on_previous_output() {
    let ws = Workspace::new();
    ws.install_tool();
    std::fs::create_dir_all(ws.output.join("Assets/Stale")).unwrap();
    std::fs::write(ws.output.join("Assets/Stale/old.asset"), b"old").unwrap();

    let runner = Arc::new(ScriptedRunner::with_lines(&["Exporting a"]));
    let source = Arc::new(CountingSource::default());
    let step = step(ws.settings(), &runner, &source);

    let first = step.run(&RecordingReporter::new()).await;
    assert!(!ws.output.join("Assets").exists());
    std::fs::write(ws.output.join("leftover.txt"), b"from run one").unwrap();
    let second = step.run(&RecordingReporter::new()).await;

    assert!(first.is_success());
    assert!(second.is_success());
    assert!(!ws.output.join("leftover.txt").exists());
    assert!(ws.output.is_dir());
}

#[tokio::test]
async fn step_never_requests_a_host_restart() {
    let ws = Workspace::new();
    ws.install_tool();
    let runner = Arc::new(ScriptedRunner::with_lines(&["done"]));
    let source = Arc::new(CountingSource::default());

    let outcome = step(ws.settings(), &runner, &source)
        .run(&RecordingReporter::new())
        .await;

    assert!(!matches!(outcome, StepOutcome::RequiresHostRestart));
}
