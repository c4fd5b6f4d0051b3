mod common;

use common::RecordingEnvironment;
use pretty_assertions::assert_eq;
use proving_ground_runner::prelude::{
    finalize, load_report, run_all, HookResult, ScenarioDefinition,
};

fn pass(_env: &mut RecordingEnvironment) -> HookResult {
    Ok(())
}

fn fail(_env: &mut RecordingEnvironment) -> HookResult {
    anyhow::bail!("expected output was not produced")
}

fn record_label(label: &'static str) -> impl FnOnce(&mut RecordingEnvironment) -> HookResult {
    move |env: &mut RecordingEnvironment| {
        env.events.push(label.to_string());
        Ok(())
    }
}

#[test]
fn runs_in_declared_order_with_one_reset_each() {
    let mut env = RecordingEnvironment::default();
    let runs = vec![
        ScenarioDefinition::new("third_alphabetically_first", record_label("c")),
        ScenarioDefinition::new("a_second", record_label("a")),
        ScenarioDefinition::new("b_third", record_label("b")),
    ];

    let report = run_all(&mut env, runs, None).unwrap();

    assert_eq!(
        vec!["third_alphabetically_first", "a_second", "b_third"],
        report.labels().collect::<Vec<_>>()
    );
    assert_eq!(vec!["c", "reset", "a", "reset", "b", "reset"], env.events);
    assert_eq!(3, env.resets);
}

#[test]
fn failure_does_not_stop_the_batch() {
    let mut env = RecordingEnvironment::default();
    let runs = vec![
        ScenarioDefinition::new("first", fail),
        ScenarioDefinition::new("second", pass),
        ScenarioDefinition::new("third", pass),
    ];

    let report = run_all(&mut env, runs, None).unwrap();

    assert_eq!(3, report.len());
    assert!(!report.get("first").unwrap().pass());
    assert!(report.get("second").unwrap().pass());
    assert!(report.get("third").unwrap().pass());
    assert_eq!(1, report.exit_status());
    for (_, outcome) in report.iter() {
        assert_eq!(!outcome.pass(), outcome.error().is_some());
    }
}

#[test]
fn all_passing_batch_exits_zero() {
    let mut env = RecordingEnvironment::default();
    let runs = vec![
        ScenarioDefinition::new("first", pass),
        ScenarioDefinition::new("second", pass),
    ];

    let report = run_all(&mut env, runs, None).unwrap();

    assert!(report.is_success());
    assert_eq!(0, report.exit_status());
}

#[test]
fn duplicate_labels_are_rejected_before_running() {
    let mut env = RecordingEnvironment::default();
    let runs = vec![
        ScenarioDefinition::new("end_to_end", record_label("dummy")),
        ScenarioDefinition::new("end_to_end", record_label("real")),
    ];

    let result = run_all(&mut env, runs, None);

    assert!(result.is_err());
    assert!(env.events.is_empty());
    assert_eq!(0, env.resets);
}

#[test]
fn checkpoint_holds_partial_progress() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = dir.path().join("tests").join("results.json");
    let checkpoint_for_action = checkpoint.clone();

    let mut env = RecordingEnvironment::default();
    let runs = vec![
        ScenarioDefinition::new("first", pass),
        ScenarioDefinition::new("second", move |_env: &mut RecordingEnvironment| {
            let partial = load_report(std::fs::File::open(&checkpoint_for_action)?)?;
            anyhow::ensure!(
                partial.labels().collect::<Vec<_>>() == vec!["first"],
                "checkpoint should only contain the first run"
            );
            Ok(())
        }),
    ];

    let report = run_all(&mut env, runs, Some(&checkpoint)).unwrap();

    assert!(report.is_success(), "{:?}", report);
    let persisted = load_report(std::fs::File::open(&checkpoint).unwrap()).unwrap();
    assert_eq!(report, persisted);
}

#[test]
fn finalize_writes_report_and_returns_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("tests").join("results.json");
    std::fs::create_dir_all(report_path.parent().unwrap()).unwrap();
    std::fs::write(&report_path, "stale report from an earlier run").unwrap();

    let mut env = RecordingEnvironment::default();
    let runs = vec![
        ScenarioDefinition::new("end_to_end_dummy", fail),
        ScenarioDefinition::new("end_to_end_real", pass),
    ];
    let report = run_all(&mut env, runs, None).unwrap();

    let status = finalize(&report, &report_path).unwrap();

    assert_eq!(1, status);
    let persisted = load_report(std::fs::File::open(&report_path).unwrap()).unwrap();
    assert_eq!(report, persisted);
}
