use std::path::Path;

use anyhow::{bail, Context};
use itertools::Itertools;
use proving_ground_core::prelude::{Environment, HarnessResult};
use proving_ground_summary_model::BatchReport;

use crate::definition::ScenarioDefinition;
use crate::executor::run_scenario;

/// Run every scenario in `runs`, one after another, and collect their outcomes.
///
/// Scenarios share the environment so they are never run concurrently. Each outcome is recorded
/// under its run label as soon as the scenario finishes, in execution order.
///
/// If `checkpoint` is given, the partial report is written there after every run so that progress
/// survives the batch being interrupted. A failed checkpoint write is logged and the batch carries
/// on.
///
/// Fails without running anything if two runs share a label.
pub fn run_all<E: Environment>(
    env: &mut E,
    runs: Vec<ScenarioDefinition<'_, E>>,
    checkpoint: Option<&Path>,
) -> HarnessResult<BatchReport> {
    if let Some(label) = runs.iter().map(|run| run.label()).duplicates().next() {
        bail!("Scenario run label [{label}] is used more than once");
    }

    log::info!("Running batch of {} scenarios", runs.len());

    let mut report = BatchReport::new();
    for run in runs {
        let label = run.label().to_string();
        let outcome = run_scenario(env, run);
        report.record(label, outcome)?;

        if let Some(path) = checkpoint {
            if let Err(e) = report.persist(path) {
                log::warn!(
                    "Failed to write report checkpoint to {}: {e:?}",
                    path.display()
                );
            }
        }
    }

    Ok(report)
}

/// Print the full report to stdout, then write it to `report_path`, replacing any earlier report.
///
/// Returns the exit status that the process should finish with.
pub fn finalize(report: &BatchReport, report_path: &Path) -> HarnessResult<u8> {
    println!("{}", report.to_pretty_json()?);

    report
        .persist(report_path)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
    log::info!(
        "Batch finished, {}. Report written to {}",
        report.summary_line(),
        report_path.display()
    );

    Ok(report.exit_status())
}
