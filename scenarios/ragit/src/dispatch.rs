use std::process::ExitCode;

use proving_ground_runner::prelude::{
    finalize, run_all, run_scenario, Environment, HarnessCli, HarnessResult, ResolutionError,
    ScenarioDefinition,
};

use crate::harness::Harness;
use crate::registry::{batch_plan, resolve, Invocation, PlannedRun};

/// Where the batch report is written, relative to the project root.
pub const REPORT_PATH: &str = "tests/results.json";

pub const HELP_MESSAGE: &str = "
Commands
    end_to_end [model=dummy]    run `end_to_end` test

    external_bases              run `external_bases` test

    add_and_rm                  run `add_and_rm` test

    auto_recover                run `auto_recover` test

    images                      run `images` test

    images2 [model]             run `images2` test

    cargo_tests                 run `cargo test` on all the crates

    cli                         run `cli` test (not part of `all`)

    all [model]                 run all tests
                                It runs `end_to_end` twice. Once with `model = dummy`,
                                and one more with the given model.
                                It dumps the test result to `tests/results.json`.
";

/// Run whatever the command line asks for and work out the exit code.
///
/// Usage errors are reported before the harness is set up, so they never touch the filesystem.
/// Once the harness exists, it is reset one final time on the way out, whatever happened.
pub fn dispatch(cli: HarnessCli) -> ExitCode {
    let Some(command) = cli.command.as_deref() else {
        println!("{HELP_MESSAGE}");
        return ExitCode::SUCCESS;
    };

    let invocation = match resolve(command, cli.parameter.as_deref()) {
        Ok(invocation) => invocation,
        Err(ResolutionError::UnknownScenario { .. }) => {
            println!("{HELP_MESSAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e @ ResolutionError::MissingParameter { .. }) => {
            println!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut harness = match Harness::discover() {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("Failed to set up the test harness: {e:?}");
            return ExitCode::FAILURE;
        }
    };

    let status = match execute(&mut harness, invocation) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("{e:?}");
            ExitCode::FAILURE
        }
    };

    if let Err(e) = harness.reset() {
        log::error!("Final cleanup failed: {e:?}");
    }

    status
}

fn execute(harness: &mut Harness, invocation: Invocation) -> HarnessResult<u8> {
    match invocation {
        Invocation::Single {
            scenario,
            parameter,
        } => {
            let definition = ScenarioDefinition::new(scenario.name(), |harness: &mut Harness| {
                scenario.run(harness, parameter.as_deref())
            });
            let outcome = run_scenario(harness, definition);

            match outcome.error() {
                None => {
                    println!("{} passed in {}ms", scenario.name(), outcome.elapsed_ms());
                    Ok(0)
                }
                Some(error) => {
                    eprintln!("{} failed: {error}", scenario.name());
                    Ok(1)
                }
            }
        }
        Invocation::Batch { model } => {
            let report_path = harness.root().join(REPORT_PATH);
            let runs = batch_plan(&model)
                .into_iter()
                .map(PlannedRun::into_definition)
                .collect();

            let report = run_all(harness, runs, Some(&report_path))?;

            finalize(&report, &report_path)
        }
    }
}
