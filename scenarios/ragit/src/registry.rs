use anyhow::Context;
use proving_ground_runner::prelude::{HookResult, ResolutionError, ScenarioDefinition};

use crate::harness::Harness;
use crate::scenarios;

/// The command that runs every scenario and writes a report.
pub const BATCH_COMMAND: &str = "all";

/// Model used when a scenario can run without a real one.
pub const PLACEHOLDER_MODEL: &str = "dummy";

/// Multi-modal model that the batch's `images2` entry builds with, whatever model the batch was given.
pub const BATCH_IMAGES2_MODEL: &str = "claude-3-5-sonnet";

const IMAGES2_HINT: &str =
    "Please specify which model to run the tests with. You cannot run this test with a dummy model.";
const BATCH_HINT: &str = "Please specify which model to run the tests with.";

/// Every scenario that can be run on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    EndToEnd,
    ExternalBases,
    AddAndRm,
    AutoRecover,
    Images,
    Images2,
    CargoTests,
    Cli,
}

/// Whether a scenario takes a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRule {
    NotUsed,
    Optional { default: &'static str },
    /// Running without the parameter is a usage error, explained by the hint.
    Required { hint: &'static str },
}

impl Scenario {
    pub const ALL: [Scenario; 8] = [
        Scenario::EndToEnd,
        Scenario::ExternalBases,
        Scenario::AddAndRm,
        Scenario::AutoRecover,
        Scenario::Images,
        Scenario::Images2,
        Scenario::CargoTests,
        Scenario::Cli,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::EndToEnd => "end_to_end",
            Scenario::ExternalBases => "external_bases",
            Scenario::AddAndRm => "add_and_rm",
            Scenario::AutoRecover => "auto_recover",
            Scenario::Images => "images",
            Scenario::Images2 => "images2",
            Scenario::CargoTests => "cargo_tests",
            Scenario::Cli => "cli",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "end_to_end" => Some(Scenario::EndToEnd),
            "external_bases" => Some(Scenario::ExternalBases),
            "add_and_rm" => Some(Scenario::AddAndRm),
            "auto_recover" => Some(Scenario::AutoRecover),
            "images" => Some(Scenario::Images),
            "images2" => Some(Scenario::Images2),
            "cargo_tests" => Some(Scenario::CargoTests),
            "cli" => Some(Scenario::Cli),
            _ => None,
        }
    }

    pub fn parameter_rule(self) -> ParameterRule {
        match self {
            Scenario::EndToEnd => ParameterRule::Optional {
                default: PLACEHOLDER_MODEL,
            },
            Scenario::Images2 => ParameterRule::Required { hint: IMAGES2_HINT },
            Scenario::ExternalBases
            | Scenario::AddAndRm
            | Scenario::AutoRecover
            | Scenario::Images
            | Scenario::CargoTests
            | Scenario::Cli => ParameterRule::NotUsed,
        }
    }

    /// Run the scenario body. `parameter` is expected to have been through [resolve] already.
    pub fn run(self, harness: &mut Harness, parameter: Option<&str>) -> HookResult {
        match self {
            Scenario::EndToEnd => {
                scenarios::end_to_end(harness, parameter.unwrap_or(PLACEHOLDER_MODEL))
            }
            Scenario::ExternalBases => scenarios::external_bases(harness),
            Scenario::AddAndRm => scenarios::add_and_rm(harness),
            Scenario::AutoRecover => scenarios::auto_recover(harness),
            Scenario::Images => {
                scenarios::images(harness, parameter.unwrap_or(PLACEHOLDER_MODEL))
            }
            Scenario::Images2 => {
                let model = parameter.context(IMAGES2_HINT)?;
                scenarios::images2(harness, model)
            }
            Scenario::CargoTests => scenarios::cargo_tests(harness),
            Scenario::Cli => scenarios::cli(harness),
        }
    }
}

/// What a command line resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run one scenario. The parameter already has defaults applied.
    Single {
        scenario: Scenario,
        parameter: Option<String>,
    },
    /// Run the batch plan against `model`.
    Batch { model: String },
}

/// Resolve a command name and optional parameter to something runnable.
///
/// Nothing is touched on disk, so a usage error can be reported without any cleanup.
pub fn resolve(name: &str, parameter: Option<&str>) -> Result<Invocation, ResolutionError> {
    if name == BATCH_COMMAND {
        let model = parameter.ok_or_else(|| ResolutionError::MissingParameter {
            scenario: BATCH_COMMAND.to_string(),
            hint: BATCH_HINT.to_string(),
        })?;

        return Ok(Invocation::Batch {
            model: model.to_string(),
        });
    }

    let scenario = Scenario::from_name(name).ok_or_else(|| ResolutionError::UnknownScenario {
        name: name.to_string(),
    })?;

    let parameter = match scenario.parameter_rule() {
        ParameterRule::NotUsed => {
            if let Some(parameter) = parameter {
                log::warn!("Ignoring parameter '{parameter}', {name} does not take one");
            }
            None
        }
        ParameterRule::Optional { default } => Some(parameter.unwrap_or(default).to_string()),
        ParameterRule::Required { hint } => Some(
            parameter
                .ok_or_else(|| ResolutionError::MissingParameter {
                    scenario: name.to_string(),
                    hint: hint.to_string(),
                })?
                .to_string(),
        ),
    };

    Ok(Invocation::Single {
        scenario,
        parameter,
    })
}

/// One entry in the batch plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRun {
    /// Label that the outcome is reported under.
    pub label: &'static str,
    pub scenario: Scenario,
    pub parameter: Option<String>,
}

impl PlannedRun {
    fn new(label: &'static str, scenario: Scenario, parameter: Option<&str>) -> Self {
        Self {
            label,
            scenario,
            parameter: parameter.map(str::to_string),
        }
    }

    pub fn into_definition(self) -> ScenarioDefinition<'static, Harness> {
        let PlannedRun {
            label,
            scenario,
            parameter,
        } = self;

        ScenarioDefinition::new(label, move |harness: &mut Harness| {
            scenario.run(harness, parameter.as_deref())
        })
    }
}

/// The runs that make up a batch, in the order they execute.
///
/// `end_to_end` runs twice, once with the placeholder model as a baseline and once with `model`.
/// The `images2` entry is the `images` scenario built with [BATCH_IMAGES2_MODEL]; it does not run
/// the query that `images2` adds on the command line. The `cli` scenario is not part of the batch.
pub fn batch_plan(model: &str) -> Vec<PlannedRun> {
    vec![
        PlannedRun::new("end_to_end_dummy", Scenario::EndToEnd, Some(PLACEHOLDER_MODEL)),
        PlannedRun::new("end_to_end_real", Scenario::EndToEnd, Some(model)),
        PlannedRun::new("external_bases", Scenario::ExternalBases, None),
        PlannedRun::new("add_and_rm", Scenario::AddAndRm, None),
        PlannedRun::new("auto_recover", Scenario::AutoRecover, None),
        PlannedRun::new("images", Scenario::Images, None),
        // TODO: run images2 with every multi-modal model, not just one
        PlannedRun::new("images2", Scenario::Images, Some(BATCH_IMAGES2_MODEL)),
        PlannedRun::new("cargo_tests", Scenario::CargoTests, None),
    ]
}
