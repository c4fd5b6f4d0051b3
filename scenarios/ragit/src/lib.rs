mod dispatch;
mod harness;
mod registry;
mod scenarios;

pub use dispatch::{dispatch, HELP_MESSAGE, REPORT_PATH};
pub use harness::{Harness, CLI_ERROR_MARKER, ROOT_ENV, TOOL_ENV};
pub use registry::{
    batch_plan, resolve, Invocation, ParameterRule, PlannedRun, Scenario, BATCH_COMMAND,
    BATCH_IMAGES2_MODEL, PLACEHOLDER_MODEL,
};
