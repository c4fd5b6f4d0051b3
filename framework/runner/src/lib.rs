mod cli;
mod definition;
mod executor;
mod init;
mod run;

pub mod prelude {
    pub use crate::cli::HarnessCli;
    pub use crate::definition::{HookResult, ScenarioAction, ScenarioDefinition};
    pub use crate::executor::run_scenario;
    pub use crate::init::init;
    pub use crate::run::{finalize, run_all};

    pub use proving_ground_core::prelude::*;
    pub use proving_ground_summary_model::{load_report, BatchReport, Outcome};
}
