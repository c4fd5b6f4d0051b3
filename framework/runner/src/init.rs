use crate::cli::HarnessCli;

/// Initialise the CLI and logging for the harness.
pub fn init() -> HarnessCli {
    env_logger::init();

    HarnessCli::parse_lenient_from(std::env::args_os())
}
