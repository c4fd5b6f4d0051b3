use std::process::ExitCode;

use proving_ground_runner::prelude::init;

fn main() -> ExitCode {
    let cli = init();

    ragit_scenarios::dispatch(cli)
}
