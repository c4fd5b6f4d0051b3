use proving_ground_runner::prelude::HookResult;

use crate::harness::Harness;

/// Malformed command lines are rejected as cli errors.
pub(crate) fn cli(harness: &mut Harness) -> HookResult {
    harness.fresh_base()?;

    harness.assert_cli_error(&["invalid-command"])?;
    harness.assert_cli_error(&["config", "--invalid-flag"])?;

    // Arguments and flags can be interleaved, so where the bad flag sits must not matter
    harness.assert_cli_error(&["add", "--invalid-flag"])?;
    harness.assert_cli_error(&["add", "--invalid-flag", "valid-file-name"])?;
    harness.assert_cli_error(&["add", "valid-file-name", "--invalid-flag"])?;

    Ok(())
}
