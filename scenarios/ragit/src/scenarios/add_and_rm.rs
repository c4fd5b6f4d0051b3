use anyhow::ensure;
use proving_ground_runner::prelude::HookResult;

use super::{ensure_listed, write_sample_documents};
use crate::harness::Harness;
use crate::registry::PLACEHOLDER_MODEL;

/// Stage, re-stage and remove files, before and after they are processed.
pub(crate) fn add_and_rm(harness: &mut Harness) -> HookResult {
    harness.fresh_base()?;
    harness.rag(&["config", "--set", "model", PLACEHOLDER_MODEL])?;

    let documents = write_sample_documents(harness, "")?;
    let [first, second, third] = [&documents[0], &documents[1], &documents[2]].map(String::as_str);

    harness.rag(&["add", first, second, third])?;
    ensure_listed(harness, &[first, second, third], &[])?;

    // Adding a file that is already staged is a no-op
    harness.rag(&["add", first])?;
    let listed = harness.rag(&["ls-files"])?;
    ensure!(
        listed.matches(first).count() == 1,
        "{first} is listed more than once after adding it twice:\n{listed}"
    );

    // Remove a staged file
    harness.rag(&["rm", first])?;
    ensure_listed(harness, &[second, third], &[first])?;

    // Remove a processed file
    harness.rag(&["build"])?;
    harness.rag(&["rm", second])?;
    harness.rag(&["check"])?;
    ensure_listed(harness, &[third], &[first, second])?;

    // Bring a removed file back
    harness.rag(&["add", first])?;
    harness.rag(&["build"])?;
    harness.rag(&["check"])?;
    ensure_listed(harness, &[first, third], &[second])?;

    let missing = harness.rag_unchecked(&["rm", "never-added.md"])?;
    ensure!(
        !missing.success(),
        "`rag rm` succeeded on a file that was never added"
    );

    Ok(())
}
