use anyhow::{ensure, Context};
use proving_ground_runner::prelude::HookResult;

use super::write_sample_documents;
use crate::harness::Harness;
use crate::registry::PLACEHOLDER_MODEL;

/// Damage a built knowledge-base and check that `rag` notices and recovers.
pub(crate) fn auto_recover(harness: &mut Harness) -> HookResult {
    harness.fresh_base()?;
    harness.rag(&["config", "--set", "model", PLACEHOLDER_MODEL])?;

    let documents = write_sample_documents(harness, "")?;
    let mut add = vec!["add"];
    add.extend(documents.iter().map(String::as_str));
    harness.rag(&add)?;
    harness.rag(&["build"])?;
    harness.rag(&["check"])?;

    let chunks = harness.scratch().join(".ragit").join("chunks");
    ensure!(
        chunks.is_dir(),
        "expected chunks to be stored in {}",
        chunks.display()
    );
    std::fs::remove_dir_all(&chunks)
        .with_context(|| format!("Failed to remove {}", chunks.display()))?;
    std::fs::create_dir(&chunks)
        .with_context(|| format!("Failed to recreate {}", chunks.display()))?;

    let damaged = harness.rag_unchecked(&["check"])?;
    ensure!(
        !damaged.success(),
        "`rag check` passed on a knowledge-base with its chunks deleted"
    );

    // The next build should repair the index without being asked to
    harness.rag(&["build"])?;
    harness.rag(&["check"])?;

    let listed = harness.rag(&["ls-chunks"])?;
    ensure!(
        !listed.trim().is_empty(),
        "no chunks after recovering the knowledge-base"
    );

    Ok(())
}
