use anyhow::{ensure, Context};
use proving_ground_runner::prelude::HookResult;

use super::{write_sample_documents, SAMPLE_DOCUMENTS};
use crate::harness::Harness;
use crate::registry::PLACEHOLDER_MODEL;

/// Build two knowledge-bases separately, then merge both into a third one.
pub(crate) fn external_bases(harness: &mut Harness) -> HookResult {
    let scratch = harness.fresh_dir()?;

    for base in ["base_a", "base_b"] {
        let dir = scratch.join(base);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        harness.rag_in(&dir, &["init"])?;
        harness.rag_in(&dir, &["config", "--set", "model", PLACEHOLDER_MODEL])?;
        write_sample_documents(harness, base)?;
        for (name, _) in SAMPLE_DOCUMENTS {
            harness.rag_in(&dir, &["add", name])?;
        }
        harness.rag_in(&dir, &["build"])?;
    }

    let merged = scratch.join("merged");
    std::fs::create_dir_all(&merged)
        .with_context(|| format!("Failed to create {}", merged.display()))?;
    harness.rag_in(&merged, &["init"])?;
    harness.rag_in(&merged, &["merge", "../base_a", "--prefix", "base_a"])?;
    harness.rag_in(&merged, &["merge", "../base_b", "--prefix", "base_b"])?;
    harness.rag_in(&merged, &["check"])?;

    let listed = harness.rag_in(&merged, &["ls-files"])?;
    for prefix in ["base_a", "base_b"] {
        for (name, _) in SAMPLE_DOCUMENTS {
            let expected = format!("{prefix}/{name}");
            ensure!(
                listed.contains(&expected),
                "merged base does not list {expected}:\n{listed}"
            );
        }
    }

    // Merging must leave the source bases intact
    harness.rag_in(&scratch.join("base_a"), &["check"])?;
    harness.rag_in(&scratch.join("base_b"), &["check"])?;

    Ok(())
}
