use anyhow::ensure;
use proving_ground_runner::prelude::HookResult;

use super::{ensure_listed, write_sample_documents};
use crate::harness::Harness;

/// Build a knowledge-base from scratch with `model` and query it.
pub(crate) fn end_to_end(harness: &mut Harness, model: &str) -> HookResult {
    harness.fresh_base()?;
    harness.rag(&["config", "--set", "model", model])?;

    let configured = harness.rag(&["config", "--get", "model"])?;
    ensure!(
        configured.contains(model),
        "model is not set to {model}, `rag config --get model` printed:\n{configured}"
    );

    let documents = write_sample_documents(harness, "docs")?;
    let mut add = vec!["add"];
    add.extend(documents.iter().map(String::as_str));
    harness.rag(&add)?;

    harness.rag(&["build"])?;
    harness.rag(&["check"])?;

    let documents = documents.iter().map(String::as_str).collect::<Vec<_>>();
    ensure_listed(harness, &documents, &[])?;

    let chunks = harness.rag(&["ls-chunks"])?;
    ensure!(!chunks.trim().is_empty(), "`rag build` produced no chunks");

    let answer = harness.rag(&["query", "What is the capital of Korea?"])?;
    ensure!(
        !answer.trim().is_empty(),
        "`rag query` answered with nothing"
    );

    Ok(())
}
