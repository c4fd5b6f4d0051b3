//! Scenario bodies. Each one drives `rag` through the [Harness] and fails with an error as soon as
//! something does not behave as expected.

mod add_and_rm;
mod auto_recover;
mod cli;
mod end_to_end;
mod external_bases;
mod images;

pub(crate) use add_and_rm::add_and_rm;
pub(crate) use auto_recover::auto_recover;
pub(crate) use cargo_tests::cargo_tests;
pub(crate) use cli::cli;
pub(crate) use end_to_end::end_to_end;
pub(crate) use external_bases::external_bases;
pub(crate) use images::{images, images2};

use anyhow::ensure;
use proving_ground_runner::prelude::HarnessResult;

use crate::harness::Harness;

/// Small documents to build knowledge-bases from, as `(file name, contents)`.
const SAMPLE_DOCUMENTS: [(&str, &str); 3] = [
    (
        "korea.md",
        "# Korea\n\nSeoul is the capital of South Korea. It is home to about ten million people.\n",
    ),
    (
        "rust.md",
        "# Rust\n\nRust is a systems programming language focused on safety and speed.\nIts package manager is called cargo.\n",
    ),
    (
        "notes.txt",
        "Meeting notes\n\n- ship the new chunking strategy\n- write more tests for `rag rm`\n",
    ),
];

/// Write [SAMPLE_DOCUMENTS] into `dir` (relative to scratch) and return their paths relative to
/// scratch.
fn write_sample_documents(harness: &Harness, dir: &str) -> HarnessResult<Vec<String>> {
    SAMPLE_DOCUMENTS
        .iter()
        .map(|(name, contents)| {
            let relative = if dir.is_empty() {
                name.to_string()
            } else {
                format!("{dir}/{name}")
            };
            harness.write_file(&relative, contents)?;
            Ok(relative)
        })
        .collect()
}

/// Check which files `rag ls-files` reports, run in the scratch directory.
fn ensure_listed(harness: &Harness, present: &[&str], absent: &[&str]) -> HarnessResult<()> {
    let listed = harness.rag(&["ls-files"])?;

    for name in present {
        ensure!(
            listed.contains(name),
            "`rag ls-files` does not list {name}:\n{listed}"
        );
    }
    for name in absent {
        ensure!(
            !listed.contains(name),
            "`rag ls-files` still lists {name}:\n{listed}"
        );
    }

    Ok(())
}
