use anyhow::ensure;
use proving_ground_runner::prelude::HookResult;

use crate::harness::Harness;

/// A 1x1 PNG.
const SAMPLE_PNG: [u8; 67] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

const IMAGE_DOCUMENT: &str = "image.md";

/// Build a knowledge-base with a document that embeds an image, using `model`.
fn build_with_image(harness: &mut Harness, model: &str) -> HookResult {
    harness.fresh_base()?;
    harness.rag(&["config", "--set", "model", model])?;

    harness.write_file("sample.png", SAMPLE_PNG)?;
    harness.write_file(
        IMAGE_DOCUMENT,
        "# A picture\n\nThe picture below is the whole point of this document.\n\n![sample](sample.png)\n",
    )?;

    harness.rag(&["add", IMAGE_DOCUMENT])?;
    harness.rag(&["build"])?;
    harness.rag(&["check"])?;

    let images = harness.rag(&["ls-images"])?;
    ensure!(
        !images.trim().is_empty(),
        "`rag ls-images` lists nothing after building {IMAGE_DOCUMENT}"
    );

    Ok(())
}

/// Images are extracted and stored, with descriptions from `model`.
pub(crate) fn images(harness: &mut Harness, model: &str) -> HookResult {
    build_with_image(harness, model)
}

/// A real multi-modal model describes the image well enough to answer a question about it.
pub(crate) fn images2(harness: &mut Harness, model: &str) -> HookResult {
    build_with_image(harness, model)?;

    let answer = harness.rag(&["query", "What is in the picture in image.md?"])?;
    ensure!(
        !answer.trim().is_empty(),
        "`rag query` answered with nothing"
    );

    Ok(())
}
