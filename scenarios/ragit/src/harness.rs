use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use anyhow::Context;
use proving_ground_runner::prelude::{Environment, HarnessResult, Tool, ToolOutput, Workspace};

/// Environment variable to override where the project root is.
pub const ROOT_ENV: &str = "RAGIT_TEST_ROOT";

/// Environment variable to run a prebuilt `rag` binary instead of going through `cargo run`.
pub const TOOL_ENV: &str = "RAGIT_TEST_BIN";

/// What `rag` prints to stderr when it rejects its command line.
pub const CLI_ERROR_MARKER: &str = "cli error";

/// Everything a scenario needs to drive `rag`: the workspace it runs in and the tool itself.
///
/// Every `rag` invocation runs inside the scratch directory unless a directory is given. The tool is
/// only looked up when it is first invoked, so a missing tool fails the scenario that needs it.
#[derive(Debug)]
pub struct Harness {
    workspace: Workspace,
    rag: OnceCell<Tool>,
}

impl Harness {
    pub fn new(workspace: Workspace, rag: Tool) -> Self {
        Self {
            workspace,
            rag: OnceCell::from(rag),
        }
    }

    /// Find the project root. The `rag` binary is resolved on first use, see [Harness::tool].
    pub fn discover() -> HarnessResult<Self> {
        Ok(Self {
            workspace: Workspace::discover(ROOT_ENV)?,
            rag: OnceCell::new(),
        })
    }

    /// The `rag` binary under test.
    ///
    /// Taken from [TOOL_ENV] if it is set, otherwise `rag` is built and run from the project root
    /// with `cargo run --release`. A failed lookup is retried on the next call.
    pub fn tool(&self) -> HarnessResult<&Tool> {
        if let Some(rag) = self.rag.get() {
            return Ok(rag);
        }

        let rag = match Tool::from_env(TOOL_ENV)? {
            Some(rag) => rag,
            None => {
                log::warn!("'{TOOL_ENV}' is not set so `rag` will be run with `cargo run`");
                let manifest = self.root().join("Cargo.toml");
                Tool::from_path_lookup("cargo")?.with_prefix_args([
                    "run".to_string(),
                    "--release".to_string(),
                    "--quiet".to_string(),
                    "--manifest-path".to_string(),
                    manifest.display().to_string(),
                    "--".to_string(),
                ])
            }
        };
        log::debug!("Testing `rag` through {}", rag.program().display());

        Ok(self.rag.get_or_init(|| rag))
    }

    pub fn root(&self) -> &Path {
        self.workspace.root()
    }

    pub fn scratch(&self) -> &Path {
        self.workspace.scratch()
    }

    /// Start from an empty scratch directory.
    pub fn fresh_dir(&mut self) -> HarnessResult<PathBuf> {
        self.workspace.enter_scratch()
    }

    /// Start from an empty scratch directory with a new knowledge-base in it.
    pub fn fresh_base(&mut self) -> HarnessResult<PathBuf> {
        let dir = self.fresh_dir()?;
        self.rag(&["init"])?;
        Ok(dir)
    }

    /// Run `rag` in the scratch directory, failing on a non-zero exit. Returns stdout.
    pub fn rag(&self, args: &[&str]) -> HarnessResult<String> {
        self.rag_in(self.scratch(), args)
    }

    /// Run `rag` in `dir`, failing on a non-zero exit. Returns stdout.
    pub fn rag_in(&self, dir: &Path, args: &[&str]) -> HarnessResult<String> {
        Ok(self.tool()?.invoke_checked(dir, args)?.stdout)
    }

    /// Run `rag` in the scratch directory and return whatever happened.
    pub fn rag_unchecked(&self, args: &[&str]) -> HarnessResult<ToolOutput> {
        self.tool()?.invoke(self.scratch(), args)
    }

    /// Assert that `rag` rejects `args` as a command line error.
    pub fn assert_cli_error(&self, args: &[&str]) -> HarnessResult<()> {
        self.tool()?
            .assert_failure_with_marker(self.scratch(), args, CLI_ERROR_MARKER)
    }

    /// Write a file into the scratch directory, creating parent directories as needed.
    pub fn write_file(
        &self,
        relative: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> HarnessResult<PathBuf> {
        let path = self.scratch().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }
}

impl Environment for Harness {
    fn reset(&mut self) -> HarnessResult<()> {
        self.workspace.reset()
    }
}
