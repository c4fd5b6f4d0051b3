use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::HarnessResult;

/// Location of the scratch directory, relative to the project root.
pub const SCRATCH_DIR: &str = "tests/.scratch";

/// Shared working state that scenarios run against.
///
/// Only one scenario owns the environment at a time. Ownership passes to the next scenario once
/// [Environment::reset] has returned.
pub trait Environment {
    /// Return the environment to a clean baseline.
    ///
    /// Must be idempotent: calling it twice in a row leaves the same observable state as calling
    /// it once.
    fn reset(&mut self) -> HarnessResult<()>;
}

/// Handle to the project root and the scratch directory that scenarios work in.
///
/// The process working directory is never changed. Anything that needs a working directory is
/// given [Workspace::scratch] (or a path inside it) explicitly.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    scratch: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let scratch = root.join(SCRATCH_DIR);

        Self { root, scratch }
    }

    /// Locate the project root.
    ///
    /// If `root_override_env` names a set environment variable then its value is used as the root
    /// and must be an existing directory. Otherwise the root is searched for upwards from the
    /// current directory, see [find_project_root].
    pub fn discover(root_override_env: &str) -> HarnessResult<Self> {
        match std::env::var(root_override_env).ok().as_deref() {
            Some("") => {
                bail!("'{root_override_env}' set to empty string");
            }
            Some(path) => {
                let root = PathBuf::from(path);
                if !root.is_dir() {
                    bail!(
                        "Project root overwritten with '{root_override_env}={path}' but that is not a directory",
                        path = root.display()
                    );
                }
                Ok(Self::new(root))
            }
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                let root = find_project_root(&cwd).with_context(|| {
                    format!(
                        "Could not find the project root above '{}'. Run from inside the project or set '{root_override_env}'.",
                        cwd.display()
                    )
                })?;
                log::debug!("Discovered project root at {}", root.display());
                Ok(Self::new(root))
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scratch(&self) -> &Path {
        &self.scratch
    }

    /// Reset the scratch directory and create it again, empty.
    pub fn enter_scratch(&mut self) -> HarnessResult<PathBuf> {
        self.reset()?;
        std::fs::create_dir_all(&self.scratch).with_context(|| {
            format!(
                "Failed to create scratch directory {}",
                self.scratch.display()
            )
        })?;
        log::trace!("Entered scratch directory {}", self.scratch.display());

        Ok(self.scratch.clone())
    }
}

impl Environment for Workspace {
    fn reset(&mut self) -> HarnessResult<()> {
        match std::fs::remove_dir_all(&self.scratch) {
            Ok(()) => {
                log::trace!("Removed scratch directory {}", self.scratch.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!(
                    "Failed to remove scratch directory {}",
                    self.scratch.display()
                )
            }),
        }
    }
}

/// Find the project root by walking up from `start`.
///
/// The nearest ancestor containing `.git` wins. Without one, the nearest ancestor containing a
/// `Cargo.toml` is used.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .or_else(|| {
            start
                .ancestors()
                .find(|dir| dir.join("Cargo.toml").is_file())
        })
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    const TEST_ROOT_ENV: &str = "PROVING_GROUND_TEST_ROOT";

    #[test]
    fn enter_scratch_starts_empty() {
        let root = TempDir::new().unwrap();
        let mut workspace = Workspace::new(root.path());

        let scratch = workspace.enter_scratch().unwrap();
        std::fs::write(scratch.join("leftover.txt"), "from a previous scenario").unwrap();

        let scratch = workspace.enter_scratch().unwrap();
        assert!(scratch.is_dir());
        assert_eq!(0, std::fs::read_dir(&scratch).unwrap().count());
    }

    #[test]
    fn reset_is_idempotent() {
        let root = TempDir::new().unwrap();
        let mut workspace = Workspace::new(root.path());
        let scratch = workspace.enter_scratch().unwrap();
        std::fs::create_dir_all(scratch.join("nested/dir")).unwrap();

        workspace.reset().unwrap();
        assert!(!scratch.exists());

        workspace.reset().unwrap();
        assert!(!scratch.exists());
        assert!(root.path().join("tests").is_dir());
    }

    #[test]
    fn reset_without_scratch_is_ok() {
        let root = TempDir::new().unwrap();
        let mut workspace = Workspace::new(root.path());

        workspace.reset().unwrap();
    }

    #[test]
    fn prefers_git_directory_over_nested_manifest() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join(".git")).unwrap();
        std::fs::write(root.path().join("Cargo.toml"), "[workspace]").unwrap();
        let nested = root.path().join("crates/api");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Cargo.toml"), "[package]").unwrap();

        assert_eq!(Some(root.path().to_path_buf()), find_project_root(&nested));
    }

    #[test]
    fn falls_back_to_nearest_manifest() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("crates/api/src");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("crates/api/Cargo.toml"), "[package]").unwrap();

        assert_eq!(
            Some(root.path().join("crates/api")),
            find_project_root(&nested)
        );
    }

    #[test]
    #[serial]
    fn discover_uses_override() {
        let root = TempDir::new().unwrap();
        std::env::set_var(TEST_ROOT_ENV, root.path());

        let workspace = Workspace::discover(TEST_ROOT_ENV).unwrap();
        std::env::remove_var(TEST_ROOT_ENV);

        assert_eq!(root.path(), workspace.root());
        assert_eq!(root.path().join(SCRATCH_DIR), workspace.scratch());
    }

    #[test]
    #[serial]
    fn discover_rejects_empty_override() {
        std::env::set_var(TEST_ROOT_ENV, "");

        let result = Workspace::discover(TEST_ROOT_ENV);
        std::env::remove_var(TEST_ROOT_ENV);

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn discover_rejects_missing_override() {
        std::env::set_var(TEST_ROOT_ENV, "/non/existent/project/root");

        let result = Workspace::discover(TEST_ROOT_ENV);
        std::env::remove_var(TEST_ROOT_ENV);

        assert!(result.is_err());
    }
}
