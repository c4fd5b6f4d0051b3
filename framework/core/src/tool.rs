use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, ensure, Context};

use crate::error::ToolInvocationError;
use crate::HarnessResult;

/// Captured result of one invocation of the tool under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// An external command-line tool that scenarios drive as a black box.
///
/// Every invocation blocks until the process exits. There is no timeout, a tool that hangs will
/// hang the caller.
#[derive(Debug, Clone)]
pub struct Tool {
    program: PathBuf,
    /// Fixed arguments placed before the caller's arguments, e.g. `run --release --` when the tool
    /// is launched through `cargo`.
    prefix_args: Vec<String>,
}

impl Tool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Find `binary_name` in the user's `PATH`.
    pub fn from_path_lookup(binary_name: &str) -> HarnessResult<Self> {
        let program = which::which(binary_name)
            .with_context(|| format!("'{binary_name}' binary not found in PATH"))?;

        Ok(Self::new(program))
    }

    /// Read the path to the tool from the `override_env` environment variable.
    ///
    /// Returns `None` if the variable is not set. It is an error for the variable to be empty or
    /// to point at a path that does not exist.
    pub fn from_env(override_env: &str) -> HarnessResult<Option<Self>> {
        match std::env::var(override_env).ok().as_deref() {
            None => Ok(None),
            Some("") => {
                bail!("'{override_env}' set to empty string");
            }
            Some(path) => {
                let program = PathBuf::from(path);
                if !program.exists() {
                    bail!(
                        "Path to the tool overwritten with '{override_env}={path}' but that path doesn't exist",
                        path = program.display()
                    );
                }
                Ok(Some(Self::new(program)))
            }
        }
    }

    pub fn with_prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool in `cwd` with `args` passed verbatim and capture its output.
    ///
    /// A non-zero exit is not an error here, only a failure to start the process is.
    pub fn invoke(&self, cwd: &Path, args: &[&str]) -> HarnessResult<ToolOutput> {
        log::debug!("Running `{}` in {}", self.command_line(args), cwd.display());

        let output = Command::new(&self.program)
            .args(&self.prefix_args)
            .args(args)
            .current_dir(cwd)
            .output()
            .with_context(|| format!("Failed to execute `{}`", self.command_line(args)))?;

        let output = ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log::trace!("`{}` finished with {:?}", self.command_line(args), output.status);

        Ok(output)
    }

    /// Like [Tool::invoke], but an unsuccessful exit becomes a [ToolInvocationError].
    pub fn invoke_checked(&self, cwd: &Path, args: &[&str]) -> HarnessResult<ToolOutput> {
        let output = self.invoke(cwd, args)?;
        if !output.success() {
            return Err(ToolInvocationError {
                command: self.command_line(args),
                status: output.status,
                stderr: output.stderr,
            }
            .into());
        }

        Ok(output)
    }

    /// Assert that `args` is rejected by the tool: a non-zero exit status and `marker` somewhere in
    /// stderr.
    ///
    /// The invocation is made twice because rejecting bad input must not depend on state left
    /// behind by an earlier attempt.
    pub fn assert_failure_with_marker(
        &self,
        cwd: &Path,
        args: &[&str],
        marker: &str,
    ) -> HarnessResult<()> {
        for attempt in 1..=2 {
            let output = self.invoke(cwd, args)?;
            ensure!(
                !output.success(),
                "`{}` was expected to fail but exited successfully (attempt {attempt})",
                self.command_line(args)
            );
            ensure!(
                output.stderr.contains(marker),
                "`{}` failed without reporting '{marker}' (attempt {attempt}), stderr was:\n{}",
                self.command_line(args),
                output.stderr
            );
        }

        Ok(())
    }

    fn command_line(&self, args: &[&str]) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.prefix_args.iter().cloned())
            .chain(args.iter().map(|a| a.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    const TEST_TOOL_ENV: &str = "PROVING_GROUND_TEST_TOOL";

    #[test]
    #[serial]
    fn should_not_get_tool_if_not_exist() {
        std::env::set_var(TEST_TOOL_ENV, "/non/existent/path/to/rag");
        let result = Tool::from_env(TEST_TOOL_ENV);
        std::env::remove_var(TEST_TOOL_ENV);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn should_get_tool_from_env() {
        let temp = NamedTempFile::new().expect("failed to create temp file");
        std::env::set_var(TEST_TOOL_ENV, temp.path());
        let result = Tool::from_env(TEST_TOOL_ENV).expect("failed to read tool path");
        std::env::remove_var(TEST_TOOL_ENV);

        assert_eq!(temp.path(), result.expect("tool not set").program());
    }

    #[test]
    #[serial]
    fn should_not_get_tool_when_unset() {
        std::env::remove_var(TEST_TOOL_ENV);
        assert!(Tool::from_env(TEST_TOOL_ENV).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn invoke_captures_status_and_streams() {
        let cwd = TempDir::new().unwrap();
        let tool = Tool::new("sh").with_prefix_args(["-c"]);

        let output = tool
            .invoke(cwd.path(), &["echo out; echo err >&2; exit 3"])
            .unwrap();

        assert_eq!(Some(3), output.status);
        assert_eq!("out\n", output.stdout);
        assert_eq!("err\n", output.stderr);
    }

    #[cfg(unix)]
    #[test]
    fn invoke_runs_in_given_directory() {
        let cwd = TempDir::new().unwrap();
        std::fs::write(cwd.path().join("marker.txt"), "here").unwrap();
        let tool = Tool::new("sh").with_prefix_args(["-c"]);

        let output = tool.invoke_checked(cwd.path(), &["cat marker.txt"]).unwrap();

        assert_eq!("here", output.stdout);
    }

    #[cfg(unix)]
    #[test]
    fn invoke_checked_reports_exit_status() {
        let cwd = TempDir::new().unwrap();
        let tool = Tool::new("sh").with_prefix_args(["-c"]);

        let err = tool
            .invoke_checked(cwd.path(), &["echo broken >&2; exit 2"])
            .unwrap_err();

        let err = err
            .downcast_ref::<ToolInvocationError>()
            .expect("expected a tool invocation error");
        assert_eq!(Some(2), err.status);
        assert_eq!("broken\n", err.stderr);
        assert!(err.command.ends_with("-c echo broken >&2; exit 2"));
    }

    #[cfg(unix)]
    #[test]
    fn assert_failure_with_marker_accepts_cli_error() {
        let cwd = TempDir::new().unwrap();
        let tool = Tool::new("sh").with_prefix_args(["-c"]);

        tool.assert_failure_with_marker(
            cwd.path(),
            &["echo 'cli error: unknown flag' >&2; exit 1"],
            "cli error",
        )
        .unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn assert_failure_with_marker_rejects_success() {
        let cwd = TempDir::new().unwrap();
        let tool = Tool::new("sh").with_prefix_args(["-c"]);

        let result =
            tool.assert_failure_with_marker(cwd.path(), &["echo 'cli error' >&2"], "cli error");

        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn assert_failure_with_marker_rejects_missing_marker() {
        let cwd = TempDir::new().unwrap();
        let tool = Tool::new("sh").with_prefix_args(["-c"]);

        let result = tool.assert_failure_with_marker(
            cwd.path(),
            &["echo 'panicked at main.rs' >&2; exit 101"],
            "cli error",
        );

        assert!(result.is_err());
    }

    #[test]
    fn missing_program_fails_to_invoke() {
        let cwd = TempDir::new().unwrap();
        let tool = Tool::new("/non/existent/path/to/rag");

        assert!(tool.invoke(cwd.path(), &["--version"]).is_err());
    }
}
