use std::fmt;

/// Returned when a command line cannot be turned into something runnable.
///
/// This is a usage error. It is reported before any environment setup happens, so nothing on disk
/// has to be cleaned up when it is returned.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The name does not match any scenario that the registry knows about.
    #[display("Unknown scenario `{name}`")]
    UnknownScenario { name: String },
    /// The scenario needs a parameter and none was given. The hint tells the user what to pass.
    #[display("{hint}")]
    MissingParameter { scenario: String, hint: String },
}

/// A checked invocation of the tool under test exited unsuccessfully.
///
/// Travels inside [anyhow::Error] so it can fail a scenario like any other error, but it can be
/// recovered with `downcast_ref` when the exit status matters.
#[derive(derive_more::Error, Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocationError {
    /// The full command line, program first.
    pub command: String,
    /// Exit code, or `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stderr: String,
}

impl fmt::Display for ToolInvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "`{}` exited with status {code}", self.command)?,
            None => write!(f, "`{}` was terminated by a signal", self.command)?,
        }

        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            write!(f, "\n{stderr}")?;
        }

        Ok(())
    }
}
