mod environment;
mod error;
mod tool;

pub mod prelude {
    pub use crate::environment::{find_project_root, Environment, Workspace, SCRATCH_DIR};
    pub use crate::error::{ResolutionError, ToolInvocationError};
    pub use crate::tool::{Tool, ToolOutput};
    pub use crate::HarnessResult;
}

/// Recommended error type for harness plumbing and shared scenario code. Scenario actions use the
/// same error type, so `?` propagates anything into a failed outcome.
pub type HarnessResult<T> = anyhow::Result<T>;
