#![allow(dead_code)]

use proving_ground_runner::prelude::{Environment, HarnessResult};

/// Records what happens to it, so tests can check when and how often a reset happened.
#[derive(Debug, Default)]
pub struct RecordingEnvironment {
    pub events: Vec<String>,
    pub resets: usize,
    /// Pretend state left behind by a scenario, cleared by a reset.
    pub dirty: bool,
    pub fail_reset: bool,
    pub reset_delay: Option<std::time::Duration>,
}

impl Environment for RecordingEnvironment {
    fn reset(&mut self) -> HarnessResult<()> {
        if let Some(delay) = self.reset_delay {
            std::thread::sleep(delay);
        }

        self.resets += 1;
        self.dirty = false;
        self.events.push("reset".to_string());

        if self.fail_reset {
            anyhow::bail!("scratch directory is locked");
        }

        Ok(())
    }
}
