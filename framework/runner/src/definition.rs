use std::fmt;

pub type HookResult = anyhow::Result<()>;

/// The body of a scenario. It is given exclusive access to the environment for as long as it runs.
pub type ScenarioAction<'a, E> = Box<dyn FnOnce(&mut E) -> HookResult + 'a>;

/// One run of a scenario: a label for reporting and the action to execute.
///
/// A definition is consumed when it runs. To run the same scenario twice, for example with
/// different parameters, create two definitions with distinct labels.
pub struct ScenarioDefinition<'a, E> {
    /// The label that the outcome is recorded under. Must be unique within a batch.
    label: String,
    action: ScenarioAction<'a, E>,
}

impl<'a, E> ScenarioDefinition<'a, E> {
    pub fn new(
        label: impl Into<String>,
        action: impl FnOnce(&mut E) -> HookResult + 'a,
    ) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn into_parts(self) -> (String, ScenarioAction<'a, E>) {
        (self.label, self.action)
    }
}

impl<E> fmt::Debug for ScenarioDefinition<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioDefinition")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
