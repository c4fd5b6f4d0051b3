use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use proving_ground_core::prelude::Environment;
use proving_ground_summary_model::Outcome;

use crate::definition::ScenarioDefinition;

/// Run a single scenario and convert whatever happens into an [Outcome].
///
/// This never fails. An error returned by the action, or a panic inside it, becomes a failed
/// outcome carrying the error message and its trace context.
///
/// The environment is reset exactly once after the action, on every exit path. Only the action is
/// timed, the reset is not included in [Outcome::elapsed_ms].
pub fn run_scenario<E: Environment>(env: &mut E, scenario: ScenarioDefinition<'_, E>) -> Outcome {
    let (label, action) = scenario.into_parts();
    log::info!("Running scenario: {label}");

    let outcome = {
        let guard = ResetOnDrop { env, label: &label };

        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| action(&mut *guard.env)));
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(Ok(())) => Outcome::passed(elapsed_ms),
            Ok(Err(e)) => Outcome::failed(format!("{e}\n{e:?}"), elapsed_ms),
            Err(payload) => Outcome::failed(describe_panic(payload.as_ref()), elapsed_ms),
        }
        // The guard drops here and resets the environment
    };

    if outcome.pass() {
        log::info!("Scenario {label} passed in {}ms", outcome.elapsed_ms());
    } else {
        log::error!(
            "Scenario {label} failed after {}ms: {}",
            outcome.elapsed_ms(),
            outcome.error().unwrap_or_default()
        );
    }

    outcome
}

/// Resets the environment when dropped, so the reset also happens while unwinding.
struct ResetOnDrop<'a, E: Environment> {
    env: &'a mut E,
    label: &'a str,
}

impl<E: Environment> Drop for ResetOnDrop<'_, E> {
    fn drop(&mut self) {
        // Nowhere to propagate to from here
        if let Err(e) = self.env.reset() {
            log::error!("Failed to reset environment after scenario {}: {e:?}", self.label);
        }
    }
}

fn describe_panic(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    format!("Scenario panicked: {message}")
}
