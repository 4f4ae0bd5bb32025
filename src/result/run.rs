//! The run-level state machine routing lifecycle notifications.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::error::ResultError;
use super::item::ItemResult;
use super::step::Step;
use crate::schema::{RunSchema, StepRole};
use crate::status::{ItemKind, Status};

/// Aggregated results of one monitoring run.
///
/// A `RunResult` owns the fixed ordered sequence of [`Step`]s declared
/// by its schema, tracks which step is current, and routes per-item
/// lifecycle notifications to it. Steps are visited strictly in order,
/// each exactly once; every call that does not fit the protocol fails
/// with a [`ResultError`].
///
/// The external driver is expected to call, per step:
/// `next_step()`, then for each item a start notification followed by
/// exactly one outcome notification, then `finish_step()`.
///
/// # Example
///
/// ```rust
/// use vigil::result::RunResult;
/// use vigil::schema::RunSchema;
///
/// let mut run = RunResult::new(&RunSchema::default());
/// run.next_step().unwrap();
/// run.start_test("check_a").unwrap();
/// run.add_success("check_a").unwrap();
/// run.finish_step().unwrap();
///
/// assert!(run.all_monitors_passed());
/// ```
#[derive(Debug, Serialize)]
pub struct RunResult {
    run_id: Uuid,
    steps: Vec<Step>,
    #[serde(skip)]
    roles: HashMap<StepRole, usize>,
    current: Option<usize>,
}

impl RunResult {
    /// Pre-create every step declared by the schema, in order.
    pub fn new(schema: &RunSchema) -> Self {
        let mut roles = HashMap::new();
        let steps = schema
            .steps()
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                if let Some(role) = spec.role {
                    roles.insert(role, i);
                }
                Step::new(spec.name.clone(), spec.kind, schema.registry().clone())
            })
            .collect();
        Self {
            run_id: Uuid::new_v4(),
            steps,
            roles,
            current: None,
        }
    }

    /// Unique identifier of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// All steps, in declared order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The step currently receiving notifications.
    pub fn current_step(&self) -> Result<&Step, ResultError> {
        self.current
            .map(|i| &self.steps[i])
            .ok_or(ResultError::NoCurrentStep)
    }

    /// Advance to (and start) the next step in declared order.
    ///
    /// Fails with [`ResultError::NoMoreSteps`] past the last step.
    pub fn next_step(&mut self) -> Result<(), ResultError> {
        let next = match self.current {
            None => 0,
            Some(i) if i + 1 < self.steps.len() => i + 1,
            Some(i) => {
                return Err(ResultError::NoMoreSteps {
                    last: self.steps[i].name().to_string(),
                })
            }
        };
        self.steps[next].start()?;
        self.current = Some(next);
        Ok(())
    }

    /// Close the current step. Does not advance.
    pub fn finish_step(&mut self) -> Result<(), ResultError> {
        self.current_step_mut()?.finish()
    }

    // Monitor lifecycle. Valid only while the current step is
    // monitor-kind; the guard runs before any mutation.

    /// Register a monitor as started.
    pub fn start_test(&mut self, name: &str) -> Result<(), ResultError> {
        self.step_of_kind(ItemKind::Monitor)?.add_item(name)
    }

    /// Record a passing monitor.
    pub fn add_success(&mut self, name: &str) -> Result<(), ResultError> {
        self.step_of_kind(ItemKind::Monitor)?
            .record_status(name, Status::Success)
    }

    /// Record a failed monitor with its formatted failure text.
    pub fn add_failure(&mut self, name: &str, error: &str) -> Result<(), ResultError> {
        let step = self.step_of_kind(ItemKind::Monitor)?;
        step.record_status(name, Status::Failure)?;
        step.item_mut(name)?.set_error(error)
    }

    /// Record a monitor that raised an unexpected error.
    pub fn add_error(&mut self, name: &str, error: &str) -> Result<(), ResultError> {
        let step = self.step_of_kind(ItemKind::Monitor)?;
        step.record_status(name, Status::Error)?;
        step.item_mut(name)?.set_error(error)
    }

    /// Record a skipped monitor.
    ///
    /// Skipped monitors count against the run: the item is resolved as
    /// a failure with the skip reason attached.
    pub fn add_skip(&mut self, name: &str, reason: &str) -> Result<(), ResultError> {
        let step = self.step_of_kind(ItemKind::Monitor)?;
        step.record_status(name, Status::Failure)?;
        step.item_mut(name)?.set_reason(reason)
    }

    /// Record a monitor that failed as anticipated.
    pub fn add_expected_failure(&mut self, name: &str, error: &str) -> Result<(), ResultError> {
        let step = self.step_of_kind(ItemKind::Monitor)?;
        step.record_status(name, Status::ExpectedFailure)?;
        step.item_mut(name)?.set_error(error)
    }

    /// Record a monitor that passed although it was expected to fail.
    pub fn add_unexpected_success(&mut self, name: &str) -> Result<(), ResultError> {
        self.step_of_kind(ItemKind::Monitor)?
            .record_status(name, Status::UnexpectedSuccess)
    }

    // Action lifecycle, guarded symmetrically.

    /// Register an action as started.
    pub fn start_action(&mut self, name: &str) -> Result<(), ResultError> {
        self.step_of_kind(ItemKind::Action)?.add_item(name)
    }

    /// Record a completed action.
    pub fn add_action_success(&mut self, name: &str) -> Result<(), ResultError> {
        self.step_of_kind(ItemKind::Action)?
            .record_status(name, Status::Success)
    }

    /// Record a skipped action. Neutral: does not count against the run.
    pub fn add_action_skip(&mut self, name: &str, reason: &str) -> Result<(), ResultError> {
        let step = self.step_of_kind(ItemKind::Action)?;
        step.record_status(name, Status::Skipped)?;
        step.item_mut(name)?.set_reason(reason)
    }

    /// Record a failed action with its error text.
    pub fn add_action_error(&mut self, name: &str, error: &str) -> Result<(), ResultError> {
        let step = self.step_of_kind(ItemKind::Action)?;
        step.record_status(name, Status::Error)?;
        step.item_mut(name)?.set_error(error)
    }

    // Read-only views over the role-tagged steps. All are pure
    // projections; a missing role yields an empty (or vacuously
    // successful) view.

    /// True iff the monitors step has no error-like item.
    pub fn all_monitors_passed(&self) -> bool {
        self.step_for_role(StepRole::Monitors)
            .map(Step::successful)
            .unwrap_or(true)
    }

    /// Every monitor result, in execution order.
    pub fn monitor_results(&self) -> &[ItemResult] {
        self.role_items(StepRole::Monitors)
    }

    /// Monitors that passed.
    pub fn monitors_passed_results(&self) -> Vec<&ItemResult> {
        self.step_for_role(StepRole::Monitors)
            .map(|step| step.items_for_status(Status::Success).collect())
            .unwrap_or_default()
    }

    /// Monitors that failed (including skips, recorded as failures).
    pub fn failed_monitors_results(&self) -> Vec<&ItemResult> {
        self.step_for_role(StepRole::Monitors)
            .map(|step| step.items_for_status(Status::Failure).collect())
            .unwrap_or_default()
    }

    /// Actions from the monitors-finished step.
    pub fn finished_action_results(&self) -> &[ItemResult] {
        self.role_items(StepRole::MonitorsFinished)
    }

    /// Actions from the monitors-passed step.
    pub fn passed_action_results(&self) -> &[ItemResult] {
        self.role_items(StepRole::MonitorsPassed)
    }

    /// Actions from the monitors-failed step.
    pub fn failed_action_results(&self) -> &[ItemResult] {
        self.role_items(StepRole::MonitorsFailed)
    }

    fn current_step_mut(&mut self) -> Result<&mut Step, ResultError> {
        match self.current {
            Some(i) => Ok(&mut self.steps[i]),
            None => Err(ResultError::NoCurrentStep),
        }
    }

    fn step_of_kind(&mut self, required: ItemKind) -> Result<&mut Step, ResultError> {
        let step = self.current_step_mut()?;
        if step.kind() != required {
            return Err(ResultError::WrongStepKind {
                step: step.name().to_string(),
                required,
            });
        }
        Ok(step)
    }

    fn step_for_role(&self, role: StepRole) -> Option<&Step> {
        self.roles.get(&role).map(|&i| &self.steps[i])
    }

    fn role_items(&self, role: StepRole) -> &[ItemResult] {
        self.step_for_role(role)
            .map(Step::all_items)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RunSchema;

    fn run() -> RunResult {
        RunResult::new(&RunSchema::default())
    }

    #[test]
    fn steps_are_precreated_in_declared_order() {
        let run = run();
        let names: Vec<&str> = run.steps().iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec![
                "monitors",
                "monitors_finished",
                "monitors_passed",
                "monitors_failed",
            ]
        );
    }

    #[test]
    fn no_current_step_before_first_advance() {
        let mut run = run();
        assert!(matches!(
            run.current_step(),
            Err(ResultError::NoCurrentStep)
        ));
        assert!(matches!(
            run.finish_step(),
            Err(ResultError::NoCurrentStep)
        ));
        assert!(matches!(
            run.start_test("a"),
            Err(ResultError::NoCurrentStep)
        ));
    }

    #[test]
    fn next_step_advances_in_order_and_starts_each_step() {
        let mut run = run();
        run.next_step().unwrap();
        assert_eq!(run.current_step().unwrap().name(), "monitors");
        assert!(run.current_step().unwrap().start_time().is_some());

        run.next_step().unwrap();
        assert_eq!(run.current_step().unwrap().name(), "monitors_finished");
    }

    #[test]
    fn next_step_past_the_end_fails() {
        let mut run = run();
        for _ in 0..4 {
            run.next_step().unwrap();
        }
        let err = run.next_step().unwrap_err();
        assert_eq!(
            err,
            ResultError::NoMoreSteps {
                last: "monitors_failed".to_string(),
            }
        );
    }

    #[test]
    fn monitor_calls_rejected_on_action_steps() {
        let mut run = run();
        run.next_step().unwrap();
        run.finish_step().unwrap();
        run.next_step().unwrap(); // monitors_finished, action-kind

        let err = run.start_test("check_a").unwrap_err();
        assert_eq!(
            err,
            ResultError::WrongStepKind {
                step: "monitors_finished".to_string(),
                required: ItemKind::Monitor,
            }
        );
    }

    #[test]
    fn action_calls_rejected_on_monitor_steps() {
        let mut run = run();
        run.next_step().unwrap(); // monitors
        let err = run.add_action_success("notify").unwrap_err();
        assert_eq!(
            err,
            ResultError::WrongStepKind {
                step: "monitors".to_string(),
                required: ItemKind::Action,
            }
        );
    }

    #[test]
    fn outcome_before_start_is_unknown_item() {
        let mut run = run();
        run.next_step().unwrap();
        assert!(matches!(
            run.add_success("never_started"),
            Err(ResultError::UnknownItem { .. })
        ));
    }

    #[test]
    fn second_outcome_for_an_item_fails() {
        let mut run = run();
        run.next_step().unwrap();
        run.start_test("check_a").unwrap();
        run.add_success("check_a").unwrap();
        assert!(matches!(
            run.add_failure("check_a", "late failure"),
            Err(ResultError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn monitor_skip_counts_as_failure_with_reason() {
        let mut run = run();
        run.next_step().unwrap();
        run.start_test("check_a").unwrap();
        run.add_skip("check_a", "no data yet").unwrap();

        assert!(!run.all_monitors_passed());
        let failed = run.failed_monitors_results();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].reason(), Some("no data yet"));
    }

    #[test]
    fn action_skip_is_neutral() {
        let mut run = run();
        run.next_step().unwrap();
        run.finish_step().unwrap();
        run.next_step().unwrap();
        run.start_action("notify").unwrap();
        run.add_action_skip("notify", "disabled").unwrap();
        run.finish_step().unwrap();

        assert!(run.steps()[1].successful());
        assert_eq!(run.finished_action_results().len(), 1);
    }

    #[test]
    fn derived_views_project_the_monitors_step() {
        let mut run = run();
        run.next_step().unwrap();
        run.start_test("a").unwrap();
        run.add_success("a").unwrap();
        run.start_test("b").unwrap();
        run.add_failure("b", "threshold exceeded").unwrap();
        run.finish_step().unwrap();

        assert!(!run.all_monitors_passed());
        assert_eq!(run.monitor_results().len(), 2);

        let passed: Vec<&str> = run
            .monitors_passed_results()
            .iter()
            .map(|item| item.name())
            .collect();
        assert_eq!(passed, vec!["a"]);

        let failed: Vec<&str> = run
            .failed_monitors_results()
            .iter()
            .map(|item| item.name())
            .collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn expected_failure_does_not_fail_the_run() {
        let mut run = run();
        run.next_step().unwrap();
        run.start_test("a").unwrap();
        run.add_expected_failure("a", "known flake").unwrap();
        run.start_test("b").unwrap();
        run.add_unexpected_success("b").unwrap();
        run.finish_step().unwrap();

        assert!(run.all_monitors_passed());
        assert_eq!(run.monitor_results()[0].error(), Some("known flake"));
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(run().run_id(), run().run_id());
    }
}
