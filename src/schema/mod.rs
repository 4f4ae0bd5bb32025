//! Run schemas: the configuration surface of the result model.
//!
//! A [`RunSchema`] carries everything the original system read from
//! ambient settings: the ordered list of step names, which steps take
//! monitors vs actions, the canonical roles used by the derived result
//! views, and the status classification policy. A `RunResult` built
//! from a schema is fully parameterized and testable in isolation.

pub mod error;

pub use error::SchemaError;

use serde::{Deserialize, Serialize};

use crate::status::{ItemKind, StatusRegistry};

/// Canonical hooks for the derived result views.
///
/// Roles identify the steps the read-only query surface reaches into:
/// `Monitors` backs `monitor_results`/`all_monitors_passed`, the three
/// action roles back the finished/passed/failed action views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRole {
    /// The step that runs the monitors themselves.
    Monitors,
    /// Actions dispatched whenever the monitors finish.
    MonitorsFinished,
    /// Actions dispatched when all monitors passed.
    MonitorsPassed,
    /// Actions dispatched when any monitor failed.
    MonitorsFailed,
}

impl StepRole {
    /// The item kind a step carrying this role must have.
    pub fn required_kind(&self) -> ItemKind {
        match self {
            Self::Monitors => ItemKind::Monitor,
            _ => ItemKind::Action,
        }
    }
}

/// Declaration of a single step: name, kind, optional canonical role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub role: Option<StepRole>,
}

/// Ordered step declarations plus the status policy for a run.
///
/// The default schema mirrors the original pipeline: one monitor step
/// followed by three action steps keyed to the monitors' outcome.
///
/// # Example
///
/// ```rust
/// use vigil::schema::{RunSchema, StepRole};
/// use vigil::status::ItemKind;
///
/// let schema = RunSchema::builder()
///     .step("pre_checks", ItemKind::Monitor)
///     .role(StepRole::Monitors)
///     .step("alerts", ItemKind::Action)
///     .role(StepRole::MonitorsFailed)
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.steps().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSchema {
    steps: Vec<StepSpec>,
    #[serde(default)]
    registry: StatusRegistry,
}

impl Default for RunSchema {
    fn default() -> Self {
        Self::builder()
            .step("monitors", ItemKind::Monitor)
            .role(StepRole::Monitors)
            .step("monitors_finished", ItemKind::Action)
            .role(StepRole::MonitorsFinished)
            .step("monitors_passed", ItemKind::Action)
            .role(StepRole::MonitorsPassed)
            .step("monitors_failed", ItemKind::Action)
            .role(StepRole::MonitorsFailed)
            .build()
            .unwrap_or_else(|_| unreachable!("default schema is statically valid"))
    }
}

impl RunSchema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// The ordered step declarations.
    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    /// The status classification policy.
    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    /// Name of the step carrying `role`, if declared.
    pub fn step_for_role(&self, role: StepRole) -> Option<&str> {
        self.steps
            .iter()
            .find(|spec| spec.role == Some(role))
            .map(|spec| spec.name.as_str())
    }
}

/// Fluent builder for [`RunSchema`].
///
/// `.role()` applies to the most recently added step. Validation is
/// collected in `build()`.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    steps: Vec<StepSpec>,
    registry: StatusRegistry,
    pending_error: Option<SchemaError>,
}

impl SchemaBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step declaration.
    pub fn step(mut self, name: impl Into<String>, kind: ItemKind) -> Self {
        self.steps.push(StepSpec {
            name: name.into(),
            kind,
            role: None,
        });
        self
    }

    /// Assign a canonical role to the most recently added step.
    pub fn role(mut self, role: StepRole) -> Self {
        match self.steps.last_mut() {
            Some(spec) => spec.role = Some(role),
            None => {
                self.pending_error.get_or_insert(SchemaError::RoleWithoutStep);
            }
        }
        self
    }

    /// Override the default status policy.
    pub fn registry(mut self, registry: StatusRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Validate and produce the schema.
    pub fn build(self) -> Result<RunSchema, SchemaError> {
        if let Some(err) = self.pending_error {
            return Err(err);
        }
        if self.steps.is_empty() {
            return Err(SchemaError::NoSteps);
        }
        for (i, spec) in self.steps.iter().enumerate() {
            if self.steps[..i].iter().any(|other| other.name == spec.name) {
                return Err(SchemaError::DuplicateStep(spec.name.clone()));
            }
            if let Some(role) = spec.role {
                if self.steps[..i].iter().any(|other| other.role == Some(role)) {
                    return Err(SchemaError::DuplicateRole(role));
                }
                if spec.kind != role.required_kind() {
                    return Err(SchemaError::RoleKindMismatch {
                        role,
                        step: spec.name.clone(),
                        expected: role.required_kind(),
                    });
                }
            }
        }
        Ok(RunSchema {
            steps: self.steps,
            registry: self.registry,
        })
    }
}
