//! Schema construction errors.

use thiserror::Error;

use crate::schema::StepRole;
use crate::status::ItemKind;

/// Errors that can occur when building a run schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("No steps declared. Add at least one step before .build()")]
    NoSteps,

    #[error("Step '{0}' declared twice. Step names must be unique")]
    DuplicateStep(String),

    #[error("Role {0:?} assigned to more than one step")]
    DuplicateRole(StepRole),

    #[error("Role {role:?} requires a {expected}-kind step, but '{step}' is not")]
    RoleKindMismatch {
        role: StepRole,
        step: String,
        expected: ItemKind,
    },

    #[error("Called .role() before any .step()")]
    RoleWithoutStep,
}
