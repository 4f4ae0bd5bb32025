//! Lifecycle protocol errors.
//!
//! Every variant here is a driver-side contract violation: the sequence
//! of lifecycle calls broke the fixed protocol. They are raised
//! immediately and never caught or retried inside the crate.

use thiserror::Error;

use crate::status::{ItemKind, Status};

/// Errors raised when the result lifecycle protocol is violated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResultError {
    /// An item's status may be set exactly once.
    #[error("item '{item}' already resolved to '{current}', cannot set '{requested}'")]
    InvalidTransition {
        item: String,
        current: Status,
        requested: Status,
    },

    /// The status is not in the closed set for the step's kind.
    #[error("status '{status}' is not valid for {kind} items")]
    InvalidStatus { kind: ItemKind, status: Status },

    /// Error text attaches only to failure-like statuses.
    #[error("error text requires a failure-like status, item '{item}' has '{status}'")]
    ErrorTextNotAllowed { item: String, status: String },

    /// Skip reasons attach only to skip or failure statuses.
    #[error("skip reason requires a skip or failure status, item '{item}' has '{status}'")]
    ReasonNotAllowed { item: String, status: String },

    /// `start()` called twice on the same step.
    #[error("step '{step}' already started")]
    AlreadyStarted { step: String },

    /// `finish()` called before `start()`.
    #[error("step '{step}' cannot finish before it is started")]
    NotStarted { step: String },

    /// `finish()` called twice on the same step.
    #[error("step '{step}' already finished")]
    AlreadyFinished { step: String },

    /// An item identity was registered twice within one step.
    #[error("item '{item}' already registered in step '{step}'")]
    DuplicateItem { step: String, item: String },

    /// A lookup for an identity that was never registered.
    #[error("unknown item '{item}' in step '{step}'")]
    UnknownItem { step: String, item: String },

    /// `next_step()` called past the last declared step.
    #[error("no more steps after '{last}'")]
    NoMoreSteps { last: String },

    /// A lifecycle call arrived before the first `next_step()`.
    #[error("no current step, call next_step() first")]
    NoCurrentStep,

    /// A lifecycle call whose kind does not match the current step.
    #[error("step '{step}' does not accept {required}-kind results")]
    WrongStepKind { step: String, required: ItemKind },
}
