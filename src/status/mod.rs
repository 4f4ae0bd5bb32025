//! Item kinds, outcome statuses, and the status registry.
//!
//! This module defines the closed vocabulary of the result model:
//! - `ItemKind`: whether an item is a monitor (a check) or an action
//!   (a follow-up task)
//! - `Status`: the terminal outcome recorded for an item
//! - `StatusRegistry`: which statuses are valid per kind, and which
//!   count against a step's success
//!
//! Everything here is pure data and classification; no side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role of a result item within a run.
///
/// Monitors are the checks executed during a run; actions are the
/// follow-up tasks (notifications, reports) executed around them. Steps
/// are homogeneous: a step accepts only items of its own kind.
///
/// # Example
///
/// ```rust
/// use vigil::status::ItemKind;
///
/// assert_eq!(ItemKind::Monitor.noun(), "test");
/// assert_eq!(ItemKind::Action.noun(), "action");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A check executed during the run, analogous to a test case.
    Monitor,
    /// A follow-up task executed before or after the monitors.
    Action,
}

impl ItemKind {
    /// Human noun used in report footers (`"2 tests in 0.103s"`).
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Monitor => "test",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Monitor => "monitor",
            Self::Action => "action",
        };
        write!(f, "{}", label)
    }
}

/// Terminal outcome of a single monitor or action.
///
/// An item starts with no status and receives exactly one of these,
/// after which it is never mutated again. `Display` yields the short
/// token used in verbose report lines and error dumps.
///
/// # Example
///
/// ```rust
/// use vigil::status::Status;
///
/// assert_eq!(Status::Failure.to_string(), "fail");
/// assert_eq!(Status::Failure.dot(), 'F');
/// assert_eq!(Status::Success.dot(), '.');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The item passed.
    Success,
    /// The item ran and its verdict was negative.
    Failure,
    /// The item raised an unexpected error while running.
    Error,
    /// The item was skipped with a reason.
    Skipped,
    /// The item failed, and that failure was anticipated.
    ExpectedFailure,
    /// The item passed although it was expected to fail.
    UnexpectedSuccess,
}

impl Status {
    /// Single progress character written in dotted mode.
    pub fn dot(&self) -> char {
        match self {
            Self::Success => '.',
            Self::Failure => 'F',
            Self::Error => 'E',
            Self::Skipped => 's',
            Self::ExpectedFailure => 'x',
            Self::UnexpectedSuccess => 'u',
        }
    }

    /// Counter name for the summary line, `None` for successes.
    ///
    /// Successes are implied by the `OK` verdict; only the other
    /// outcomes surface as `key=value` counters.
    pub fn info_key(&self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::Failure => Some("failures"),
            Self::Error => Some("errors"),
            Self::Skipped => Some("skipped"),
            Self::ExpectedFailure => Some("expected_failures"),
            Self::UnexpectedSuccess => Some("unexpected_successes"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Success => "pass",
            Self::Failure => "fail",
            Self::Error => "error",
            Self::Skipped => "skip",
            Self::ExpectedFailure => "expected_failure",
            Self::UnexpectedSuccess => "unexpected_success",
        };
        write!(f, "{}", token)
    }
}

/// Statuses a monitor item may carry, in declared order.
const MONITOR_STATUSES: &[Status] = &[
    Status::Success,
    Status::Failure,
    Status::Error,
    Status::Skipped,
    Status::ExpectedFailure,
    Status::UnexpectedSuccess,
];

/// Statuses an action item may carry, in declared order.
const ACTION_STATUSES: &[Status] = &[Status::Success, Status::Skipped, Status::Error];

/// Classification policy for statuses, per item kind.
///
/// The registry answers three questions: which statuses are valid for a
/// kind, which count against a step's success, and which appear in the
/// error dump section of a report. The default policy preserves the
/// asymmetric skip semantics of the original system: a skipped monitor
/// is recorded as a `Failure` (with the skip reason attached) and so
/// counts against the run, while a skipped action stays neutral.
///
/// # Example
///
/// ```rust
/// use vigil::status::{ItemKind, Status, StatusRegistry};
///
/// let registry = StatusRegistry::default();
/// assert!(registry.is_error(ItemKind::Monitor, Status::Failure));
/// assert!(!registry.is_error(ItemKind::Action, Status::Skipped));
/// assert!(!registry.is_valid(ItemKind::Action, Status::ExpectedFailure));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRegistry {
    /// Statuses counted against a monitor step, in dump order.
    monitor_error_statuses: Vec<Status>,
    /// Statuses counted against an action step, in dump order.
    action_error_statuses: Vec<Status>,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self {
            monitor_error_statuses: vec![Status::Failure, Status::Error],
            action_error_statuses: vec![Status::Error],
        }
    }
}

impl StatusRegistry {
    /// Closed set of statuses an item of `kind` may carry.
    pub fn valid_statuses(&self, kind: ItemKind) -> &'static [Status] {
        match kind {
            ItemKind::Monitor => MONITOR_STATUSES,
            ItemKind::Action => ACTION_STATUSES,
        }
    }

    /// Statuses counted against success for `kind`, in declared order.
    pub fn error_statuses(&self, kind: ItemKind) -> &[Status] {
        match kind {
            ItemKind::Monitor => &self.monitor_error_statuses,
            ItemKind::Action => &self.action_error_statuses,
        }
    }

    /// Statuses whose items are included in the report's error dump.
    ///
    /// Identical to [`error_statuses`](Self::error_statuses): failures
    /// and errors carry dumpable text, neutral outcomes do not.
    pub fn dump_statuses(&self, kind: ItemKind) -> &[Status] {
        self.error_statuses(kind)
    }

    /// Whether `status` counts against success for `kind`.
    pub fn is_error(&self, kind: ItemKind, status: Status) -> bool {
        self.error_statuses(kind).contains(&status)
    }

    /// Whether `status` is part of the closed set for `kind`.
    pub fn is_valid(&self, kind: ItemKind, status: Status) -> bool {
        self.valid_statuses(kind).contains(&status)
    }
}
