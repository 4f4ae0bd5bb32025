//! A single monitor or action outcome.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::ResultError;
use crate::status::Status;

/// Recorded outcome of one monitor or action.
///
/// An item is created pending when the driver reports its start, and
/// resolved exactly once by the matching success/failure/error/skip
/// notification. After resolution it is immutable.
///
/// # Example
///
/// ```rust
/// use vigil::result::ItemResult;
/// use vigil::status::Status;
///
/// let mut item = ItemResult::new("check_response_time");
/// assert!(item.is_pending());
///
/// item.set_status(Status::Failure).unwrap();
/// item.set_error("latency above threshold").unwrap();
///
/// assert_eq!(item.status(), Some(Status::Failure));
/// // A second resolution is a protocol violation.
/// assert!(item.set_status(Status::Success).is_err());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemResult {
    name: String,
    status: Option<Status>,
    error: Option<String>,
    reason: Option<String>,
    start_time: DateTime<Utc>,
    stop_time: Option<DateTime<Utc>>,
}

impl ItemResult {
    /// Create a pending item; `start_time` is recorded now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
            error: None,
            reason: None,
            start_time: Utc::now(),
            stop_time: None,
        }
    }

    /// Stable identity of the item within its step.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terminal status, `None` while pending.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Formatted failure text, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Skip justification, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Whether the item has not been resolved yet.
    pub fn is_pending(&self) -> bool {
        self.status.is_none()
    }

    /// When the item was registered.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// When the item was resolved, `None` while pending.
    pub fn stop_time(&self) -> Option<DateTime<Utc>> {
        self.stop_time
    }

    /// Elapsed time between registration and resolution.
    pub fn time_taken(&self) -> Option<Duration> {
        self.stop_time.map(|stop| stop - self.start_time)
    }

    /// Resolve the item, recording `stop_time`.
    ///
    /// Fails with [`ResultError::InvalidTransition`] if the item was
    /// already resolved; the one-shot transition is the core invariant
    /// of the result model.
    pub fn set_status(&mut self, status: Status) -> Result<(), ResultError> {
        if let Some(current) = self.status {
            return Err(ResultError::InvalidTransition {
                item: self.name.clone(),
                current,
                requested: status,
            });
        }
        self.status = Some(status);
        self.stop_time = Some(Utc::now());
        Ok(())
    }

    /// Attach formatted failure text.
    ///
    /// Valid only once the item carries a failure-like status
    /// (`Failure`, `Error`, or `ExpectedFailure`).
    pub fn set_error(&mut self, text: impl Into<String>) -> Result<(), ResultError> {
        match self.status {
            Some(Status::Failure) | Some(Status::Error) | Some(Status::ExpectedFailure) => {
                self.error = Some(text.into());
                Ok(())
            }
            other => Err(ResultError::ErrorTextNotAllowed {
                item: self.name.clone(),
                status: status_label(other),
            }),
        }
    }

    /// Attach a skip justification.
    ///
    /// Valid alongside `Skipped`, or alongside `Failure` for monitor
    /// skips, which are recorded as failures with the reason kept.
    pub fn set_reason(&mut self, text: impl Into<String>) -> Result<(), ResultError> {
        match self.status {
            Some(Status::Skipped) | Some(Status::Failure) => {
                self.reason = Some(text.into());
                Ok(())
            }
            other => Err(ResultError::ReasonNotAllowed {
                item: self.name.clone(),
                status: status_label(other),
            }),
        }
    }
}

fn status_label(status: Option<Status>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "pending".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_is_pending() {
        let item = ItemResult::new("check_a");
        assert!(item.is_pending());
        assert_eq!(item.status(), None);
        assert_eq!(item.stop_time(), None);
        assert_eq!(item.time_taken(), None);
    }

    #[test]
    fn status_transitions_exactly_once() {
        let mut item = ItemResult::new("check_a");
        item.set_status(Status::Success).unwrap();

        let err = item.set_status(Status::Failure).unwrap_err();
        assert_eq!(
            err,
            ResultError::InvalidTransition {
                item: "check_a".to_string(),
                current: Status::Success,
                requested: Status::Failure,
            }
        );
        assert_eq!(item.status(), Some(Status::Success));
    }

    #[test]
    fn resolution_records_stop_time() {
        let mut item = ItemResult::new("check_a");
        item.set_status(Status::Success).unwrap();
        assert!(item.stop_time().is_some());
        assert!(item.time_taken().unwrap() >= Duration::zero());
    }

    #[test]
    fn error_text_requires_failure_like_status() {
        let mut item = ItemResult::new("check_a");
        assert!(matches!(
            item.set_error("boom"),
            Err(ResultError::ErrorTextNotAllowed { .. })
        ));

        item.set_status(Status::Error).unwrap();
        item.set_error("boom").unwrap();
        assert_eq!(item.error(), Some("boom"));
    }

    #[test]
    fn error_text_rejected_on_success() {
        let mut item = ItemResult::new("check_a");
        item.set_status(Status::Success).unwrap();
        let err = item.set_error("boom").unwrap_err();
        assert!(matches!(err, ResultError::ErrorTextNotAllowed { .. }));
    }

    #[test]
    fn reason_allowed_for_skip_and_failure() {
        let mut skipped = ItemResult::new("send_report");
        skipped.set_status(Status::Skipped).unwrap();
        skipped.set_reason("disabled by settings").unwrap();
        assert_eq!(skipped.reason(), Some("disabled by settings"));

        // Monitor skips are recorded as failures with the reason kept.
        let mut monitor_skip = ItemResult::new("check_a");
        monitor_skip.set_status(Status::Failure).unwrap();
        monitor_skip.set_reason("no data yet").unwrap();
        assert_eq!(monitor_skip.reason(), Some("no data yet"));
    }

    #[test]
    fn reason_rejected_on_success() {
        let mut item = ItemResult::new("check_a");
        item.set_status(Status::Success).unwrap();
        assert!(matches!(
            item.set_reason("why"),
            Err(ResultError::ReasonNotAllowed { .. })
        ));
    }
}
