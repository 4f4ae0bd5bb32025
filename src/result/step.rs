//! A named phase of the run and the items recorded within it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::ResultError;
use super::item::ItemResult;
use crate::status::{ItemKind, Status, StatusRegistry};

/// One phase of a monitoring run: an ordered, keyed collection of
/// [`ItemResult`]s that all share the step's kind.
///
/// Items are kept in insertion order for reporting, with a name index
/// for O(1) lookup. The step itself has a small lifecycle: `start()`
/// once when it becomes current, `finish()` once when the run moves
/// past it.
///
/// # Example
///
/// ```rust
/// use vigil::result::Step;
/// use vigil::status::{ItemKind, Status, StatusRegistry};
///
/// let mut step = Step::new("monitors", ItemKind::Monitor, StatusRegistry::default());
/// step.start().unwrap();
/// step.add_item("check_a").unwrap();
/// step.record_status("check_a", Status::Success).unwrap();
/// step.finish().unwrap();
///
/// assert!(step.successful());
/// assert_eq!(step.number_of_items(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    name: String,
    kind: ItemKind,
    registry: StatusRegistry,
    items: Vec<ItemResult>,
    index: HashMap<String, usize>,
    start_time: Option<DateTime<Utc>>,
    stop_time: Option<DateTime<Utc>>,
}

impl Step {
    /// Create an empty, not-yet-started step.
    pub fn new(name: impl Into<String>, kind: ItemKind, registry: StatusRegistry) -> Self {
        Self {
            name: name.into(),
            kind,
            registry,
            items: Vec::new(),
            index: HashMap::new(),
            start_time: None,
            stop_time: None,
        }
    }

    /// Step name, from the schema's fixed ordered set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which lifecycle notifications this step accepts.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Mark the step as current; records `start_time`.
    pub fn start(&mut self) -> Result<(), ResultError> {
        if self.start_time.is_some() {
            return Err(ResultError::AlreadyStarted {
                step: self.name.clone(),
            });
        }
        self.start_time = Some(Utc::now());
        Ok(())
    }

    /// Close the step; records `stop_time`.
    pub fn finish(&mut self) -> Result<(), ResultError> {
        if self.start_time.is_none() {
            return Err(ResultError::NotStarted {
                step: self.name.clone(),
            });
        }
        if self.stop_time.is_some() {
            return Err(ResultError::AlreadyFinished {
                step: self.name.clone(),
            });
        }
        self.stop_time = Some(Utc::now());
        Ok(())
    }

    /// Register a new pending item under `name`.
    pub fn add_item(&mut self, name: impl Into<String>) -> Result<(), ResultError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ResultError::DuplicateItem {
                step: self.name.clone(),
                item: name,
            });
        }
        self.index.insert(name.clone(), self.items.len());
        self.items.push(ItemResult::new(name));
        Ok(())
    }

    /// Look up a previously registered item.
    pub fn item(&self, name: &str) -> Result<&ItemResult, ResultError> {
        self.index
            .get(name)
            .map(|&i| &self.items[i])
            .ok_or_else(|| ResultError::UnknownItem {
                step: self.name.clone(),
                item: name.to_string(),
            })
    }

    /// Mutable lookup of a previously registered item.
    pub fn item_mut(&mut self, name: &str) -> Result<&mut ItemResult, ResultError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.items[i]),
            None => Err(ResultError::UnknownItem {
                step: self.name.clone(),
                item: name.to_string(),
            }),
        }
    }

    /// Resolve an item with a status from this step's closed set.
    ///
    /// Validates the status against the registry for this kind before
    /// delegating to [`ItemResult::set_status`].
    pub fn record_status(&mut self, name: &str, status: Status) -> Result<(), ResultError> {
        if !self.registry.is_valid(self.kind, status) {
            return Err(ResultError::InvalidStatus {
                kind: self.kind,
                status,
            });
        }
        self.item_mut(name)?.set_status(status)
    }

    /// True iff no item carries an error-like status.
    pub fn successful(&self) -> bool {
        self.registry
            .error_statuses(self.kind)
            .iter()
            .all(|&status| self.items_for_status(status).next().is_none())
    }

    /// Items with `status`, in insertion order.
    ///
    /// Each call returns a fresh iterator, so the sequence is
    /// restartable and stable across iterations.
    pub fn items_for_status(&self, status: Status) -> impl Iterator<Item = &ItemResult> {
        self.items
            .iter()
            .filter(move |item| item.status() == Some(status))
    }

    /// The full ordered sequence of items.
    pub fn all_items(&self) -> &[ItemResult] {
        &self.items
    }

    /// Number of registered items, pending or resolved.
    pub fn number_of_items(&self) -> usize {
        self.items.len()
    }

    /// Elapsed time between `start()` and `finish()`.
    pub fn time_taken(&self) -> Option<Duration> {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => Some(stop - start),
            _ => None,
        }
    }

    /// When the step became current.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// When the step was closed.
    pub fn stop_time(&self) -> Option<DateTime<Utc>> {
        self.stop_time
    }

    /// Error-like statuses for this step's kind, in dump order.
    pub fn error_statuses(&self) -> &[Status] {
        self.registry.error_statuses(self.kind)
    }

    /// Aggregate counters for the summary line.
    ///
    /// One `(key, count)` pair per non-success status of this kind, in
    /// declared status order. Zero counts are included; the reporter
    /// filters them.
    pub fn infos(&self) -> Vec<(&'static str, usize)> {
        self.registry
            .valid_statuses(self.kind)
            .iter()
            .filter_map(|status| {
                status
                    .info_key()
                    .map(|key| (key, self.items_for_status(*status).count()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor_step() -> Step {
        Step::new("monitors", ItemKind::Monitor, StatusRegistry::default())
    }

    #[test]
    fn start_twice_fails() {
        let mut step = monitor_step();
        step.start().unwrap();
        assert!(matches!(
            step.start(),
            Err(ResultError::AlreadyStarted { .. })
        ));
    }

    #[test]
    fn finish_before_start_fails() {
        let mut step = monitor_step();
        assert!(matches!(
            step.finish(),
            Err(ResultError::NotStarted { .. })
        ));
    }

    #[test]
    fn finish_twice_fails() {
        let mut step = monitor_step();
        step.start().unwrap();
        step.finish().unwrap();
        assert!(matches!(
            step.finish(),
            Err(ResultError::AlreadyFinished { .. })
        ));
    }

    #[test]
    fn duplicate_item_rejected() {
        let mut step = monitor_step();
        step.add_item("check_a").unwrap();
        let err = step.add_item("check_a").unwrap_err();
        assert!(matches!(err, ResultError::DuplicateItem { .. }));
    }

    #[test]
    fn unknown_item_rejected() {
        let step = monitor_step();
        assert!(matches!(
            step.item("ghost"),
            Err(ResultError::UnknownItem { .. })
        ));
    }

    #[test]
    fn record_status_validates_against_registry() {
        let mut step = Step::new("actions", ItemKind::Action, StatusRegistry::default());
        step.add_item("notify").unwrap();
        let err = step
            .record_status("notify", Status::ExpectedFailure)
            .unwrap_err();
        assert_eq!(
            err,
            ResultError::InvalidStatus {
                kind: ItemKind::Action,
                status: Status::ExpectedFailure,
            }
        );
    }

    #[test]
    fn items_for_status_preserves_insertion_order() {
        let mut step = monitor_step();
        for name in ["a", "b", "c", "d"] {
            step.add_item(name).unwrap();
        }
        step.record_status("a", Status::Failure).unwrap();
        step.record_status("b", Status::Success).unwrap();
        step.record_status("c", Status::Failure).unwrap();
        step.record_status("d", Status::Failure).unwrap();

        let failed: Vec<&str> = step
            .items_for_status(Status::Failure)
            .map(|item| item.name())
            .collect();
        assert_eq!(failed, vec!["a", "c", "d"]);

        // Restartable: a second pass yields the same sequence.
        let again: Vec<&str> = step
            .items_for_status(Status::Failure)
            .map(|item| item.name())
            .collect();
        assert_eq!(failed, again);
    }

    #[test]
    fn successful_tracks_error_statuses_only() {
        let mut step = monitor_step();
        step.add_item("a").unwrap();
        step.add_item("b").unwrap();
        step.record_status("a", Status::Success).unwrap();
        step.record_status("b", Status::ExpectedFailure).unwrap();
        assert!(step.successful());

        step.add_item("c").unwrap();
        step.record_status("c", Status::Error).unwrap();
        assert!(!step.successful());
    }

    #[test]
    fn infos_count_per_status_in_declared_order() {
        let mut step = monitor_step();
        for name in ["a", "b", "c"] {
            step.add_item(name).unwrap();
        }
        step.record_status("a", Status::Failure).unwrap();
        step.record_status("b", Status::Failure).unwrap();
        step.record_status("c", Status::Error).unwrap();

        let infos = step.infos();
        assert_eq!(
            infos,
            vec![
                ("failures", 2),
                ("errors", 1),
                ("skipped", 0),
                ("expected_failures", 0),
                ("unexpected_successes", 0),
            ]
        );
    }

    #[test]
    fn time_taken_requires_both_ends() {
        let mut step = monitor_step();
        assert_eq!(step.time_taken(), None);
        step.start().unwrap();
        assert_eq!(step.time_taken(), None);
        step.finish().unwrap();
        assert!(step.time_taken().unwrap() >= Duration::zero());
    }
}
