//! Serializable snapshots of a run for downstream consumers.
//!
//! A [`RunSummary`] is a pure projection of a [`RunResult`] into plain
//! data: run identity, per-step verdicts, counters, and item outcomes.
//! Exit-code decisions and notification dispatch can consume it without
//! touching the live result model; `to_json` serializes it for
//! transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::{ItemResult, RunResult, Step};
use crate::status::{ItemKind, Status};

/// Snapshot of a single item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    /// `None` while the item is still pending (aborted runs).
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&ItemResult> for ItemSummary {
    fn from(item: &ItemResult) -> Self {
        Self {
            name: item.name().to_string(),
            status: item.status(),
            error: item.error().map(str::to_string),
            reason: item.reason().map(str::to_string),
        }
    }
}

/// Snapshot of a single step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepSummary {
    pub name: String,
    pub kind: ItemKind,
    pub successful: bool,
    pub item_count: usize,
    /// `None` when the step never finished.
    pub elapsed_secs: Option<f64>,
    /// Nonzero counters, in declared status order.
    pub counters: Vec<(String, usize)>,
    pub items: Vec<ItemSummary>,
}

impl From<&Step> for StepSummary {
    fn from(step: &Step) -> Self {
        Self {
            name: step.name().to_string(),
            kind: step.kind(),
            successful: step.successful(),
            item_count: step.number_of_items(),
            elapsed_secs: step
                .time_taken()
                .map(|d| d.num_milliseconds() as f64 / 1000.0),
            counters: step
                .infos()
                .into_iter()
                .filter(|&(_, count)| count > 0)
                .map(|(key, count)| (key.to_string(), count))
                .collect(),
            items: step.all_items().iter().map(ItemSummary::from).collect(),
        }
    }
}

/// Snapshot of a whole run.
///
/// # Example
///
/// ```rust
/// use vigil::result::RunResult;
/// use vigil::schema::RunSchema;
/// use vigil::summary::RunSummary;
///
/// let mut run = RunResult::new(&RunSchema::default());
/// run.next_step().unwrap();
/// run.start_test("check_a").unwrap();
/// run.add_success("check_a").unwrap();
/// run.finish_step().unwrap();
///
/// let summary = RunSummary::of(&run);
/// assert!(summary.all_monitors_passed);
/// assert_eq!(summary.steps[0].item_count, 1);
/// let json = summary.to_json().unwrap();
/// assert!(json.contains("check_a"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub all_monitors_passed: bool,
    pub steps: Vec<StepSummary>,
}

impl RunSummary {
    /// Snapshot `run` as it stands right now.
    pub fn of(run: &RunResult) -> Self {
        Self {
            run_id: run.run_id(),
            generated_at: Utc::now(),
            all_monitors_passed: run.all_monitors_passed(),
            steps: run.steps().iter().map(StepSummary::from).collect(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
