//! Vigil: result aggregation and text reporting for monitoring runs
//!
//! Vigil records the outcomes of a monitoring run organized as ordered
//! steps (pre-checks, monitor execution, follow-up actions), tracks
//! per-item status and timing, and renders a human-readable report
//! incrementally as results arrive.
//!
//! # Core Concepts
//!
//! - **Schema**: the ordered step declarations and status policy,
//!   supplied at construction via [`schema::RunSchema`]
//! - **Result model**: [`result::RunResult`] routes lifecycle
//!   notifications to the current [`result::Step`], which owns the
//!   ordered [`result::ItemResult`]s
//! - **Reporting**: [`report::TextReporter`] composes over the result
//!   model and streams banners, progress marks, failure dumps, and
//!   per-step summaries
//!
//! # Example
//!
//! ```rust
//! use vigil::report::TextReporter;
//! use vigil::schema::RunSchema;
//!
//! let mut reporter = TextReporter::new(&RunSchema::default(), Vec::new(), 1);
//!
//! reporter.next_step().unwrap();
//! reporter.start_test("check_item_count").unwrap();
//! reporter.add_success("check_item_count").unwrap();
//! reporter.start_test("check_error_rate").unwrap();
//! reporter.add_failure("check_error_rate", "error rate above 5%").unwrap();
//! reporter.finish_step().unwrap();
//!
//! let (result, output) = reporter.into_parts();
//! assert!(!result.all_monitors_passed());
//! let text = String::from_utf8(output).unwrap();
//! assert!(text.contains("FAILED"));
//! ```

pub mod report;
pub mod result;
pub mod schema;
pub mod status;
pub mod summary;

// Re-export commonly used types
pub use report::TextReporter;
pub use result::{ItemResult, ResultError, RunResult, Step};
pub use schema::{RunSchema, StepRole};
pub use status::{ItemKind, Status, StatusRegistry};
pub use summary::RunSummary;
