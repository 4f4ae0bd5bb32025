//! The result data model: items, steps, and the run state machine.
//!
//! This module is the single source of truth for recorded outcomes:
//! - [`ItemResult`]: one monitor's or action's recorded outcome
//! - [`Step`]: an ordered phase of the run grouping items of one kind
//! - [`RunResult`]: the ordered sequence of steps plus the lifecycle
//!   protocol routing notifications to the current step
//!
//! All mutation is synchronous and local; rendering lives in
//! [`crate::report`].

pub mod error;
mod item;
mod run;
mod step;

pub use error::ResultError;
pub use item::ItemResult;
pub use run::RunResult;
pub use step::Step;
