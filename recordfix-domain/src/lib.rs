//! Domain logic: decide what converting a class to a record affects and whether it is safe.
//!
//! This crate owns *what* changes and why. It never mutates the model; applying renames and
//! rebuilding the declaration is the `recordfix-edit` crate.

mod analyzer;
mod candidate;
mod classifier;
mod collector;

pub use analyzer::{Decision, ExecutionMode, analyze, decide};
pub use candidate::{ConversionCandidate, FieldAccessorBinding};
pub use classifier::{Classification, classify, rename_target};
pub use collector::{CollectedUsages, collect};
