//! Embeddable core library for recordfix.
//!
//! Provides a clap-free entry point for converting a class into a record declaration, suitable
//! for linking into an IDE host, a batch refactoring tool or a test harness.
//!
//! # Port traits
//!
//! The semantic model is reached through the traits re-exported from `recordfix-model`
//! ([`ProjectModel`] bundles them). User interaction goes through [`ports::ConfirmPort`];
//! [`adapters`] has fixed-answer implementations for unattended hosts and tests.
//!
//! # Entry points
//!
//! - [`prepare`](pipeline::prepare): collect usages, analyze conflicts, capture preconditions
//! - [`commit`](pipeline::commit): decide, confirm, then rename and rebuild atomically
//! - [`run_conversion`](pipeline::run_conversion): both in one call
//! - [`preview`](pipeline::preview): unified diff of a prepared conversion

pub mod adapters;
pub mod config;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{ConvertError, PreparedConversion, commit, prepare, preview, run_conversion};
pub use settings::ConvertSettings;

// Re-export the types embedders need so they don't depend on the inner crates directly.
pub use recordfix_domain::{ConversionCandidate, ExecutionMode, FieldAccessorBinding};
pub use recordfix_model::{InMemoryProject, ProjectModel};
pub use recordfix_types::report::{ConversionReport, ConversionStatus};
