//! Shared DTOs for the recordfix workspace.
//!
//! # Design constraints
//! - Element identities are stable across renames and rebuilds; never key anything by name.
//! - Report types are serialized for hosts. Prefer adding optional fields over changing semantics.

pub mod conflict;
pub mod ids;
pub mod report;
pub mod syntax;
pub mod usage;
pub mod visibility;

pub use conflict::{Conflict, ConflictReport};
pub use ids::{ElementId, RefId};
pub use usage::{AffectedUsage, ReferenceSite, UsageKind};
pub use visibility::Visibility;

/// Schema identifiers.
pub mod schema {
    pub const RECORDFIX_REPORT_V1: &str = "recordfix.report.v1";
}
