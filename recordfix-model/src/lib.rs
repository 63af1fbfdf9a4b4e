//! Semantic model access for recordfix.
//!
//! The conversion pipeline never touches a syntax tree directly. Every lookup, reference search,
//! rename and declaration swap goes through the port traits below ([`ProjectModel`] bundles them), so
//! hosts can plug in their own indexes. [`InMemoryProject`] is the reference adapter used by tests and previews.

mod memory;
mod ports;
mod renames;

pub use memory::{DeclarationBuilder, InMemoryProject};
pub use ports::{
    AccessibilityAnalyzer, DeclarationStore, ProjectModel, RenameEngine, SemanticModel,
};
pub use renames::RenameMap;
