use crate::candidate::ConversionCandidate;
use recordfix_model::{ProjectModel, RenameMap};
use recordfix_types::{AffectedUsage, ConflictReport, ElementId, Visibility};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether a person is around to confirm a conflicting conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Interactive,
    Unattended,
}

/// What the pipeline does with a conflict report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// Show the report and continue only if the user agrees.
    Confirm,
    /// Abort with the full listing.
    Fail,
}

/// Build the conflict report for collected usages. Read-only.
pub fn analyze(
    model: &dyn ProjectModel,
    candidate: &ConversionCandidate,
    usages: &[AffectedUsage],
    renames: &RenameMap,
) -> ConflictReport {
    let mut conflicts = ConflictReport::new();

    for site in usages.iter().filter_map(AffectedUsage::site) {
        if let Some(message) = &site.collision {
            conflicts.put(site.element, message.clone());
        }
    }

    let mut must_be_private: Vec<ElementId> = Vec::new();
    for usage in usages {
        match usage {
            AffectedUsage::EncapsulationRisk { element, message } => {
                conflicts.put(*element, message.clone());
            }
            AffectedUsage::DirectFieldReference { field } => {
                if !must_be_private.contains(field) {
                    must_be_private.push(*field);
                }
            }
            AffectedUsage::AccessorRenameReference {
                element,
                new_name,
                site: None,
            } => {
                model.find_existing_name_conflicts(*element, new_name, renames, &mut conflicts);
            }
            AffectedUsage::AccessorRenameReference { site: Some(_), .. } => {}
        }
    }

    if !must_be_private.is_empty() {
        model.analyze_accessibility_conflicts(
            &must_be_private,
            candidate.declaration,
            Visibility::Private,
            &mut conflicts,
        );
    }

    debug!(
        declaration = %candidate.declaration,
        elements = conflicts.len(),
        messages = conflicts.message_count(),
        "analyzed conflicts"
    );
    conflicts
}

/// Decide how to continue given a conflict report.
pub fn decide(conflicts: &ConflictReport, mode: ExecutionMode, ignore_conflicts: bool) -> Decision {
    if conflicts.is_empty() {
        return Decision::Proceed;
    }
    match mode {
        ExecutionMode::Unattended if ignore_conflicts => Decision::Proceed,
        ExecutionMode::Unattended => Decision::Fail,
        ExecutionMode::Interactive => Decision::Confirm,
    }
}
