use crate::ports::ConfirmPort;
use crate::settings::ConvertSettings;
use anyhow::Context;
use chrono::Utc;
use recordfix_domain::{ConversionCandidate, Decision, analyze, collect, decide};
use recordfix_edit::{EditError, Preconditions, apply_conversion, preview_conversion};
use recordfix_model::{ProjectModel, RenameMap, SemanticModel};
use recordfix_render::{render_conflicts_md, render_usage_view_md};
use recordfix_types::report::{ConversionReport, ConversionStatus, RenameRecord, UsageCounts};
use recordfix_types::{AffectedUsage, ConflictReport, ElementId};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("conversion aborted, {} conflict(s): {}", .0.message_count(), join_messages(.0))]
    ConflictsDetected(ConflictReport),

    #[error("conversion cancelled")]
    Cancelled,

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ConvertError {
    /// True when the run stopped on purpose and the model was left untouched.
    pub fn is_abort(&self) -> bool {
        match self {
            ConvertError::ConflictsDetected(_) | ConvertError::Cancelled => true,
            ConvertError::Edit(e) => e.is_abort(),
            ConvertError::Internal(_) => false,
        }
    }

    /// Status to record for a run that ended with this error.
    pub fn status(&self) -> ConversionStatus {
        match self {
            ConvertError::Cancelled => ConversionStatus::Cancelled,
            _ => ConversionStatus::Aborted,
        }
    }
}

fn join_messages(conflicts: &ConflictReport) -> String {
    conflicts.messages().collect::<Vec<_>>().join("; ")
}

/// Result of the read-only phases, ready to be confirmed and committed.
#[derive(Debug, Clone)]
pub struct PreparedConversion {
    pub candidate: ConversionCandidate,
    pub usages: Vec<AffectedUsage>,
    pub renames: RenameMap,
    pub conflicts: ConflictReport,
    pub preconditions: Preconditions,
    pub report: ConversionReport,
}

impl PreparedConversion {
    pub fn usage_view_md(&self, model: &dyn SemanticModel) -> String {
        render_usage_view_md(model, &self.renames, &self.usages)
    }

    pub fn conflicts_md(&self, model: &dyn SemanticModel) -> String {
        render_conflicts_md(model, &self.conflicts)
    }

    /// The run report closed with `status`.
    pub fn report_with(&self, status: ConversionStatus) -> ConversionReport {
        let mut report = self.report.clone();
        report.status = status;
        report.run.ended_at = Some(Utc::now());
        report
    }
}

/// Collect usages and analyze conflicts. Never mutates the model.
pub fn prepare(
    model: &dyn ProjectModel,
    candidate: &ConversionCandidate,
    settings: &ConvertSettings,
) -> Result<PreparedConversion, ConvertError> {
    let mut report = ConversionReport::new(candidate.declaration, Utc::now());

    let collected = collect(model, candidate, settings.search_weakened_visibility)
        .with_context(|| format!("collect usages of {}", model.describe(candidate.declaration)))?;
    let conflicts = analyze(model, candidate, &collected.usages, &collected.renames);

    let touched = std::iter::once(candidate.declaration).chain(
        collected
            .usages
            .iter()
            .filter_map(AffectedUsage::site)
            .map(|site| site.declaration),
    );
    let preconditions = Preconditions::capture(model, touched)?;

    report.usage_counts = UsageCounts::from_usages(&collected.usages);
    report.renames = collected
        .renames
        .iter()
        .map(|(element, new_name)| RenameRecord {
            element,
            old_name: current_name(model, element),
            new_name: new_name.to_string(),
        })
        .collect();
    report.conflicts = conflicts.clone();

    info!(
        declaration = %candidate.declaration,
        usages = collected.usages.len(),
        renames = collected.renames.len(),
        conflicts = conflicts.len(),
        preconditions = preconditions.len(),
        "prepared conversion"
    );

    Ok(PreparedConversion {
        candidate: candidate.clone(),
        usages: collected.usages,
        renames: collected.renames,
        conflicts,
        preconditions,
        report,
    })
}

fn current_name(model: &dyn SemanticModel, element: ElementId) -> String {
    if let Some(method) = model.method(element) {
        return method.name.clone();
    }
    model
        .field(element)
        .map(|f| f.name.clone())
        .unwrap_or_default()
}

/// Decide on the conflicts, confirm if needed, then rename and rebuild in one step.
///
/// Any error leaves `model` exactly as it was.
pub fn commit<P>(
    model: &mut P,
    prepared: &PreparedConversion,
    settings: &ConvertSettings,
    confirm: &dyn ConfirmPort,
) -> Result<ConversionReport, ConvertError>
where
    P: ProjectModel + Clone,
{
    let decision = decide(&prepared.conflicts, settings.mode, settings.ignore_conflicts);
    debug!(?decision, conflicts = prepared.conflicts.len(), "conflict decision");

    match decision {
        Decision::Proceed => {}
        Decision::Fail => {
            return Err(ConvertError::ConflictsDetected(prepared.conflicts.clone()));
        }
        Decision::Confirm => {
            let rendered = prepared.conflicts_md(&*model);
            if !confirm.confirm_conflicts(&prepared.conflicts, &rendered)? {
                info!(declaration = %prepared.candidate.declaration, "conversion cancelled");
                return Err(ConvertError::Cancelled);
            }
        }
    }

    let preconditions = settings
        .check_preconditions
        .then_some(&prepared.preconditions);
    apply_conversion(
        model,
        &prepared.candidate,
        &prepared.renames,
        &prepared.usages,
        preconditions,
    )?;

    Ok(prepared.report_with(ConversionStatus::Applied))
}

/// [`prepare`] then [`commit`].
pub fn run_conversion<P>(
    model: &mut P,
    candidate: &ConversionCandidate,
    settings: &ConvertSettings,
    confirm: &dyn ConfirmPort,
) -> Result<ConversionReport, ConvertError>
where
    P: ProjectModel + Clone,
{
    let prepared = prepare(&*model, candidate, settings)?;
    commit(model, &prepared, settings, confirm)
}

/// Unified diff of what committing `prepared` would change. The model is not modified.
pub fn preview<P>(model: &P, prepared: &PreparedConversion) -> Result<String, ConvertError>
where
    P: ProjectModel + Clone,
{
    let patch = preview_conversion(
        model,
        &prepared.candidate,
        &prepared.renames,
        &prepared.usages,
    )?;
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(messages: &[&str]) -> ConflictReport {
        let mut conflicts = ConflictReport::new();
        for (i, m) in messages.iter().enumerate() {
            conflicts.put(ElementId(i as u32 + 1), *m);
        }
        conflicts
    }

    #[test]
    fn conflicts_error_lists_every_message() {
        let err = ConvertError::ConflictsDetected(report(&["first", "second"]));
        assert_eq!(
            err.to_string(),
            "conversion aborted, 2 conflict(s): first; second"
        );
    }

    #[test]
    fn abort_classification() {
        assert!(ConvertError::Cancelled.is_abort());
        assert!(ConvertError::ConflictsDetected(report(&["x"])).is_abort());
        assert!(
            ConvertError::Edit(EditError::PreconditionMismatch {
                message: "stale".into()
            })
            .is_abort()
        );
        assert!(!ConvertError::Internal(anyhow::anyhow!("index gone")).is_abort());
        assert!(!ConvertError::Edit(EditError::Runtime(anyhow::anyhow!("io"))).is_abort());
    }

    #[test]
    fn status_for_errors() {
        assert_eq!(ConvertError::Cancelled.status(), ConversionStatus::Cancelled);
        assert_eq!(
            ConvertError::ConflictsDetected(report(&["x"])).status(),
            ConversionStatus::Aborted
        );
    }
}
