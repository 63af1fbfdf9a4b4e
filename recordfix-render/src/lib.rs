//! Rendering helpers (markdown) for human-readable conversion artifacts.

use recordfix_model::{RenameMap, SemanticModel};
use recordfix_types::report::{ConversionReport, ConversionStatus};
use recordfix_types::{AffectedUsage, ConflictReport, UsageKind};

/// Title shown above the processed elements.
pub const USAGE_VIEW_HEADER: &str = "Convert to record";

pub fn render_conflicts_md(model: &dyn SemanticModel, conflicts: &ConflictReport) -> String {
    let mut out = String::new();
    out.push_str("# Conflicts\n\n");
    if conflicts.is_empty() {
        out.push_str("_No conflicts._\n");
        return out;
    }

    for conflict in conflicts.iter() {
        out.push_str(&format!("### {}\n\n", model.describe(conflict.element)));
        for message in &conflict.messages {
            out.push_str(&format!("- {}\n", message));
        }
        out.push('\n');
    }

    out
}

/// What the conversion is about to do: the elements being renamed, then every usage by kind.
pub fn render_usage_view_md(
    model: &dyn SemanticModel,
    renames: &RenameMap,
    usages: &[AffectedUsage],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", USAGE_VIEW_HEADER));

    out.push_str("## Elements\n\n");
    if renames.is_empty() {
        out.push_str("_Nothing to rename._\n");
    }
    for (element, new_name) in renames.iter() {
        out.push_str(&format!("- {} → `{}`\n", model.describe(element), new_name));
    }
    out.push('\n');

    for kind in [
        UsageKind::DirectFieldReference,
        UsageKind::AccessorRenameReference,
        UsageKind::EncapsulationRisk,
    ] {
        let group: Vec<&AffectedUsage> = usages.iter().filter(|u| u.kind() == kind).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("## {} ({})\n\n", kind_label(kind), group.len()));
        for usage in group {
            out.push_str(&usage_line(model, usage));
        }
        out.push('\n');
    }

    out
}

pub fn render_report_md(report: &ConversionReport) -> String {
    let mut out = String::new();
    out.push_str("# recordfix conversion\n\n");
    out.push_str(&format!("- Declaration: `{}`\n", report.declaration));
    out.push_str(&format!("- Status: `{}`\n", status_label(report.status)));
    let counts = &report.usage_counts;
    out.push_str(&format!(
        "- Usages: {} direct field references, {} accessor renames, {} reference sites, {} encapsulation risks\n",
        counts.direct_field_references,
        counts.accessor_renames,
        counts.reference_sites,
        counts.encapsulation_risks
    ));
    if let Some(ended) = report.run.ended_at {
        let millis = (ended - report.run.started_at).num_milliseconds();
        out.push_str(&format!("- Duration: {} ms\n", millis));
    }
    out.push('\n');

    out.push_str("## Renames\n\n");
    if report.renames.is_empty() {
        out.push_str("_No renames._\n");
    }
    for r in &report.renames {
        out.push_str(&format!(
            "- `{}` `{}` → `{}`\n",
            r.element, r.old_name, r.new_name
        ));
    }

    if !report.conflicts.is_empty() {
        out.push_str("\n## Conflicts\n\n");
        for conflict in report.conflicts.iter() {
            for message in &conflict.messages {
                out.push_str(&format!("- `{}` {}\n", conflict.element, message));
            }
        }
    }

    out
}

fn usage_line(model: &dyn SemanticModel, usage: &AffectedUsage) -> String {
    match usage {
        AffectedUsage::DirectFieldReference { field } => {
            format!("- {}\n", model.describe(*field))
        }
        AffectedUsage::AccessorRenameReference {
            element,
            new_name,
            site: None,
        } => format!("- rename {} to `{}`\n", model.describe(*element), new_name),
        AffectedUsage::AccessorRenameReference {
            site: Some(site), ..
        } => {
            let mut line = format!(
                "  - `{}` in {} ({})\n",
                site.file,
                model.describe(site.declaration),
                site.ref_id
            );
            if let Some(collision) = &site.collision {
                line.push_str(&format!("    - conflict: {}\n", collision));
            }
            line
        }
        AffectedUsage::EncapsulationRisk { message, .. } => format!("- {}\n", message),
    }
}

fn kind_label(kind: UsageKind) -> &'static str {
    match kind {
        UsageKind::DirectFieldReference => "Direct field references",
        UsageKind::AccessorRenameReference => "Accessor renames",
        UsageKind::EncapsulationRisk => "Encapsulation risks",
    }
}

fn status_label(s: ConversionStatus) -> &'static str {
    match s {
        ConversionStatus::Pending => "pending",
        ConversionStatus::Applied => "applied",
        ConversionStatus::Aborted => "aborted",
        ConversionStatus::Cancelled => "cancelled",
    }
}
