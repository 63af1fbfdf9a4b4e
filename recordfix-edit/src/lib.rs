//! Edit engine for recordfix conversions.
//!
//! Responsibilities:
//! - Apply the pending renames with exactly their own reference sites.
//! - Rebuild the candidate class as a record declaration.
//! - Capture and verify declaration digests (sha256) between prepare and commit.
//! - Stage the whole edit on a clone of the model, swapping it in only on success.
//! - Generate a unified diff preview.

mod digest;
mod error;
mod rebuild;
mod rename;

pub use digest::{DeclarationDigest, Preconditions};
pub use error::{EditError, EditResult};
pub use rebuild::rebuild_record;
pub use rename::apply_renames;

use anyhow::Context;
use diffy::PatchFormatter;
use recordfix_domain::ConversionCandidate;
use recordfix_model::{ProjectModel, RenameMap, SemanticModel};
use recordfix_types::AffectedUsage;
use tracing::info;

/// What a successful edit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub renamed_elements: usize,
    pub rewritten_sites: usize,
    pub components: usize,
}

/// Rename, rebuild and swap in the record.
///
/// When `preconditions` is given it is verified first. All changes are staged on a clone; `model`
/// is only replaced once every step succeeded, so any error leaves it untouched.
pub fn apply_conversion<P>(
    model: &mut P,
    candidate: &ConversionCandidate,
    renames: &RenameMap,
    usages: &[AffectedUsage],
    preconditions: Option<&Preconditions>,
) -> EditResult<EditSummary>
where
    P: ProjectModel + Clone,
{
    if let Some(pre) = preconditions {
        pre.verify(&*model)?;
    }

    let (staged, summary) = stage(&*model, candidate, renames, usages)?;
    *model = staged;

    info!(
        declaration = %candidate.declaration,
        renamed = summary.renamed_elements,
        sites = summary.rewritten_sites,
        components = summary.components,
        "converted to record"
    );
    Ok(summary)
}

/// Unified diff of every declaration the conversion would change, in project order. The model is
/// not modified.
pub fn preview_conversion<P>(
    model: &P,
    candidate: &ConversionCandidate,
    renames: &RenameMap,
    usages: &[AffectedUsage],
) -> EditResult<String>
where
    P: ProjectModel + Clone,
{
    let (staged, _) = stage(model, candidate, renames, usages)?;
    Ok(render_patch(model, &staged))
}

fn stage<P>(
    model: &P,
    candidate: &ConversionCandidate,
    renames: &RenameMap,
    usages: &[AffectedUsage],
) -> EditResult<(P, EditSummary)>
where
    P: ProjectModel + Clone,
{
    let mut staged = model.clone();
    let rewritten_sites = apply_renames(&mut staged, renames, usages)?;

    let record = rebuild_record(&staged, candidate)?;
    let components = record.components().len();
    staged
        .replace_declaration(candidate.declaration, record)
        .with_context(|| format!("replace declaration {}", candidate.declaration))?;

    Ok((
        staged,
        EditSummary {
            renamed_elements: renames.len(),
            rewritten_sites,
            components,
        },
    ))
}

fn render_patch(before: &dyn SemanticModel, after: &dyn SemanticModel) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for id in before.declaration_ids() {
        let (Some(old_decl), Some(new_decl)) = (before.declaration(id), after.declaration(id))
        else {
            continue;
        };
        let old = old_decl.render();
        let new = new_decl.render();
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", old_decl.file));
        let patch = diffy::create_patch(&old, &new);
        out.push_str(&formatter.fmt_patch(&patch).to_string());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
