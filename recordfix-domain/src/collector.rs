use crate::candidate::ConversionCandidate;
use crate::classifier::{Classification, classify};
use anyhow::Context;
use recordfix_model::{ProjectModel, RenameMap};
use recordfix_types::{AffectedUsage, ElementId, Visibility};
use tracing::debug;

/// Output of [`collect`]: every affected usage plus the renames they imply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedUsages {
    pub usages: Vec<AffectedUsage>,
    pub renames: RenameMap,
}

impl CollectedUsages {
    /// Reference sites the rename engine will rewrite.
    pub fn site_count(&self) -> usize {
        self.usages.iter().filter(|u| u.site().is_some()).count()
    }
}

/// Discover everything converting `candidate` affects. Read-only.
///
/// Usages come out per field in map order (direct field reference, then the rename marker and its
/// sites), followed by encapsulation risks when `search_weakened_visibility` is set.
pub fn collect(
    model: &dyn ProjectModel,
    candidate: &ConversionCandidate,
    search_weakened_visibility: bool,
) -> anyhow::Result<CollectedUsages> {
    let mut out = CollectedUsages::default();

    for (&field, binding) in &candidate.field_accessors {
        if visibility_of(model, field)? != Visibility::Private {
            out.usages.push(AffectedUsage::DirectFieldReference { field });
        }

        if let Classification::NeedsRename { target, new_name } =
            classify(model, field, binding.as_ref())?
        {
            out.renames.insert(target, new_name.as_str());
            model
                .prepare_renaming(target, &new_name, &mut out.renames)
                .with_context(|| format!("prepare rename of {target} to {new_name}"))?;
            let sites = model
                .find_usages(target, &new_name, &out.renames)
                .with_context(|| format!("find usages of {target}"))?;
            debug!(%field, %target, %new_name, sites = sites.len(), "accessor rename");

            out.usages.push(AffectedUsage::AccessorRenameReference {
                element: target,
                new_name: new_name.clone(),
                site: None,
            });
            out.usages.extend(sites.into_iter().map(|site| {
                AffectedUsage::AccessorRenameReference {
                    element: site.element,
                    new_name: new_name.clone(),
                    site: Some(site),
                }
            }));
        }
    }

    if search_weakened_visibility {
        out.usages.extend(encapsulation_risks(model, candidate)?);
    }

    debug!(
        declaration = %candidate.declaration,
        usages = out.usages.len(),
        renames = out.renames.len(),
        "collected usages"
    );
    Ok(out)
}

fn encapsulation_risks(
    model: &dyn ProjectModel,
    candidate: &ConversionCandidate,
) -> anyhow::Result<Vec<AffectedUsage>> {
    let class_visibility = model
        .visibility(candidate.declaration)
        .with_context(|| format!("declaration {} not found", candidate.declaration))?;

    let mut risks = Vec::new();
    for (&field, binding) in &candidate.field_accessors {
        let (member, subject) = match binding {
            None => (field, "component accessor"),
            Some(b) => (b.accessor, "accessor"),
        };
        let visibility = visibility_of(model, member)?;
        if visibility.is_weaker_than(class_visibility) {
            risks.push(AffectedUsage::EncapsulationRisk {
                element: member,
                message: format!(
                    "{} has {} visibility but its record {} will be {}",
                    model.describe(member),
                    visibility,
                    subject,
                    Visibility::Public
                ),
            });
        }
    }

    if let Some(ctor) = candidate.canonical_constructor {
        let visibility = visibility_of(model, ctor)?;
        if visibility.is_weaker_than(class_visibility) {
            risks.push(AffectedUsage::EncapsulationRisk {
                element: ctor,
                message: format!(
                    "{} has {} visibility but will be raised to {}",
                    model.describe(ctor),
                    visibility,
                    class_visibility
                ),
            });
        }
    }
    Ok(risks)
}

fn visibility_of(model: &dyn ProjectModel, element: ElementId) -> anyhow::Result<Visibility> {
    model
        .visibility(element)
        .with_context(|| format!("element {element} not found"))
}
