use crate::error::EditResult;
use anyhow::Context;
use indexmap::IndexMap;
use recordfix_model::{ProjectModel, RenameMap};
use recordfix_types::{AffectedUsage, ElementId, ReferenceSite};
use tracing::{debug, warn};

/// Run every pending rename once, in registration order, each with exactly its own reference
/// sites. Returns the number of sites rewritten.
pub fn apply_renames(
    model: &mut dyn ProjectModel,
    renames: &RenameMap,
    usages: &[AffectedUsage],
) -> EditResult<usize> {
    let mut by_element: IndexMap<ElementId, Vec<ReferenceSite>> = IndexMap::new();
    for site in usages.iter().filter_map(AffectedUsage::site) {
        if !renames.contains(site.element) {
            warn!(element = %site.element, ref_id = %site.ref_id, "reference to an element that is not renamed; skipping");
            continue;
        }
        by_element
            .entry(site.element)
            .or_default()
            .push(site.clone());
    }

    let mut rewritten = 0;
    for (element, new_name) in renames.iter() {
        let sites = by_element
            .get(&element)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        model
            .rename_element(element, new_name, sites)
            .with_context(|| format!("rename {element} to {new_name}"))?;
        debug!(%element, new_name, sites = sites.len(), "renamed");
        rewritten += sites.len();
    }
    Ok(rewritten)
}
