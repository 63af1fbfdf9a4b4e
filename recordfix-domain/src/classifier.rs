use crate::candidate::FieldAccessorBinding;
use anyhow::Context;
use recordfix_model::SemanticModel;
use recordfix_types::ElementId;

/// How a key field's accessor has to be treated by the conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No accessor; the record synthesizes one.
    NoAccessor,

    /// The accessor already has the record accessor's name. It is still elided by the rebuild.
    RecordStyle,

    /// `target` must be renamed to `new_name`, the backing field's name.
    NeedsRename { target: ElementId, new_name: String },
}

/// Classify one entry of the candidate's field map.
pub fn classify(
    model: &dyn SemanticModel,
    field: ElementId,
    binding: Option<&FieldAccessorBinding>,
) -> anyhow::Result<Classification> {
    let Some(binding) = binding else {
        return Ok(Classification::NoAccessor);
    };
    if binding.record_style_naming {
        return Ok(Classification::RecordStyle);
    }

    let accessor = model
        .method(binding.accessor)
        .with_context(|| format!("accessor {} of field {} not found", binding.accessor, field))?;
    let backing = model
        .field(binding.backing_field)
        .with_context(|| format!("backing field {} not found", binding.backing_field))?;

    if accessor.name == backing.name {
        return Ok(Classification::RecordStyle);
    }

    Ok(Classification::NeedsRename {
        target: rename_target(model, binding.accessor),
        new_name: backing.name.clone(),
    })
}

/// The method a rename of `accessor` has to start from: its topmost ancestor.
///
/// Follows the first direct super method at every step. Cycles stop the walk at the last method
/// not yet visited.
pub fn rename_target(model: &dyn SemanticModel, accessor: ElementId) -> ElementId {
    let mut visited = vec![accessor];
    let mut current = accessor;
    while let Some(&next) = model.super_methods(current).first() {
        if visited.contains(&next) {
            break;
        }
        visited.push(next);
        current = next;
    }
    current
}
