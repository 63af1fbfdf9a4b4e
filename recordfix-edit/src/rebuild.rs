use crate::error::{EditError, EditResult};
use recordfix_domain::ConversionCandidate;
use recordfix_model::SemanticModel;
use recordfix_types::{
    ElementId, Visibility,
    syntax::{Child, Code, Declaration, Fragment, Keyword, Method, Parameter},
};
use tracing::debug;

/// Last significant child seen by the forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Start,
    Identifier,
    Other,
}

/// Build the record declaration that replaces the candidate class.
///
/// One forward pass over the live children: the class keyword becomes `record`, the header is
/// emitted right after the type parameters (or the identifier when there are none), key fields
/// and accessors are dropped together with the whitespace before them, and the canonical
/// constructor is rebuilt. Everything else is copied in place. The record keeps the class id.
pub fn rebuild_record(
    model: &dyn SemanticModel,
    candidate: &ConversionCandidate,
) -> EditResult<Declaration> {
    let class = model.declaration(candidate.declaration).ok_or_else(|| {
        EditError::structural(format!("declaration {} not found", candidate.declaration))
    })?;
    check_members(class, candidate)?;

    let components: Vec<Parameter> = class
        .fields()
        .filter(|f| candidate.is_component(f.id))
        .map(|f| Parameter {
            id: f.id,
            ty: f.ty.clone(),
            name: f.name.clone(),
        })
        .collect();
    let class_visibility = class.visibility();

    let mut out: Vec<Child> = Vec::with_capacity(class.children.len());
    let mut cursor = Cursor::Start;
    let mut identifier_at: Option<usize> = None;
    let mut header_emitted = false;

    for child in &class.children {
        if !header_emitted
            && cursor == Cursor::Identifier
            && child.is_significant()
            && !matches!(child, Child::TypeParameters { .. })
        {
            if let Some(at) = identifier_at {
                out.insert(at + 1, header(&components));
                header_emitted = true;
            }
        }

        match child {
            Child::Keyword {
                keyword: Keyword::Class,
            } => out.push(Child::Keyword {
                keyword: Keyword::Record,
            }),
            Child::Identifier { .. } => {
                out.push(child.clone());
                identifier_at = Some(out.len() - 1);
            }
            Child::TypeParameters { .. } => {
                out.push(child.clone());
                if !header_emitted && cursor == Cursor::Identifier {
                    out.push(header(&components));
                    header_emitted = true;
                }
            }
            Child::Field(f) if candidate.is_key_field(f.id) => drop_preceding_whitespace(&mut out),
            Child::Method(m) if Some(m.id) == candidate.canonical_constructor => {
                out.push(Child::Method(canonical_constructor(
                    m,
                    &components,
                    class_visibility,
                )?));
            }
            Child::Method(m) if candidate.binding_for_accessor(m.id).is_some() => {
                drop_preceding_whitespace(&mut out)
            }
            _ => out.push(child.clone()),
        }

        if child.is_significant() {
            cursor = match child {
                Child::Identifier { .. } => Cursor::Identifier,
                _ => Cursor::Other,
            };
        }
    }

    if identifier_at.is_none() {
        return Err(EditError::structural(format!(
            "declaration {} has no identifier",
            candidate.declaration
        )));
    }
    if !header_emitted {
        return Err(EditError::structural(format!(
            "no place for the record header in {}",
            model.describe(candidate.declaration)
        )));
    }

    debug!(
        declaration = %candidate.declaration,
        components = components.len(),
        children = out.len(),
        "rebuilt record"
    );
    Ok(Declaration {
        id: class.id,
        file: class.file.clone(),
        children: out,
    })
}

fn check_members(class: &Declaration, candidate: &ConversionCandidate) -> EditResult<()> {
    let owner = class.name().unwrap_or("?");
    for (&field, binding) in &candidate.field_accessors {
        if class.field(field).is_none() {
            return Err(EditError::structural(format!(
                "field {field} is not a member of '{owner}'"
            )));
        }
        if let Some(b) = binding {
            if class.method(b.accessor).is_none() {
                return Err(EditError::structural(format!(
                    "accessor {} is not a member of '{owner}'",
                    b.accessor
                )));
            }
            if class.field(b.backing_field).is_none() {
                return Err(EditError::structural(format!(
                    "backing field {} is not a member of '{owner}'",
                    b.backing_field
                )));
            }
        }
    }
    if let Some(ctor) = candidate.canonical_constructor {
        if class.method(ctor).is_none() {
            return Err(EditError::structural(format!(
                "constructor {ctor} is not a member of '{owner}'"
            )));
        }
    }
    Ok(())
}

fn header(components: &[Parameter]) -> Child {
    Child::Header {
        components: components.to_vec(),
    }
}

fn drop_preceding_whitespace(out: &mut Vec<Child>) {
    if out.last().is_some_and(Child::is_whitespace) {
        out.pop();
    }
}

/// Parameters are matched to header components by position; body references to a parameter
/// follow its new name.
///
/// Each parameter must have its component's type, and a `this.<field> = <param>` assignment in
/// the body must not bind it to a different component. Reordering would break callers, so either
/// mismatch is structural.
fn canonical_constructor(
    ctor: &Method,
    components: &[Parameter],
    class_visibility: Visibility,
) -> EditResult<Method> {
    if ctor.parameters.len() != components.len() {
        return Err(EditError::structural(format!(
            "canonical constructor '{}' has {} parameters, record header has {}",
            ctor.signature(),
            ctor.parameters.len(),
            components.len()
        )));
    }

    let assigned = field_assignments(&ctor.body);
    for (param, component) in ctor.parameters.iter().zip(components) {
        if param.ty != component.ty {
            return Err(EditError::structural(format!(
                "parameter '{} {}' of canonical constructor '{}' does not match record component '{} {}'",
                param.ty,
                param.name,
                ctor.signature(),
                component.ty,
                component.name
            )));
        }
        let bound_to = assigned
            .iter()
            .find(|(_, p)| *p == param.id)
            .map(|(field, _)| *field)
            .filter(|field| components.iter().any(|c| c.id == *field));
        if let Some(field) = bound_to.filter(|field| *field != component.id) {
            let other = components
                .iter()
                .find(|c| c.id == field)
                .map_or("?", |c| c.name.as_str());
            return Err(EditError::structural(format!(
                "parameter '{}' of canonical constructor '{}' is assigned to '{}', not to record component '{}'",
                param.name,
                ctor.signature(),
                other,
                component.name
            )));
        }
    }

    let mut rebuilt = ctor.clone();
    rebuilt.modifiers.visibility = ctor.modifiers.visibility.max(class_visibility);
    rebuilt.parameters = ctor
        .parameters
        .iter()
        .zip(components)
        .map(|(param, component)| Parameter {
            id: param.id,
            ty: component.ty.clone(),
            name: component.name.clone(),
        })
        .collect();

    for r in rebuilt.body.references_mut() {
        if let Some(param) = rebuilt.parameters.iter().find(|p| p.id == r.target) {
            r.name = param.name.clone();
        }
    }
    Ok(rebuilt)
}

/// `(field, value)` pairs for every `<field> = <value>;` assignment in `body` whose sides are
/// plain references.
fn field_assignments(body: &Code) -> Vec<(ElementId, ElementId)> {
    body.0
        .windows(4)
        .filter_map(|w| match w {
            [
                Fragment::Ref(lhs),
                Fragment::Text(op),
                Fragment::Ref(rhs),
                Fragment::Text(end),
            ] if op.trim() == "=" && end.trim_start().starts_with(';') => {
                Some((lhs.target, rhs.target))
            }
            _ => None,
        })
        .collect()
}
