//! Property-based tests for classification and usage collection.
//!
//! These tests verify that:
//! - Classifying again after the proposed rename yields `RecordStyle`
//! - Usages follow the candidate's field order
//! - Exactly one encapsulation risk is reported per member weaker than the class

use proptest::prelude::*;
use recordfix_domain::{
    Classification, ConversionCandidate, FieldAccessorBinding, classify, collect,
};
use recordfix_model::{InMemoryProject, RenameEngine};
use recordfix_types::syntax::Modifiers;
use recordfix_types::{ElementId, UsageKind, Visibility};

fn arb_visibility() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Private),
        Just(Visibility::Package),
        Just(Visibility::Protected),
        Just(Visibility::Public),
    ]
}

/// Distinct lowercase field names.
fn arb_field_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,6}", 1..6)
        .prop_map(|names| names.into_iter().collect())
}

#[derive(Debug, Clone)]
struct Shape {
    class: Visibility,
    fields: Vec<(String, Visibility, Option<Visibility>)>,
    ctor: Option<Visibility>,
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    (arb_visibility(), arb_field_names(), prop::option::of(arb_visibility()))
        .prop_flat_map(|(class, names, ctor)| {
            let n = names.len();
            (
                Just(class),
                Just(names),
                prop::collection::vec(
                    (arb_visibility(), prop::option::of(arb_visibility())),
                    n,
                ),
                Just(ctor),
            )
        })
        .prop_map(|(class, names, vis, ctor)| Shape {
            class,
            fields: names
                .into_iter()
                .zip(vis)
                .map(|(name, (field, accessor))| (name, field, accessor))
                .collect(),
            ctor,
        })
}

fn getter_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

fn build(shape: &Shape) -> (InMemoryProject, ConversionCandidate) {
    let mut project = InMemoryProject::new();
    let mut b = project.class("src/Shape.java", "Shape");
    b.modifiers(Modifiers::new(shape.class));
    let mut candidate = ConversionCandidate::new(b.id());

    let mut fields = Vec::new();
    for (name, field_vis, accessor_vis) in &shape.fields {
        let field = b.field(Modifiers::new(*field_vis), "int", name);
        fields.push(field);
        let binding = match accessor_vis {
            Some(vis) => {
                let accessor = b
                    .accessor(Modifiers::new(*vis), &getter_name(name), field)
                    .unwrap();
                Some(FieldAccessorBinding::new(accessor, field))
            }
            None => None,
        };
        candidate = candidate.with_field(field, binding);
    }
    if let Some(vis) = shape.ctor {
        let ctor = b
            .canonical_constructor(Modifiers::new(vis), &fields)
            .unwrap();
        candidate = candidate.with_canonical_constructor(ctor);
    }
    b.finish();
    (project, candidate)
}

proptest! {
    #[test]
    fn classification_is_idempotent_after_rename(shape in arb_shape()) {
        let (mut project, candidate) = build(&shape);

        for (&field, binding) in &candidate.field_accessors {
            let first = classify(&project, field, binding.as_ref()).unwrap();
            match (&first, binding) {
                (Classification::NeedsRename { target, new_name }, Some(b)) => {
                    prop_assert_eq!(*target, b.accessor);
                    project.rename_element(*target, new_name, &[]).unwrap();
                    let second = classify(&project, field, binding.as_ref()).unwrap();
                    prop_assert_eq!(second, Classification::RecordStyle);
                }
                (Classification::NoAccessor, None) => {}
                other => prop_assert!(false, "unexpected classification {:?}", other),
            }
        }
    }

    #[test]
    fn encapsulation_risks_match_weaker_members(shape in arb_shape()) {
        let (project, candidate) = build(&shape);

        let expected = shape
            .fields
            .iter()
            .map(|(_, field, accessor)| accessor.unwrap_or(*field))
            .chain(shape.ctor)
            .filter(|vis| vis.is_weaker_than(shape.class))
            .count();

        let with_search = collect(&project, &candidate, true).unwrap();
        let risks = with_search
            .usages
            .iter()
            .filter(|u| u.kind() == UsageKind::EncapsulationRisk)
            .count();
        prop_assert_eq!(risks, expected);

        let without_search = collect(&project, &candidate, false).unwrap();
        prop_assert!(without_search
            .usages
            .iter()
            .all(|u| u.kind() != UsageKind::EncapsulationRisk));
    }

    #[test]
    fn usages_follow_field_order(shape in arb_shape()) {
        let (project, candidate) = build(&shape);
        let collected = collect(&project, &candidate, false).unwrap();

        let field_order: Vec<ElementId> = candidate.field_accessors.keys().copied().collect();
        let accessor_order: Vec<ElementId> = candidate
            .field_accessors
            .values()
            .flatten()
            .map(|b| b.accessor)
            .collect();

        let direct: Vec<ElementId> = collected
            .usages
            .iter()
            .filter(|u| u.kind() == UsageKind::DirectFieldReference)
            .map(|u| u.element())
            .collect();
        let expected_direct: Vec<ElementId> = field_order
            .iter()
            .zip(&shape.fields)
            .filter(|(_, (_, vis, _))| *vis != Visibility::Private)
            .map(|(id, _)| *id)
            .collect();
        prop_assert_eq!(direct, expected_direct);

        let renamed: Vec<ElementId> = collected.renames.elements().collect();
        prop_assert_eq!(renamed, accessor_order);
    }
}
