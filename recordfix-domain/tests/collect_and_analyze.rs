//! Usage discovery and conflict analysis against small in-memory projects.

use pretty_assertions::assert_eq;
use recordfix_domain::{
    ConversionCandidate, Decision, ExecutionMode, FieldAccessorBinding, analyze, collect, decide,
};
use recordfix_model::{InMemoryProject, SemanticModel};
use recordfix_types::syntax::{Code, Modifiers};
use recordfix_types::{AffectedUsage, ElementId, UsageKind, Visibility};

fn private_final() -> Modifiers {
    Modifiers::new(Visibility::Private).with_keyword("final")
}

fn public() -> Modifiers {
    Modifiers::new(Visibility::Public)
}

struct Point {
    project: InMemoryProject,
    point: ElementId,
    x: ElementId,
    y: ElementId,
    get_x: ElementId,
    get_y: ElementId,
    ctor: ElementId,
    canvas: ElementId,
}

impl Point {
    fn candidate(&self) -> ConversionCandidate {
        ConversionCandidate::new(self.point)
            .with_field(self.x, Some(FieldAccessorBinding::new(self.get_x, self.x)))
            .with_field(self.y, Some(FieldAccessorBinding::new(self.get_y, self.y)))
            .with_canonical_constructor(self.ctor)
    }
}

/// `public class Point` with a package-private canonical constructor and `getX`/`getY`, used
/// from `Canvas` in another package.
fn point() -> Point {
    let mut project = InMemoryProject::new();

    let mut b = project.class("src/geo/Point.java", "Point");
    b.modifiers(public());
    let point = b.id();
    let x = b.field(private_final(), "int", "x");
    let y = b.field(private_final(), "int", "y");
    let ctor = b
        .canonical_constructor(Modifiers::new(Visibility::Package), &[x, y])
        .unwrap();
    let get_x = b.accessor(public(), "getX", x).unwrap();
    let get_y = b.accessor(public(), "getY", y).unwrap();
    b.finish();

    let mut b = project.class("src/app/Canvas.java", "Canvas");
    let canvas = b.id();
    let p = b.parameter("Point", "p");
    b.method(
        Modifiers::new(Visibility::Package),
        "int",
        "area",
        vec![p.clone()],
        Code::new()
            .text(" {\n        return ")
            .reference(p.id, "p")
            .text(".")
            .reference(get_x, "getX")
            .text("() * ")
            .reference(p.id, "p")
            .text(".")
            .reference(get_y, "getY")
            .text("();\n    }"),
    );
    b.finish();

    Point {
        project,
        point,
        x,
        y,
        get_x,
        get_y,
        ctor,
        canvas,
    }
}

#[test]
fn point_usages_in_field_order_then_risks() {
    let f = point();
    let collected = collect(&f.project, &f.candidate(), true).unwrap();

    let shape: Vec<(UsageKind, ElementId, bool)> = collected
        .usages
        .iter()
        .map(|u| (u.kind(), u.element(), u.site().is_some()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (UsageKind::AccessorRenameReference, f.get_x, false),
            (UsageKind::AccessorRenameReference, f.get_x, true),
            (UsageKind::AccessorRenameReference, f.get_y, false),
            (UsageKind::AccessorRenameReference, f.get_y, true),
            (UsageKind::EncapsulationRisk, f.ctor, false),
        ]
    );
    assert_eq!(collected.site_count(), 2);
    assert_eq!(
        collected.renames.iter().collect::<Vec<_>>(),
        vec![(f.get_x, "x"), (f.get_y, "y")]
    );
    assert!(
        collected
            .usages
            .iter()
            .filter_map(AffectedUsage::site)
            .all(|s| s.declaration == f.canvas)
    );
}

#[test]
fn point_has_exactly_one_constructor_conflict() {
    let f = point();
    let candidate = f.candidate();
    let collected = collect(&f.project, &candidate, true).unwrap();
    let conflicts = analyze(&f.project, &candidate, &collected.usages, &collected.renames);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(
        conflicts.get(f.ctor).unwrap(),
        &["constructor 'Point(int, int)' has package-private visibility but will be raised to public"
            .to_string()]
    );
    assert_eq!(
        decide(&conflicts, ExecutionMode::Unattended, false),
        Decision::Fail
    );
}

#[test]
fn without_visibility_search_there_is_nothing_to_report() {
    let f = point();
    let candidate = f.candidate();
    let collected = collect(&f.project, &candidate, false).unwrap();
    assert!(
        collected
            .usages
            .iter()
            .all(|u| u.kind() != UsageKind::EncapsulationRisk)
    );

    let conflicts = analyze(&f.project, &candidate, &collected.usages, &collected.renames);
    assert!(conflicts.is_empty());
    assert_eq!(
        decide(&conflicts, ExecutionMode::Unattended, false),
        Decision::Proceed
    );
}

#[test]
fn collecting_does_not_touch_the_model() {
    let f = point();
    let before: Vec<_> = f
        .project
        .declaration_ids()
        .into_iter()
        .map(|id| f.project.render(id).unwrap())
        .collect();

    let collected = collect(&f.project, &f.candidate(), true).unwrap();
    analyze(&f.project, &f.candidate(), &collected.usages, &collected.renames);

    let after: Vec<_> = f
        .project
        .declaration_ids()
        .into_iter()
        .map(|id| f.project.render(id).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn override_chain_renames_topmost_method_and_its_overriders() {
    let mut project = InMemoryProject::new();

    let mut b = project.interface("src/geo/HasX.java", "HasX");
    b.modifiers(public());
    let base = b.abstract_method(public(), "int", "getX");
    b.finish();

    let mut b = project.class("src/geo/Point.java", "Point");
    b.modifiers(public()).implements("HasX");
    let point = b.id();
    let x = b.field(private_final(), "int", "x");
    let get_x = b.accessor(public(), "getX", x).unwrap();
    b.overrides(get_x, base);
    b.finish();

    let mut b = project.class("src/app/Ruler.java", "Ruler");
    let h = b.parameter("HasX", "h");
    b.method(
        Modifiers::new(Visibility::Package),
        "int",
        "measure",
        vec![h.clone()],
        Code::new()
            .text(" { return ")
            .reference(h.id, "h")
            .text(".")
            .reference(base, "getX")
            .text("(); }"),
    );
    b.finish();

    let candidate = ConversionCandidate::new(point)
        .with_field(x, Some(FieldAccessorBinding::new(get_x, x)));
    let collected = collect(&project, &candidate, false).unwrap();

    assert_eq!(
        collected.renames.iter().collect::<Vec<_>>(),
        vec![(base, "x"), (get_x, "x")]
    );
    let marker = &collected.usages[0];
    assert_eq!(
        marker,
        &AffectedUsage::AccessorRenameReference {
            element: base,
            new_name: "x".to_string(),
            site: None,
        }
    );
    let sites: Vec<ElementId> = collected
        .usages
        .iter()
        .filter_map(AffectedUsage::site)
        .map(|s| s.element)
        .collect();
    assert_eq!(sites, vec![base]);
}

#[test]
fn record_style_accessors_need_no_rename() {
    let mut project = InMemoryProject::new();
    let mut b = project.class("src/Pair.java", "Pair");
    b.modifiers(public());
    let pair = b.id();
    let left = b.field(private_final(), "String", "left");
    let left_accessor = b.accessor(public(), "left", left).unwrap();
    let right = b.field(private_final(), "String", "right");
    let right_accessor = b.accessor(public(), "right", right).unwrap();
    b.finish();

    let candidate = ConversionCandidate::new(pair)
        .with_field(
            left,
            Some(FieldAccessorBinding::new(left_accessor, left).record_style()),
        )
        .with_field(right, Some(FieldAccessorBinding::new(right_accessor, right)));
    let collected = collect(&project, &candidate, true).unwrap();

    assert!(collected.usages.is_empty());
    assert!(collected.renames.is_empty());
}

#[test]
fn exposed_field_must_stay_reachable_once_private() {
    let mut project = InMemoryProject::new();
    let mut b = project.class("src/geo/Size.java", "Size");
    b.modifiers(public());
    let size = b.id();
    let width = b.field(Modifiers::new(Visibility::Package), "int", "width");
    b.finish();

    let mut b = project.class("src/app/Layout.java", "Layout");
    let s = b.parameter("Size", "s");
    b.method(
        Modifiers::new(Visibility::Package),
        "int",
        "span",
        vec![s.clone()],
        Code::new()
            .text(" { return ")
            .reference(s.id, "s")
            .text(".")
            .reference(width, "width")
            .text("; }"),
    );
    b.finish();

    let candidate = ConversionCandidate::new(size).with_field(width, None);
    let collected = collect(&project, &candidate, true).unwrap();
    assert_eq!(
        collected.usages,
        vec![
            AffectedUsage::DirectFieldReference { field: width },
            AffectedUsage::EncapsulationRisk {
                element: width,
                message: "field 'Size.width' has package-private visibility but its record \
                          component accessor will be public"
                    .to_string(),
            },
        ]
    );

    let conflicts = analyze(&project, &candidate, &collected.usages, &collected.renames);
    assert_eq!(
        conflicts.get(width).unwrap(),
        &[
            "field 'Size.width' has package-private visibility but its record component accessor \
             will be public"
                .to_string(),
            "field 'Size.width' with private visibility won't be accessible from class 'Layout'"
                .to_string(),
        ]
    );
}

/// `Point` with `getX`, and a `Cursor` class that declares its own `int x()` and calls `getX`
/// through `body`.
fn cursor_project(
    body: impl FnOnce(ElementId, ElementId) -> Code,
) -> (InMemoryProject, ConversionCandidate) {
    let mut project = InMemoryProject::new();
    let mut b = project.class("src/geo/Point.java", "Point");
    b.modifiers(public());
    let point = b.id();
    let x = b.field(private_final(), "int", "x");
    let get_x = b.accessor(public(), "getX", x).unwrap();
    b.finish();

    let mut b = project.class("src/app/Cursor.java", "Cursor");
    let p = b.parameter("Point", "p");
    b.method(
        Modifiers::new(Visibility::Package),
        "int",
        "x",
        vec![],
        Code::new().text(" { return 0; }"),
    );
    b.method(
        Modifiers::new(Visibility::Package),
        "int",
        "offset",
        vec![p.clone()],
        body(p.id, get_x),
    );
    b.finish();

    let candidate = ConversionCandidate::new(point)
        .with_field(x, Some(FieldAccessorBinding::new(get_x, x)));
    (project, candidate)
}

#[test]
fn qualified_call_is_not_captured_by_a_local_method() {
    let (project, candidate) = cursor_project(|p, get_x| {
        Code::new()
            .text(" { return ")
            .reference(p, "p")
            .text(".")
            .reference(get_x, "getX")
            .text("(); }")
    });
    let collected = collect(&project, &candidate, true).unwrap();
    let conflicts = analyze(&project, &candidate, &collected.usages, &collected.renames);

    assert!(
        collected
            .usages
            .iter()
            .filter_map(AffectedUsage::site)
            .all(|site| site.collision.is_none())
    );
    assert!(conflicts.is_empty());
    assert_eq!(
        decide(&conflicts, ExecutionMode::Unattended, false),
        Decision::Proceed
    );
}

#[test]
fn unqualified_call_captured_by_a_local_method_is_a_conflict() {
    let (project, candidate) = cursor_project(|_, get_x| {
        Code::new()
            .text(" { return ")
            .reference(get_x, "getX")
            .text("(); }")
    });
    let collected = collect(&project, &candidate, true).unwrap();
    let conflicts = analyze(&project, &candidate, &collected.usages, &collected.renames);

    assert_eq!(
        conflicts.messages().collect::<Vec<_>>(),
        vec![
            "reference in class 'Cursor' would resolve to method 'Cursor.x()' after renaming \
             method 'Point.getX()'"
        ]
    );
    assert_eq!(
        decide(&conflicts, ExecutionMode::Interactive, false),
        Decision::Confirm
    );
}

#[test]
fn existing_member_with_new_name_is_reported_on_the_target() {
    let mut project = InMemoryProject::new();
    let mut b = project.class("src/geo/Point.java", "Point");
    b.modifiers(public());
    let point = b.id();
    let x = b.field(private_final(), "int", "x");
    let get_x = b.accessor(public(), "getX", x).unwrap();
    b.method(public(), "int", "x", vec![], Code::new().text(" { return 1; }"));
    b.finish();

    let candidate = ConversionCandidate::new(point)
        .with_field(x, Some(FieldAccessorBinding::new(get_x, x)));
    let collected = collect(&project, &candidate, false).unwrap();
    let conflicts = analyze(&project, &candidate, &collected.usages, &collected.renames);

    assert_eq!(
        conflicts.get(get_x).unwrap(),
        &["method 'Point.x()' is already defined in class 'Point'".to_string()]
    );
}
