use crate::renames::RenameMap;
use recordfix_types::syntax::{Declaration, Field, Method};
use recordfix_types::{ConflictReport, ElementId, ReferenceSite, Visibility};

/// Read-only lookups over declarations and members.
pub trait SemanticModel {
    fn declaration(&self, id: ElementId) -> Option<&Declaration>;

    /// All declarations, in project order.
    fn declaration_ids(&self) -> Vec<ElementId>;

    /// The declaration that is, or directly contains, `id`.
    fn containing_declaration(&self, id: ElementId) -> Option<ElementId>;

    /// Methods that directly override `method`, in project order.
    fn overriding_methods(&self, method: ElementId) -> Vec<ElementId>;

    fn field(&self, id: ElementId) -> Option<&Field> {
        self.declaration(self.containing_declaration(id)?)?
            .field(id)
    }

    fn method(&self, id: ElementId) -> Option<&Method> {
        self.declaration(self.containing_declaration(id)?)?
            .method(id)
    }

    fn visibility(&self, id: ElementId) -> Option<Visibility> {
        if let Some(decl) = self.declaration(id) {
            return Some(decl.visibility());
        }
        if let Some(field) = self.field(id) {
            return Some(field.modifiers.visibility);
        }
        self.method(id).map(|m| m.modifiers.visibility)
    }

    /// Methods that `method` directly overrides, in `extends`/`implements` order.
    fn super_methods(&self, method: ElementId) -> Vec<ElementId> {
        self.method(method)
            .map(|m| m.super_methods.clone())
            .unwrap_or_default()
    }

    /// Human-readable description used in conflict messages, e.g. `field 'Point.x'`.
    fn describe(&self, id: ElementId) -> String {
        if let Some(decl) = self.declaration(id) {
            let kind = decl.keyword().map(|k| k.as_str()).unwrap_or("type");
            return format!("{} '{}'", kind, decl.name().unwrap_or("?"));
        }
        let owner = self
            .containing_declaration(id)
            .and_then(|d| self.declaration(d))
            .and_then(|d| d.name())
            .unwrap_or("?");
        if let Some(field) = self.field(id) {
            return format!("field '{}.{}'", owner, field.name);
        }
        if let Some(method) = self.method(id) {
            return if method.is_constructor() {
                format!("constructor '{}'", method.signature())
            } else {
                format!("method '{}.{}'", owner, method.signature())
            };
        }
        format!("element {}", id)
    }
}

/// Rename preparation, reference search, conflict detection, and execution.
pub trait RenameEngine {
    /// Register elements that must be renamed together with `element`, such as overriding methods.
    fn prepare_renaming(
        &self,
        element: ElementId,
        new_name: &str,
        renames: &mut RenameMap,
    ) -> anyhow::Result<()>;

    /// Every reference to `element` (and the elements renamed along with it).
    fn find_usages(
        &self,
        element: ElementId,
        new_name: &str,
        renames: &RenameMap,
    ) -> anyhow::Result<Vec<ReferenceSite>>;

    /// Report members that already carry `new_name` where `element` would land.
    fn find_existing_name_conflicts(
        &self,
        element: ElementId,
        new_name: &str,
        renames: &RenameMap,
        conflicts: &mut ConflictReport,
    );

    /// Rename `element` and rewrite exactly the given reference sites.
    fn rename_element(
        &mut self,
        element: ElementId,
        new_name: &str,
        sites: &[ReferenceSite],
    ) -> anyhow::Result<()>;
}

pub trait AccessibilityAnalyzer {
    /// Report references to `elements` that would no longer compile if they had `visibility`
    /// inside `scope`.
    fn analyze_accessibility_conflicts(
        &self,
        elements: &[ElementId],
        scope: ElementId,
        visibility: Visibility,
        conflicts: &mut ConflictReport,
    );
}

pub trait DeclarationStore {
    /// Replace a declaration in one step.
    fn replace_declaration(
        &mut self,
        id: ElementId,
        declaration: Declaration,
    ) -> anyhow::Result<()>;
}

/// Everything the conversion pipeline needs from a host model.
pub trait ProjectModel:
    SemanticModel + RenameEngine + AccessibilityAnalyzer + DeclarationStore
{
}

impl<T> ProjectModel for T where
    T: SemanticModel + RenameEngine + AccessibilityAnalyzer + DeclarationStore
{
}
