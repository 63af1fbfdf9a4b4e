use crate::ports::{AccessibilityAnalyzer, DeclarationStore, RenameEngine, SemanticModel};
use crate::renames::RenameMap;
use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use recordfix_types::syntax::{
    Child, Code, Declaration, Field, Keyword, Method, Modifiers, Parameter, Reference, Trivia,
};
use recordfix_types::{ConflictReport, ElementId, RefId, ReferenceSite, Visibility};
use tracing::debug;

const MEMBER_INDENT: &str = "\n    ";

/// In-memory project: an ordered list of top-level declarations.
///
/// Cloning is cheap enough for staging a whole conversion and swapping it in afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProject {
    declarations: Vec<Declaration>,
    next_element: u32,
    next_ref: u32,
}

impl InMemoryProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ElementId {
        self.next_element += 1;
        ElementId(self.next_element)
    }

    pub fn parameter(&mut self, ty: impl Into<String>, name: impl Into<String>) -> Parameter {
        Parameter {
            id: self.allocate(),
            ty: ty.into(),
            name: name.into(),
        }
    }

    pub fn class(&mut self, file: impl Into<Utf8PathBuf>, name: &str) -> DeclarationBuilder<'_> {
        DeclarationBuilder::new(self, file.into(), Keyword::Class, name)
    }

    pub fn interface(
        &mut self,
        file: impl Into<Utf8PathBuf>,
        name: &str,
    ) -> DeclarationBuilder<'_> {
        DeclarationBuilder::new(self, file.into(), Keyword::Interface, name)
    }

    /// Add a declaration, assigning ids to its reference fragments.
    pub fn insert(&mut self, mut declaration: Declaration) -> ElementId {
        self.assign_reference_ids(&mut declaration);
        let id = declaration.id;
        self.declarations.push(declaration);
        id
    }

    pub fn render(&self, id: ElementId) -> Option<String> {
        self.declaration(id).map(Declaration::render)
    }

    pub fn reference(&self, ref_id: RefId) -> Option<&Reference> {
        self.declarations
            .iter()
            .flat_map(|d| d.references())
            .find(|r| r.id == ref_id)
    }

    /// Sites that resolve to exactly `element`.
    pub fn references_to(&self, element: ElementId) -> Vec<ReferenceSite> {
        let mut out = Vec::new();
        for decl in &self.declarations {
            for r in decl.references().filter(|r| r.target == element) {
                out.push(site(decl, r, None));
            }
        }
        out
    }

    fn assign_reference_ids(&mut self, declaration: &mut Declaration) {
        for r in declaration.references_mut() {
            if !r.id.is_assigned() {
                self.next_ref += 1;
                r.id = RefId(self.next_ref);
            }
        }
    }

    fn owner(&self, id: ElementId) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.declares(id))
    }

    /// `method` followed by everything that transitively overrides it, breadth first.
    fn hierarchy(&self, method: ElementId) -> Vec<ElementId> {
        let mut out = vec![method];
        let mut i = 0;
        while i < out.len() {
            for overrider in self.overriding_methods(out[i]) {
                if !out.contains(&overrider) {
                    out.push(overrider);
                }
            }
            i += 1;
        }
        out
    }

    /// An unqualified reference in another declaration is captured when that declaration already
    /// has a parameterless method with the new name that is not being renamed itself. Qualified
    /// calls keep resolving through their receiver.
    fn collision(
        &self,
        decl: &Declaration,
        target: ElementId,
        new_name: &str,
        renames: &RenameMap,
    ) -> Option<String> {
        let owner = self.containing_declaration(target)?;
        if decl.id == owner {
            return None;
        }
        let captor = decl.methods().find(|m| {
            !m.is_constructor()
                && m.name == new_name
                && m.parameters.is_empty()
                && !renames.contains(m.id)
        })?;
        Some(format!(
            "reference in {} would resolve to {} after renaming {}",
            self.describe(decl.id),
            self.describe(captor.id),
            self.describe(target)
        ))
    }
}

fn site(decl: &Declaration, reference: &Reference, collision: Option<String>) -> ReferenceSite {
    ReferenceSite {
        ref_id: reference.id,
        element: reference.target,
        declaration: decl.id,
        file: decl.file.clone(),
        collision,
    }
}

fn same_package(a: &Utf8Path, b: &Utf8Path) -> bool {
    a.parent() == b.parent()
}

impl SemanticModel for InMemoryProject {
    fn declaration(&self, id: ElementId) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.id == id)
    }

    fn declaration_ids(&self) -> Vec<ElementId> {
        self.declarations.iter().map(|d| d.id).collect()
    }

    fn containing_declaration(&self, id: ElementId) -> Option<ElementId> {
        self.owner(id).map(|d| d.id)
    }

    fn overriding_methods(&self, method: ElementId) -> Vec<ElementId> {
        self.declarations
            .iter()
            .flat_map(|d| d.methods())
            .filter(|m| m.super_methods.contains(&method))
            .map(|m| m.id)
            .collect()
    }
}

impl RenameEngine for InMemoryProject {
    fn prepare_renaming(
        &self,
        element: ElementId,
        new_name: &str,
        renames: &mut RenameMap,
    ) -> anyhow::Result<()> {
        if self.containing_declaration(element).is_none() {
            bail!("cannot prepare rename of unknown element {element}");
        }
        if self.method(element).is_none() {
            return Ok(());
        }
        for related in self.hierarchy(element).into_iter().skip(1) {
            if !renames.contains(related) {
                debug!(%element, %related, new_name, "renaming overriding method along");
                renames.insert(related, new_name);
            }
        }
        Ok(())
    }

    fn find_usages(
        &self,
        element: ElementId,
        new_name: &str,
        renames: &RenameMap,
    ) -> anyhow::Result<Vec<ReferenceSite>> {
        if self.containing_declaration(element).is_none() {
            bail!("cannot search usages of unknown element {element}");
        }
        let hierarchy = if self.method(element).is_some() {
            self.hierarchy(element)
        } else {
            vec![element]
        };

        let mut out = Vec::new();
        for decl in &self.declarations {
            for (r, qualified) in decl
                .qualified_references()
                .filter(|(r, _)| hierarchy.contains(&r.target))
            {
                let collision = if qualified {
                    None
                } else {
                    self.collision(decl, r.target, new_name, renames)
                };
                out.push(site(decl, r, collision));
            }
        }
        Ok(out)
    }

    fn find_existing_name_conflicts(
        &self,
        element: ElementId,
        new_name: &str,
        renames: &RenameMap,
        conflicts: &mut ConflictReport,
    ) {
        for method_id in self.hierarchy(element) {
            let (Some(method), Some(owner)) = (self.method(method_id), self.owner(method_id)) else {
                continue;
            };
            for existing in owner.methods() {
                if existing.id == method_id || renames.contains(existing.id) {
                    continue;
                }
                if existing.name == new_name && existing.parameters.len() == method.parameters.len()
                {
                    conflicts.put(
                        method_id,
                        format!(
                            "{} is already defined in {}",
                            self.describe(existing.id),
                            self.describe(owner.id)
                        ),
                    );
                }
            }
        }
    }

    fn rename_element(
        &mut self,
        element: ElementId,
        new_name: &str,
        sites: &[ReferenceSite],
    ) -> anyhow::Result<()> {
        for s in sites {
            if s.element != element {
                bail!("{} resolves to {}, not {}", s.ref_id, s.element, element);
            }
            if self.reference(s.ref_id).is_none() {
                bail!("{} not found", s.ref_id);
            }
        }

        let decl = self
            .declarations
            .iter_mut()
            .find(|d| d.declares(element))
            .with_context(|| format!("rename target {element} not found"))?;

        let mut renamed = false;
        for child in decl.children.iter_mut() {
            match child {
                Child::Method(m) if m.id == element => {
                    m.name = new_name.to_string();
                    renamed = true;
                }
                Child::Field(f) if f.id == element => {
                    f.name = new_name.to_string();
                    renamed = true;
                }
                _ => {}
            }
        }
        if !renamed {
            bail!("{element} is not a renameable member");
        }

        for r in self
            .declarations
            .iter_mut()
            .flat_map(|d| d.references_mut())
            .filter(|r| sites.iter().any(|s| s.ref_id == r.id))
        {
            r.name = new_name.to_string();
        }
        Ok(())
    }
}

impl AccessibilityAnalyzer for InMemoryProject {
    fn analyze_accessibility_conflicts(
        &self,
        elements: &[ElementId],
        scope: ElementId,
        visibility: Visibility,
        conflicts: &mut ConflictReport,
    ) {
        let Some(scope_decl) = self.declaration(scope) else {
            return;
        };
        for &element in elements {
            for decl in &self.declarations {
                if !decl.references().any(|r| r.target == element) {
                    continue;
                }
                let accessible = match visibility {
                    Visibility::Private => decl.id == scope,
                    Visibility::Package | Visibility::Protected => {
                        same_package(&decl.file, &scope_decl.file)
                    }
                    Visibility::Public => true,
                };
                if !accessible {
                    conflicts.put(
                        element,
                        format!(
                            "{} with {} visibility won't be accessible from {}",
                            self.describe(element),
                            visibility,
                            self.describe(decl.id)
                        ),
                    );
                }
            }
        }
    }
}

impl DeclarationStore for InMemoryProject {
    fn replace_declaration(
        &mut self,
        id: ElementId,
        mut declaration: Declaration,
    ) -> anyhow::Result<()> {
        let index = self
            .declarations
            .iter()
            .position(|d| d.id == id)
            .with_context(|| format!("declaration {id} not found"))?;
        self.assign_reference_ids(&mut declaration);
        self.declarations[index] = declaration;
        Ok(())
    }
}

/// Builds one declaration member by member, allocating ids from the project.
pub struct DeclarationBuilder<'a> {
    project: &'a mut InMemoryProject,
    declaration: Declaration,
    opened: bool,
}

impl<'a> DeclarationBuilder<'a> {
    fn new(
        project: &'a mut InMemoryProject,
        file: Utf8PathBuf,
        keyword: Keyword,
        name: &str,
    ) -> Self {
        let id = project.allocate();
        let children = vec![
            Child::Keyword { keyword },
            whitespace(" "),
            Child::Identifier {
                name: name.to_string(),
            },
            Child::TypeParameters {
                text: String::new(),
            },
        ];
        Self {
            project,
            declaration: Declaration {
                id,
                file,
                children,
            },
            opened: false,
        }
    }

    pub fn id(&self) -> ElementId {
        self.declaration.id
    }

    pub fn modifiers(&mut self, modifiers: Modifiers) -> &mut Self {
        match self.declaration.children.first_mut() {
            Some(Child::Modifiers(m)) => *m = modifiers,
            _ => self
                .declaration
                .children
                .insert(0, Child::Modifiers(modifiers)),
        }
        self
    }

    pub fn type_parameters(&mut self, text: &str) -> &mut Self {
        for child in self.declaration.children.iter_mut() {
            if let Child::TypeParameters { text: t } = child {
                *t = text.to_string();
            }
        }
        self
    }

    /// Append an `implements` clause; call before adding members.
    pub fn implements(&mut self, clause: &str) -> &mut Self {
        self.declaration
            .children
            .push(Child::Code(Code::new().text(format!(" implements {clause}"))));
        self
    }

    pub fn parameter(&mut self, ty: &str, name: &str) -> Parameter {
        self.project.parameter(ty, name)
    }

    pub fn field(&mut self, modifiers: Modifiers, ty: &str, name: &str) -> ElementId {
        self.field_with(modifiers, ty, name, None)
    }

    pub fn field_with(
        &mut self,
        modifiers: Modifiers,
        ty: &str,
        name: &str,
        initializer: Option<Code>,
    ) -> ElementId {
        let id = self.project.allocate();
        self.member(Child::Field(Field {
            id,
            modifiers,
            ty: ty.to_string(),
            name: name.to_string(),
            initializer,
        }));
        id
    }

    pub fn method(
        &mut self,
        modifiers: Modifiers,
        return_type: &str,
        name: &str,
        parameters: Vec<Parameter>,
        body: Code,
    ) -> ElementId {
        let id = self.project.allocate();
        self.member(Child::Method(Method {
            id,
            modifiers,
            return_type: Some(return_type.to_string()),
            name: name.to_string(),
            parameters,
            body,
            super_methods: Vec::new(),
        }));
        id
    }

    /// A bodiless method, as declared in an interface.
    pub fn abstract_method(
        &mut self,
        modifiers: Modifiers,
        return_type: &str,
        name: &str,
    ) -> ElementId {
        self.method(modifiers, return_type, name, Vec::new(), Code::new().text(";"))
    }

    /// `<return type of field> name() { return field; }`
    pub fn accessor(
        &mut self,
        modifiers: Modifiers,
        name: &str,
        field: ElementId,
    ) -> anyhow::Result<ElementId> {
        let (ty, field_name) = self.field_signature(field)?;
        let body = Code::new()
            .text(" {\n        return ")
            .reference(field, field_name)
            .text(";\n    }");
        Ok(self.method(modifiers, &ty, name, Vec::new(), body))
    }

    pub fn constructor(
        &mut self,
        modifiers: Modifiers,
        parameters: Vec<Parameter>,
        body: Code,
    ) -> ElementId {
        let id = self.project.allocate();
        let name = self.declaration.name().unwrap_or_default().to_string();
        self.member(Child::Method(Method {
            id,
            modifiers,
            return_type: None,
            name,
            parameters,
            body,
            super_methods: Vec::new(),
        }));
        id
    }

    /// A constructor taking one parameter per field and assigning each, in the given order.
    pub fn canonical_constructor(
        &mut self,
        modifiers: Modifiers,
        fields: &[ElementId],
    ) -> anyhow::Result<ElementId> {
        let mut parameters = Vec::new();
        let mut body = Code::new().text(" {");
        for &field in fields {
            let (ty, name) = self.field_signature(field)?;
            let param = self.project.parameter(ty, name.clone());
            body = body
                .text("\n        this.")
                .reference(field, name.clone())
                .text(" = ")
                .reference(param.id, name)
                .text(";");
            parameters.push(param);
        }
        body = body.text("\n    }");
        Ok(self.constructor(modifiers, parameters, body))
    }

    /// Record that `method` directly overrides `super_method`.
    pub fn overrides(&mut self, method: ElementId, super_method: ElementId) -> &mut Self {
        if let Some(m) = self.declaration.method_mut(method) {
            m.super_methods.push(super_method);
        }
        self
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.member(Child::Trivia(Trivia::Comment(text.to_string())));
        self
    }

    /// Verbatim member code: initializer blocks, nested types, and the like.
    pub fn code(&mut self, code: Code) -> &mut Self {
        self.member(Child::Code(code));
        self
    }

    pub fn finish(mut self) -> ElementId {
        self.open();
        self.declaration
            .children
            .push(Child::Code(Code::new().text("\n}")));
        self.project.insert(self.declaration)
    }

    fn field_signature(&self, field: ElementId) -> anyhow::Result<(String, String)> {
        let f = self
            .declaration
            .field(field)
            .with_context(|| format!("field {field} is not declared in this builder"))?;
        Ok((f.ty.clone(), f.name.clone()))
    }

    fn open(&mut self) {
        if !self.opened {
            self.declaration
                .children
                .push(Child::Code(Code::new().text(" {")));
            self.opened = true;
        }
    }

    fn member(&mut self, child: Child) {
        self.open();
        self.declaration.children.push(whitespace(MEMBER_INDENT));
        self.declaration.children.push(child);
    }
}

fn whitespace(text: &str) -> Child {
    Child::Trivia(Trivia::Whitespace(text.to_string()))
}
