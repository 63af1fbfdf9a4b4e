//! Syntax tree of a type declaration.
//!
//! A declaration is a flat, ordered sequence of [`Child`] nodes: modifiers, the declaration keyword,
//! the identifier, the type-parameter list, members, whitespace, comments, and verbatim code such as
//! braces or `implements` clauses. Rendering concatenates the children, so the rendered text of an
//! unmodified declaration is stable byte for byte.

use crate::ids::{ElementId, RefId};
use crate::visibility::Visibility;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Class,
    Interface,
    Record,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Interface => "interface",
            Keyword::Record => "record",
        }
    }
}

/// Visibility plus the remaining modifier keywords and annotations, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl Modifiers {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            keywords: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    fn render(&self, out: &mut String) {
        // Annotations lead, then visibility, then the other keywords.
        for kw in self.keywords.iter().filter(|k| k.starts_with('@')) {
            out.push_str(kw);
            out.push(' ');
        }
        if let Some(vis) = self.visibility.keyword() {
            out.push_str(vis);
            out.push(' ');
        }
        for kw in self.keywords.iter().filter(|k| !k.starts_with('@')) {
            out.push_str(kw);
            out.push(' ');
        }
    }
}

/// A name occurrence that resolves to an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: RefId,
    pub target: ElementId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Fragment {
    Text(String),
    Ref(Reference),
}

/// Source code as a sequence of text and reference fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(pub Vec<Fragment>);

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.0.push(Fragment::Text(text.into()));
        self
    }

    /// Append a reference; its id is assigned when the code is inserted into a model.
    pub fn reference(mut self, target: ElementId, name: impl Into<String>) -> Self {
        self.0.push(Fragment::Ref(Reference {
            id: RefId::UNASSIGNED,
            target,
            name: name.into(),
        }));
        self
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.0.iter().filter_map(|f| match f {
            Fragment::Ref(r) => Some(r),
            Fragment::Text(_) => None,
        })
    }

    /// References paired with whether they follow a `.` member access, as in `p.getX()`.
    pub fn qualified_references(&self) -> impl Iterator<Item = (&Reference, bool)> {
        self.0.iter().enumerate().filter_map(move |(i, f)| match f {
            Fragment::Ref(r) => {
                let qualified = i
                    .checked_sub(1)
                    .and_then(|prev| self.0.get(prev))
                    .is_some_and(|prev| {
                        matches!(prev, Fragment::Text(t) if t.trim_end().ends_with('.'))
                    });
                Some((r, qualified))
            }
            Fragment::Text(_) => None,
        })
    }

    pub fn references_mut(&mut self) -> impl Iterator<Item = &mut Reference> {
        self.0.iter_mut().filter_map(|f| match f {
            Fragment::Ref(r) => Some(r),
            Fragment::Text(_) => None,
        })
    }

    fn render(&self, out: &mut String) {
        for fragment in &self.0 {
            match fragment {
                Fragment::Text(t) => out.push_str(t),
                Fragment::Ref(r) => out.push_str(&r.name),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ElementId,
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: ElementId,
    pub modifiers: Modifiers,
    pub ty: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Code>,
}

/// A method or, when `return_type` is `None`, a constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub id: ElementId,
    pub modifiers: Modifiers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    pub name: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Everything after the parameter list, braces included.
    pub body: Code,

    /// Methods this one directly overrides, in `extends`/`implements` order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub super_methods: Vec<ElementId>,
}

impl Method {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| p.ty.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Trivia {
    Whitespace(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", content = "data", rename_all = "snake_case")]
pub enum Child {
    Modifiers(Modifiers),
    Keyword { keyword: Keyword },
    Identifier { name: String },
    /// Type-parameter list text, e.g. `<T extends Shape>`. Empty when the declaration has none.
    TypeParameters { text: String },
    /// Record header components.
    Header { components: Vec<Parameter> },
    Field(Field),
    Method(Method),
    Trivia(Trivia),
    Code(Code),
}

impl Child {
    /// Whitespace and comments are insignificant; everything else is a token or member.
    pub fn is_significant(&self) -> bool {
        !matches!(self, Child::Trivia(_))
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Child::Trivia(Trivia::Whitespace(_)))
    }

    fn render(&self, out: &mut String) {
        match self {
            Child::Modifiers(m) => m.render(out),
            Child::Keyword { keyword } => out.push_str(keyword.as_str()),
            Child::Identifier { name } => out.push_str(name),
            Child::TypeParameters { text } => out.push_str(text),
            Child::Header { components } => {
                out.push('(');
                render_parameters(components, out);
                out.push(')');
            }
            Child::Field(f) => {
                f.modifiers.render(out);
                out.push_str(&f.ty);
                out.push(' ');
                out.push_str(&f.name);
                if let Some(init) = &f.initializer {
                    out.push_str(" = ");
                    init.render(out);
                }
                out.push(';');
            }
            Child::Method(m) => {
                m.modifiers.render(out);
                if let Some(ret) = &m.return_type {
                    out.push_str(ret);
                    out.push(' ');
                }
                out.push_str(&m.name);
                out.push('(');
                render_parameters(&m.parameters, out);
                out.push(')');
                m.body.render(out);
            }
            Child::Trivia(Trivia::Whitespace(t)) | Child::Trivia(Trivia::Comment(t)) => {
                out.push_str(t)
            }
            Child::Code(code) => code.render(out),
        }
    }

    fn codes(&self) -> Vec<&Code> {
        match self {
            Child::Field(f) => f.initializer.iter().collect(),
            Child::Method(m) => vec![&m.body],
            Child::Code(c) => vec![c],
            _ => Vec::new(),
        }
    }

    fn codes_mut(&mut self) -> Vec<&mut Code> {
        match self {
            Child::Field(f) => f.initializer.iter_mut().collect(),
            Child::Method(m) => vec![&mut m.body],
            Child::Code(c) => vec![c],
            _ => Vec::new(),
        }
    }
}

fn render_parameters(params: &[Parameter], out: &mut String) {
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&p.ty);
        out.push(' ');
        out.push_str(&p.name);
    }
}

/// A top-level type declaration and the file it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: ElementId,
    pub file: Utf8PathBuf,
    pub children: Vec<Child>,
}

impl Declaration {
    pub fn name(&self) -> Option<&str> {
        self.children.iter().find_map(|c| match c {
            Child::Identifier { name } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn keyword(&self) -> Option<Keyword> {
        self.children.iter().find_map(|c| match c {
            Child::Keyword { keyword } => Some(*keyword),
            _ => None,
        })
    }

    /// Declared visibility; package-private when there is no modifier list.
    pub fn visibility(&self) -> Visibility {
        self.children
            .iter()
            .find_map(|c| match c {
                Child::Modifiers(m) => Some(m.visibility),
                _ => None,
            })
            .unwrap_or(Visibility::Package)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.children.iter().filter_map(|c| match c {
            Child::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.children.iter().filter_map(|c| match c {
            Child::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn field(&self, id: ElementId) -> Option<&Field> {
        self.fields().find(|f| f.id == id)
    }

    pub fn method(&self, id: ElementId) -> Option<&Method> {
        self.methods().find(|m| m.id == id)
    }

    pub fn method_mut(&mut self, id: ElementId) -> Option<&mut Method> {
        self.children.iter_mut().find_map(|c| match c {
            Child::Method(m) if m.id == id => Some(m),
            _ => None,
        })
    }

    /// Header components, present once the declaration is a record.
    pub fn components(&self) -> &[Parameter] {
        self.children
            .iter()
            .find_map(|c| match c {
                Child::Header { components } => Some(components.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Whether `id` names this declaration or one of its members, parameters, or components.
    pub fn declares(&self, id: ElementId) -> bool {
        self.id == id
            || self.children.iter().any(|c| match c {
                Child::Field(f) => f.id == id,
                Child::Method(m) => m.id == id || m.parameters.iter().any(|p| p.id == id),
                Child::Header { components } => components.iter().any(|p| p.id == id),
                _ => false,
            })
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.children
            .iter()
            .flat_map(|c| c.codes())
            .flat_map(|code| code.references())
    }

    /// Every reference with its qualification, see [`Code::qualified_references`].
    pub fn qualified_references(&self) -> impl Iterator<Item = (&Reference, bool)> {
        self.children
            .iter()
            .flat_map(|c| c.codes())
            .flat_map(|code| code.qualified_references())
    }

    pub fn references_mut(&mut self) -> impl Iterator<Item = &mut Reference> {
        self.children
            .iter_mut()
            .flat_map(|c| c.codes_mut())
            .flat_map(|code| code.references_mut())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.render(&mut out);
        }
        out
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
