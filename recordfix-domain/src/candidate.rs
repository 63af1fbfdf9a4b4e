use indexmap::IndexMap;
use recordfix_types::ElementId;

/// A field paired with the method recognized as its read accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAccessorBinding {
    pub accessor: ElementId,
    pub backing_field: ElementId,

    /// The accessor is already named like a record accessor.
    pub record_style_naming: bool,
}

impl FieldAccessorBinding {
    pub fn new(accessor: ElementId, backing_field: ElementId) -> Self {
        Self {
            accessor,
            backing_field,
            record_style_naming: false,
        }
    }

    pub fn record_style(mut self) -> Self {
        self.record_style_naming = true;
        self
    }
}

/// A class that an external detector judged convertible, with its fields and accessors paired up.
///
/// `field_accessors` iterates in the declaration's member order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionCandidate {
    pub declaration: ElementId,
    pub field_accessors: IndexMap<ElementId, Option<FieldAccessorBinding>>,
    pub canonical_constructor: Option<ElementId>,
}

impl ConversionCandidate {
    pub fn new(declaration: ElementId) -> Self {
        Self {
            declaration,
            field_accessors: IndexMap::new(),
            canonical_constructor: None,
        }
    }

    pub fn with_field(mut self, field: ElementId, binding: Option<FieldAccessorBinding>) -> Self {
        self.field_accessors.insert(field, binding);
        self
    }

    pub fn with_canonical_constructor(mut self, constructor: ElementId) -> Self {
        self.canonical_constructor = Some(constructor);
        self
    }

    pub fn is_key_field(&self, field: ElementId) -> bool {
        self.field_accessors.contains_key(&field)
    }

    /// The binding whose accessor is `method`, if any.
    pub fn binding_for_accessor(&self, method: ElementId) -> Option<&FieldAccessorBinding> {
        self.field_accessors
            .values()
            .flatten()
            .find(|b| b.accessor == method)
    }

    /// Whether `field` survives as a record component.
    pub fn is_component(&self, field: ElementId) -> bool {
        match self.field_accessors.get(&field) {
            Some(None) => true,
            Some(Some(binding)) => binding.backing_field == field,
            None => false,
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = (ElementId, &FieldAccessorBinding)> {
        self.field_accessors
            .iter()
            .filter_map(|(field, binding)| binding.as_ref().map(|b| (*field, b)))
    }
}
