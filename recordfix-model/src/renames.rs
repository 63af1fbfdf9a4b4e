use indexmap::IndexMap;
use recordfix_types::ElementId;

/// Pending renames for one conversion run, in registration order.
///
/// Keys are stable element ids, so entries registered before any mutation stay valid while earlier
/// renames are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    entries: IndexMap<ElementId, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rename. Re-registering an element updates its name and keeps its position.
    pub fn insert(&mut self, element: ElementId, new_name: impl Into<String>) {
        self.entries.insert(element, new_name.into());
    }

    pub fn get(&self, element: ElementId) -> Option<&str> {
        self.entries.get(&element).map(String::as_str)
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.entries.contains_key(&element)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_registration_order_on_update() {
        let mut renames = RenameMap::new();
        renames.insert(ElementId(9), "a");
        renames.insert(ElementId(2), "b");
        renames.insert(ElementId(9), "c");

        let entries: Vec<_> = renames.iter().collect();
        assert_eq!(entries, vec![(ElementId(9), "c"), (ElementId(2), "b")]);
    }
}
