use crate::ids::ElementId;
use serde::{Deserialize, Serialize};

/// Messages recorded against one offending element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub element: ElementId,
    pub messages: Vec<String>,
}

/// Multi-valued map from offending element to conflict messages.
///
/// Elements keep the order in which they were first reported; messages keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictReport {
    conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, element: ElementId, message: impl Into<String>) {
        let message = message.into();
        match self.conflicts.iter_mut().find(|c| c.element == element) {
            Some(conflict) => conflict.messages.push(message),
            None => self.conflicts.push(Conflict {
                element,
                messages: vec![message],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of offending elements.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn message_count(&self) -> usize {
        self.conflicts.iter().map(|c| c.messages.len()).sum()
    }

    pub fn get(&self, element: ElementId) -> Option<&[String]> {
        self.conflicts
            .iter()
            .find(|c| c.element == element)
            .map(|c| c.messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    /// Every message, element by element.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.conflicts
            .iter()
            .flat_map(|c| c.messages.iter().map(String::as_str))
    }
}
