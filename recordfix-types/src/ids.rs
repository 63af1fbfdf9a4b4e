use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a declaration, member, or parameter.
///
/// Ids are allocated by the model and never reused. A record component keeps the id of the field it
/// replaces, a rebuilt constructor keeps its method id, and a record keeps its class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a single reference fragment inside code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(pub u32);

impl RefId {
    /// Placeholder carried by fragments that have not been inserted into a model yet.
    pub const UNASSIGNED: RefId = RefId(0);

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}
